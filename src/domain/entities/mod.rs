//! Core domain entities.
//!
//! - [`ShortLink`] - A short code mapped to a target URL
//! - [`Click`] - One recorded redirect
//! - [`Identity`] - The caller a request runs for
//!
//! Creation inputs live in separate structs (`NewLink`, `NewClick`) and
//! owner edits in [`LinkPatch`].

pub mod click;
pub mod identity;
pub mod link;

pub use click::{Click, DeviceClass, NewClick};
pub use identity::{Identity, Role};
pub use link::{LinkPatch, NewLink, OwnerSummary, ShortLink};
