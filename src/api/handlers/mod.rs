//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod analytics;
pub mod health;
pub mod links;
pub mod redirect;
pub mod shorten;

pub use analytics::{dashboard_handler, export_analytics_handler, link_analytics_handler};
pub use health::health_handler;
pub use links::{delete_link_handler, link_details_handler, list_links_handler, update_link_handler};
pub use redirect::redirect_handler;
pub use shorten::{bulk_shorten_handler, shorten_handler};
