//! Entities, storage contracts, and the click pipeline.
//!
//! Nothing here knows about HTTP or SQL. The repository traits are
//! implemented in [`crate::infrastructure::persistence`].
//!
//! A redirect produces a [`click_event::ClickEvent`] that the handler pushes
//! onto a bounded channel; [`click_worker::run_click_worker`] enriches it and
//! records it through [`repositories::StatsRepository`], then bumps the
//! link's counter.

pub mod click_event;
pub mod click_worker;
pub mod entities;
pub mod repositories;
