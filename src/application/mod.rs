//! Application layer services implementing business logic.
//!
//! Services coordinate repository calls, validation, and access rules, and
//! give HTTP handlers a narrow API.
//!
//! # Available Services
//!
//! - [`services::code_allocator::CodeAllocator`] - Unique short code generation
//! - [`services::link_service::LinkService`] - Short link creation and management
//! - [`services::stats_service::StatsService`] - Click analytics and export

pub mod services;
