//! Business logic services for the application layer.

pub mod code_allocator;
pub mod link_service;
pub mod stats_service;

pub use code_allocator::{AllocatorSettings, CodeAllocator};
pub use link_service::LinkService;
pub use stats_service::StatsService;
