//! Repository implementations.
//!
//! Concrete implementations of the domain repository traits.
//!
//! # Repositories
//!
//! - [`PgLinkRepository`] - Link storage in PostgreSQL
//! - [`PgStatsRepository`] - Click records in PostgreSQL
//! - [`MemoryStore`] - Both traits in process memory

pub mod memory;
pub mod pg_link_repository;
pub mod pg_stats_repository;

pub use memory::MemoryStore;
pub use pg_link_repository::PgLinkRepository;
pub use pg_stats_repository::PgStatsRepository;
