//! HTTP middleware and extractors for request processing.

pub mod identity;
pub mod tracing;
