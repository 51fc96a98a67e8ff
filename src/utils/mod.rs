//! Utility functions for code generation, URL processing, and request metadata.
//!
//! - [`code_generator`] - Base-62 codes and custom alias validation
//! - [`url_normalizer`] - Target URL normalization
//! - [`client_info`] - Client IP, location, and user agent parsing
//! - [`geoip`] - MaxMind country and city lookup
//! - [`csv_export`] - CSV rendering for analytics exports
//! - [`db_error`] - PostgreSQL error classification

pub mod client_info;
pub mod code_generator;
pub mod csv_export;
pub mod db_error;
pub mod geoip;
pub mod url_normalizer;
