//! DTOs for link shortening endpoints.

use crate::error::ErrorInfo;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::application::services::link_service::ShortenInput;

/// Request to shorten a single URL.
#[derive(Debug, Deserialize, Validate)]
pub struct ShortenRequest {
    /// Target URL; a missing scheme is completed with `https://`.
    #[validate(length(min = 1, max = 2048, message = "URL must be 1-2048 characters"))]
    pub url: String,

    /// Optional caller-chosen code (letters, digits, `-`, `_`).
    #[validate(length(min = 1, max = 64))]
    pub custom_alias: Option<String>,

    #[validate(length(max = 200))]
    pub title: Option<String>,

    #[serde(default)]
    #[validate(length(max = 20))]
    pub tags: Vec<String>,

    /// After this time, the link returns 410 Gone.
    pub expires_at: Option<DateTime<Utc>>,
}

impl ShortenRequest {
    pub fn into_input(self, owner: Option<String>) -> ShortenInput {
        ShortenInput {
            target_url: self.url,
            custom_alias: self.custom_alias,
            owner,
            title: self.title,
            tags: self.tags,
            expires_at: self.expires_at,
        }
    }
}

/// Request to shorten several URLs at once.
#[derive(Debug, Deserialize, Validate)]
pub struct BulkShortenRequest {
    /// At most `MAX_BULK_URLS` entries.
    #[validate(length(min = 1, max = 50))]
    pub urls: Vec<String>,
}

/// Response containing batch processing results.
#[derive(Debug, Serialize)]
pub struct BulkShortenResponse {
    pub summary: BatchSummary,
    pub items: Vec<ShortenResultItem>,
}

/// Individual result for a URL in the batch.
///
/// Uses untagged enum for cleaner JSON structure (no discriminator field).
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ShortenResultItem {
    Success {
        long_url: String,
        code: String,
        short_url: String,
    },
    Error {
        long_url: String,
        error: ErrorInfo,
    },
}

/// Summary statistics for batch processing.
#[derive(Debug, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
}
