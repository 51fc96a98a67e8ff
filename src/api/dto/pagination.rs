//! Pagination query parameters.

use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};

use crate::error::AppError;

pub const DEFAULT_PAGE_LIMIT: u32 = 20;
pub const MAX_PAGE_LIMIT: u32 = 100;

/// Pagination query parameters.
///
/// Uses `serde_with` to parse page numbers from query strings as integers.
#[serde_as]
#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub page: Option<u32>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub limit: Option<u32>,
}

impl PaginationParams {
    /// Returns `(page, limit)` after applying defaults.
    ///
    /// # Defaults
    ///
    /// - `page`: 1
    /// - `limit`: 20
    ///
    /// # Errors
    ///
    /// Page must be > 0 and limit between 1 and 100.
    pub fn resolve(&self) -> Result<(u32, u32), AppError> {
        let page = self.page.unwrap_or(1);
        let limit = self.limit.unwrap_or(DEFAULT_PAGE_LIMIT);

        if page == 0 {
            return Err(AppError::bad_request(
                "Page must be greater than 0",
                serde_json::json!({ "page": page }),
            ));
        }

        if !(1..=MAX_PAGE_LIMIT).contains(&limit) {
            return Err(AppError::bad_request(
                format!("Limit must be between 1 and {MAX_PAGE_LIMIT}"),
                serde_json::json!({ "limit": limit }),
            ));
        }

        Ok((page, limit))
    }
}

/// Pagination metadata returned with list responses.
#[derive(Debug, Serialize)]
pub struct PaginationInfo {
    pub page: u32,
    pub limit: u32,
    pub total: i64,
    pub pages: i64,
}
