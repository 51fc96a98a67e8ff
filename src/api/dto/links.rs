//! DTOs for link management endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::api::dto::pagination::PaginationInfo;
use crate::domain::entities::{LinkPatch, ShortLink};

/// JSON representation of a short link.
#[derive(Debug, Serialize)]
pub struct LinkResponse {
    pub code: String,
    pub short_url: String,
    pub target_url: String,
    pub title: Option<String>,
    pub tags: Vec<String>,
    pub custom: bool,
    pub active: bool,
    pub click_count: i64,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl LinkResponse {
    pub fn from_link(link: ShortLink, short_url: String) -> Self {
        Self {
            code: link.code,
            short_url,
            target_url: link.target_url,
            title: link.title,
            tags: link.tags,
            custom: link.custom,
            active: link.active,
            click_count: link.click_count,
            created_at: link.created_at,
            expires_at: link.expires_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LinkListResponse {
    pub items: Vec<LinkResponse>,
    pub pagination: PaginationInfo,
}

/// Request body for `PUT /api/urls/{code}`.
///
/// All fields are optional; only provided fields are changed.
///
/// # `title` and `expires_at` semantics
///
/// - **Absent** → leave existing value unchanged
/// - **`null`** → clear the value
/// - **Value** → set it
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateLinkRequest {
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[validate(length(max = 200))]
    pub title: Option<Option<String>>,

    #[validate(length(max = 20))]
    pub tags: Option<Vec<String>>,

    pub active: Option<bool>,

    #[serde(default, with = "::serde_with::rust::double_option")]
    pub expires_at: Option<Option<DateTime<Utc>>>,
}

impl From<UpdateLinkRequest> for LinkPatch {
    fn from(req: UpdateLinkRequest) -> Self {
        Self {
            title: req.title,
            tags: req.tags,
            active: req.active,
            expires_at: req.expires_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_request_absent_null_and_value() {
        let req: UpdateLinkRequest =
            serde_json::from_str(r#"{"title": null, "expires_at": "2030-01-01T00:00:00Z"}"#)
                .unwrap();
        let patch = LinkPatch::from(req);

        assert_eq!(patch.title, Some(None));
        assert!(matches!(patch.expires_at, Some(Some(_))));
        assert!(patch.tags.is_none());
        assert!(patch.active.is_none());
    }

    #[test]
    fn test_update_request_title_length() {
        let long = "t".repeat(201);
        let req: UpdateLinkRequest =
            serde_json::from_str(&format!(r#"{{"title": "{long}"}}"#)).unwrap();
        assert!(req.validate().is_err());

        let req: UpdateLinkRequest =
            serde_json::from_str(&format!(r#"{{"title": "{}"}}"#, &long[..200])).unwrap();
        assert!(req.validate().is_ok());

        let req: UpdateLinkRequest = serde_json::from_str(r#"{"title": null}"#).unwrap();
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_update_request_empty_body_is_empty_patch() {
        let req: UpdateLinkRequest = serde_json::from_str("{}").unwrap();
        assert!(LinkPatch::from(req).is_empty());
    }
}
