//! Short link entity.

use chrono::{DateTime, Utc};

/// A short code mapped to a target URL.
///
/// `code` is unique across all links and case-sensitive. Generated codes use
/// the base-62 alphabet; custom aliases may also contain `-` and `_`.
#[derive(Debug, Clone, PartialEq)]
pub struct ShortLink {
    pub id: i64,
    pub code: String,
    pub target_url: String,
    pub owner: Option<String>,
    pub title: Option<String>,
    pub tags: Vec<String>,
    /// True when `code` was chosen by the caller rather than generated.
    pub custom: bool,
    pub active: bool,
    pub click_count: i64,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl ShortLink {
    /// Materializes a freshly inserted link.
    pub fn from_new(id: i64, new_link: NewLink, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            code: new_link.code,
            target_url: new_link.target_url,
            owner: new_link.owner,
            title: new_link.title,
            tags: new_link.tags,
            custom: new_link.custom,
            active: true,
            click_count: 0,
            created_at,
            expires_at: new_link.expires_at,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|e| now > e)
    }

    /// Returns true if the link has passed its expiry time.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.owner.as_deref() == Some(user_id)
    }
}

/// Input data for inserting a new link.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLink {
    pub code: String,
    pub target_url: String,
    pub owner: Option<String>,
    pub title: Option<String>,
    pub tags: Vec<String>,
    pub custom: bool,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Owner edit of an existing link.
///
/// `None` fields are left unchanged. For `title` and `expires_at`,
/// `Some(None)` clears the value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkPatch {
    pub title: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
    pub active: Option<bool>,
    pub expires_at: Option<Option<DateTime<Utc>>>,
}

impl LinkPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.tags.is_none()
            && self.active.is_none()
            && self.expires_at.is_none()
    }

    /// Applies the patch in place.
    pub fn apply_to(&self, link: &mut ShortLink) {
        if let Some(title) = &self.title {
            link.title = title.clone();
        }
        if let Some(tags) = &self.tags {
            link.tags = tags.clone();
        }
        if let Some(active) = self.active {
            link.active = active;
        }
        if let Some(expires_at) = self.expires_at {
            link.expires_at = expires_at;
        }
    }
}

/// Aggregate counters over the links of one owner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OwnerSummary {
    pub total_links: i64,
    pub total_clicks: i64,
}
