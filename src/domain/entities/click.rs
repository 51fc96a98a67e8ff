//! Click entity representing a single redirect.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Device class derived from the user agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    Mobile,
    Tablet,
    Desktop,
    Unknown,
}

impl DeviceClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mobile => "mobile",
            Self::Tablet => "tablet",
            Self::Desktop => "desktop",
            Self::Unknown => "unknown",
        }
    }

    /// Parses a stored value; anything unrecognized is `Unknown`.
    pub fn parse(value: &str) -> Self {
        match value {
            "mobile" => Self::Mobile,
            "tablet" => Self::Tablet,
            "desktop" => Self::Desktop,
            _ => Self::Unknown,
        }
    }
}

/// A recorded click. Append-only; removed only when its link is deleted.
#[derive(Debug, Clone, PartialEq)]
pub struct Click {
    pub id: i64,
    pub link_id: i64,
    pub clicked_at: DateTime<Utc>,
    pub ip: String,
    pub user_agent: String,
    pub referrer: String,
    pub country: String,
    pub city: String,
    pub device: DeviceClass,
    pub browser: String,
    pub os: String,
}

impl Click {
    pub fn from_new(id: i64, new_click: NewClick) -> Self {
        Self {
            id,
            link_id: new_click.link_id,
            clicked_at: new_click.clicked_at,
            ip: new_click.ip,
            user_agent: new_click.user_agent,
            referrer: new_click.referrer,
            country: new_click.country,
            city: new_click.city,
            device: new_click.device,
            browser: new_click.browser,
            os: new_click.os,
        }
    }
}

/// A click with all derived fields resolved, ready to persist.
#[derive(Debug, Clone, PartialEq)]
pub struct NewClick {
    pub link_id: i64,
    pub clicked_at: DateTime<Utc>,
    pub ip: String,
    pub user_agent: String,
    pub referrer: String,
    pub country: String,
    pub city: String,
    pub device: DeviceClass,
    pub browser: String,
    pub os: String,
}
