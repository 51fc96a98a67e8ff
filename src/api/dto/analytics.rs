//! DTOs for analytics endpoints.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};

use crate::api::dto::links::LinkResponse;
use crate::application::services::stats_service::{
    ClickSummary, CountEntry, DailyCount, DEFAULT_ANALYTICS_DAYS,
};
use crate::domain::entities::{Click, DeviceClass};

#[serde_as]
#[derive(Debug, Default, Deserialize)]
pub struct AnalyticsQuery {
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub days: Option<u32>,
}

impl AnalyticsQuery {
    pub fn days(&self) -> u32 {
        self.days.unwrap_or(DEFAULT_ANALYTICS_DAYS)
    }
}

#[derive(Debug, Serialize)]
pub struct CountItem {
    pub label: String,
    pub count: u64,
}

impl From<CountEntry> for CountItem {
    fn from(entry: CountEntry) -> Self {
        Self {
            label: entry.label,
            count: entry.count,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DailyItem {
    pub date: NaiveDate,
    pub count: u64,
}

impl From<DailyCount> for DailyItem {
    fn from(day: DailyCount) -> Self {
        Self {
            date: day.date,
            count: day.count,
        }
    }
}

/// A click as shown in the "recent clicks" list.
#[derive(Debug, Serialize)]
pub struct RecentClick {
    pub clicked_at: DateTime<Utc>,
    pub country: String,
    pub city: String,
    pub referrer: String,
    pub device: DeviceClass,
    pub browser: String,
    pub os: String,
}

impl From<Click> for RecentClick {
    fn from(click: Click) -> Self {
        Self {
            clicked_at: click.clicked_at,
            country: click.country,
            city: click.city,
            referrer: click.referrer,
            device: click.device,
            browser: click.browser,
            os: click.os,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LinkAnalyticsResponse {
    pub link: LinkResponse,
    pub days: u32,
    pub total_clicks: u64,
    pub clicks_by_date: Vec<DailyItem>,
    pub top_countries: Vec<CountItem>,
    pub top_referrers: Vec<CountItem>,
    pub devices: Vec<CountItem>,
    pub browsers: Vec<CountItem>,
    pub operating_systems: Vec<CountItem>,
    pub recent_clicks: Vec<RecentClick>,
}

impl LinkAnalyticsResponse {
    pub fn new(link: LinkResponse, days: u32, summary: ClickSummary) -> Self {
        fn items<T, U: From<T>>(v: Vec<T>) -> Vec<U> {
            v.into_iter().map(U::from).collect()
        }

        Self {
            link,
            days,
            total_clicks: summary.total_clicks,
            clicks_by_date: items(summary.clicks_by_date),
            top_countries: items(summary.top_countries),
            top_referrers: items(summary.top_referrers),
            devices: items(summary.devices),
            browsers: items(summary.browsers),
            operating_systems: items(summary.operating_systems),
            recent_clicks: items(summary.recent_clicks),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub total_links: i64,
    pub total_clicks: i64,
    pub clicks_last_30_days: u64,
    pub top_links: Vec<LinkResponse>,
    pub clicks_by_date: Vec<DailyItem>,
}
