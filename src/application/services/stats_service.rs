//! Click analytics and export service.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use serde_json::json;

use crate::domain::entities::{Click, Identity, ShortLink};
use crate::domain::repositories::{LinkRepository, StatsRepository};
use crate::error::AppError;
use crate::utils::csv_export::write_record;

/// Default and maximum look-back windows for link analytics, in days.
pub const DEFAULT_ANALYTICS_DAYS: u32 = 30;
pub const MAX_ANALYTICS_DAYS: u32 = 365;

const TOP_COUNTRIES: usize = 10;
const TOP_REFERRERS: usize = 10;
const RECENT_CLICKS: usize = 20;
const DASHBOARD_TOP_LINKS: i64 = 5;
const DASHBOARD_DAYS: i64 = 30;

const CSV_HEADER: [&str; 8] = [
    "Timestamp",
    "Country",
    "City",
    "Referrer",
    "Device",
    "Browser",
    "Operating System",
    "IP Address",
];

/// One bar of a histogram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountEntry {
    pub label: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: u64,
}

/// Aggregates over a set of clicks.
///
/// Histograms are ordered by count, descending, with ties broken by label.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClickSummary {
    pub total_clicks: u64,
    /// Days with at least one click, oldest first.
    pub clicks_by_date: Vec<DailyCount>,
    pub top_countries: Vec<CountEntry>,
    pub top_referrers: Vec<CountEntry>,
    pub devices: Vec<CountEntry>,
    pub browsers: Vec<CountEntry>,
    pub operating_systems: Vec<CountEntry>,
    /// Newest first.
    pub recent_clicks: Vec<Click>,
}

#[derive(Debug, Clone)]
pub struct LinkAnalytics {
    pub link: ShortLink,
    pub days: u32,
    pub summary: ClickSummary,
}

/// A rendered CSV download.
#[derive(Debug, Clone)]
pub struct CsvExport {
    pub file_name: String,
    pub body: String,
}

/// Owner-wide overview.
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub total_links: i64,
    pub total_clicks: i64,
    pub clicks_last_30_days: u64,
    pub top_links: Vec<ShortLink>,
    pub clicks_by_date: Vec<DailyCount>,
}

/// Service for reading click statistics.
///
/// Only the link's owner or an admin may read a link's analytics.
pub struct StatsService<S, L>
where
    S: StatsRepository + ?Sized,
    L: LinkRepository + ?Sized,
{
    stats: Arc<S>,
    links: Arc<L>,
}

impl<S, L> StatsService<S, L>
where
    S: StatsRepository + ?Sized,
    L: LinkRepository + ?Sized,
{
    pub fn new(stats: Arc<S>, links: Arc<L>) -> Self {
        Self { stats, links }
    }

    /// Summarizes a link's clicks over the last `days` days.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] if `days` is outside `1..=365`
    /// - [`AppError::NotFound`] if no link has this code
    /// - [`AppError::Forbidden`] if the caller is neither owner nor admin
    pub async fn link_analytics(
        &self,
        code: &str,
        requester: &Identity,
        days: u32,
    ) -> Result<LinkAnalytics, AppError> {
        if !(1..=MAX_ANALYTICS_DAYS).contains(&days) {
            return Err(AppError::bad_request(
                format!("days must be between 1 and {MAX_ANALYTICS_DAYS}"),
                json!({ "days": days }),
            ));
        }

        let link = self.authorized_link(code, requester).await?;
        let since = Utc::now() - Duration::days(i64::from(days));
        let clicks = self.stats.clicks_for_link(link.id, Some(since)).await?;

        Ok(LinkAnalytics {
            link,
            days,
            summary: aggregate(&clicks),
        })
    }

    /// Renders every click of a link as CSV, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the link is missing or has no clicks.
    pub async fn export_csv(&self, code: &str, requester: &Identity) -> Result<CsvExport, AppError> {
        let link = self.authorized_link(code, requester).await?;
        let clicks = self.stats.clicks_for_link(link.id, None).await?;

        if clicks.is_empty() {
            return Err(AppError::not_found(
                "No click data to export",
                json!({ "code": code }),
            ));
        }

        let mut body = String::new();
        write_record(&mut body, CSV_HEADER);
        for click in clicks.iter().rev() {
            let timestamp = click.clicked_at.format("%Y-%m-%d %H:%M:%S").to_string();
            write_record(
                &mut body,
                [
                    timestamp.as_str(),
                    click.country.as_str(),
                    click.city.as_str(),
                    click.referrer.as_str(),
                    click.device.as_str(),
                    click.browser.as_str(),
                    click.os.as_str(),
                    click.ip.as_str(),
                ],
            );
        }

        Ok(CsvExport {
            file_name: format!("analytics-{}.csv", link.code),
            body,
        })
    }

    /// Overview of all links owned by the caller.
    pub async fn dashboard(&self, owner: &Identity) -> Result<Dashboard, AppError> {
        let summary = self.links.owner_summary(&owner.user_id).await?;
        let top_links = self
            .links
            .top_by_clicks(&owner.user_id, DASHBOARD_TOP_LINKS)
            .await?;

        let since = Utc::now() - Duration::days(DASHBOARD_DAYS);
        let recent = self
            .stats
            .clicks_for_owner(&owner.user_id, Some(since))
            .await?;

        Ok(Dashboard {
            total_links: summary.total_links,
            total_clicks: summary.total_clicks,
            clicks_last_30_days: recent.len() as u64,
            top_links,
            clicks_by_date: clicks_by_date(&recent),
        })
    }

    async fn authorized_link(&self, code: &str, requester: &Identity) -> Result<ShortLink, AppError> {
        let link = self
            .links
            .find_by_code(code)
            .await?
            .ok_or_else(|| AppError::not_found("Short link not found", json!({ "code": code })))?;

        if !link.is_owned_by(&requester.user_id) && !requester.is_admin() {
            return Err(AppError::forbidden(
                "Not authorized to view analytics for this link",
                json!({ "code": code }),
            ));
        }

        Ok(link)
    }
}

/// Builds every histogram of a [`ClickSummary`] in a single pass.
pub fn aggregate(clicks: &[Click]) -> ClickSummary {
    let mut countries = HashMap::new();
    let mut referrers = HashMap::new();
    let mut devices = HashMap::new();
    let mut browsers = HashMap::new();
    let mut systems = HashMap::new();

    for click in clicks {
        *countries.entry(click.country.as_str()).or_insert(0u64) += 1;
        *referrers.entry(click.referrer.as_str()).or_insert(0u64) += 1;
        *devices.entry(click.device.as_str()).or_insert(0u64) += 1;
        *browsers.entry(click.browser.as_str()).or_insert(0u64) += 1;
        *systems.entry(click.os.as_str()).or_insert(0u64) += 1;
    }

    let mut recent_clicks = clicks.to_vec();
    recent_clicks.sort_by(|a, b| b.clicked_at.cmp(&a.clicked_at));
    recent_clicks.truncate(RECENT_CLICKS);

    ClickSummary {
        total_clicks: clicks.len() as u64,
        clicks_by_date: clicks_by_date(clicks),
        top_countries: ranked(countries, Some(TOP_COUNTRIES)),
        top_referrers: ranked(referrers, Some(TOP_REFERRERS)),
        devices: ranked(devices, None),
        browsers: ranked(browsers, None),
        operating_systems: ranked(systems, None),
        recent_clicks,
    }
}

fn clicks_by_date(clicks: &[Click]) -> Vec<DailyCount> {
    let mut by_date: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    for click in clicks {
        *by_date.entry(click.clicked_at.date_naive()).or_default() += 1;
    }

    by_date
        .into_iter()
        .map(|(date, count)| DailyCount { date, count })
        .collect()
}

fn ranked(counts: HashMap<&str, u64>, limit: Option<usize>) -> Vec<CountEntry> {
    let mut entries: Vec<CountEntry> = counts
        .into_iter()
        .map(|(label, count)| CountEntry {
            label: label.to_string(),
            count,
        })
        .collect();

    entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    if let Some(limit) = limit {
        entries.truncate(limit);
    }
    entries
}
