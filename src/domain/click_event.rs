//! Click event model for asynchronous click tracking.

use chrono::{DateTime, Utc};

use crate::domain::entities::NewClick;
use crate::utils::client_info::{DIRECT_REFERRER, locate, parse_user_agent};
use crate::utils::geoip::GeoLookup;

/// Raw metadata of one redirect, queued for the background worker.
///
/// The redirect handler only captures what the request carries; derived
/// fields (location, device, browser, OS) are resolved by [`ClickEvent::enrich`]
/// off the request path.
#[derive(Debug, Clone)]
pub struct ClickEvent {
    pub link_id: i64,
    pub clicked_at: DateTime<Utc>,
    pub ip: String,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
}

impl ClickEvent {
    /// Creates a click event stamped with the current time.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let event = ClickEvent::new(
    ///     42,
    ///     "192.168.1.1".to_string(),
    ///     Some("Mozilla/5.0"),
    ///     Some("https://google.com"),
    /// );
    /// ```
    pub fn new(link_id: i64, ip: String, user_agent: Option<&str>, referer: Option<&str>) -> Self {
        Self {
            link_id,
            clicked_at: Utc::now(),
            ip,
            user_agent: user_agent.map(|s| s.to_string()),
            referer: referer.map(|s| s.to_string()),
        }
    }

    /// Resolves derived fields and produces a persistable click.
    ///
    /// Without a `geo` source public addresses are located as `Unknown`.
    pub fn enrich(&self, geo: Option<&dyn GeoLookup>) -> NewClick {
        let user_agent = self.user_agent.clone().unwrap_or_default();
        let agent = parse_user_agent(&user_agent);
        let location = locate(&self.ip, geo);

        let referrer = self
            .referer
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .unwrap_or(DIRECT_REFERRER)
            .to_string();

        NewClick {
            link_id: self.link_id,
            clicked_at: self.clicked_at,
            ip: self.ip.clone(),
            user_agent,
            referrer,
            country: location.country,
            city: location.city,
            device: agent.device,
            browser: agent.browser,
            os: agent.os,
        }
    }
}
