//! Client metadata derived from redirect requests.
//!
//! Resolves the client IP address from connection info and proxy headers,
//! locates the address, and parses the user agent into device class,
//! browser, and operating system.

use axum::http::HeaderMap;
use regex::Regex;
use std::net::IpAddr;
use std::sync::LazyLock;

use crate::domain::entities::DeviceClass;
use crate::utils::geoip::GeoLookup;

pub const UNKNOWN: &str = "Unknown";
pub const LOCAL: &str = "Local";
pub const DIRECT_REFERRER: &str = "direct";

static TABLET_UA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)tablet|ipad|playbook|silk").expect("valid regex"));

static MOBILE_UA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"Mobile|iP(hone|od)|Android|BlackBerry|IEMobile|Kindle|Silk-Accelerated|(hpw|web)OS|Opera M(obi|ini)",
    )
    .expect("valid regex")
});

/// Coarse geographic classification of a client address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub country: String,
    pub city: String,
}

impl Location {
    fn fixed(value: &str) -> Self {
        Self {
            country: value.to_string(),
            city: value.to_string(),
        }
    }
}

/// Device, browser, and OS parsed from a `User-Agent` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAgentInfo {
    pub device: DeviceClass,
    pub browser: String,
    pub os: String,
}

/// Resolves the client IP address.
///
/// When `behind_proxy` is set, the first `X-Forwarded-For` entry wins, then
/// `X-Real-IP`. Otherwise only the peer socket address is trusted.
pub fn client_ip(headers: &HeaderMap, peer: Option<IpAddr>, behind_proxy: bool) -> String {
    if behind_proxy {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());

        let real_ip = || {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };

        if let Some(ip) = forwarded.or_else(real_ip) {
            return ip.to_string();
        }
    }

    peer.map(|ip| ip.to_string())
        .unwrap_or_else(|| "127.0.0.1".to_string())
}

/// Locates a client address.
///
/// Loopback, private and link-local addresses are `Local`. Public addresses
/// go to `geo` when one is configured; anything it cannot resolve, and any
/// unparseable input, is `Unknown`. IPv4-mapped IPv6 addresses are treated
/// as their IPv4 form.
pub fn locate(ip: &str, geo: Option<&dyn GeoLookup>) -> Location {
    let Ok(addr) = ip.parse::<IpAddr>() else {
        return Location::fixed(UNKNOWN);
    };
    let addr = unmap_ipv4(addr);

    if is_local(&addr) {
        return Location::fixed(LOCAL);
    }

    geo.and_then(|geo| geo.lookup(addr))
        .unwrap_or_else(|| Location::fixed(UNKNOWN))
}

fn unmap_ipv4(addr: IpAddr) -> IpAddr {
    match addr {
        IpAddr::V6(v6) => v6.to_ipv4_mapped().map_or(addr, IpAddr::V4),
        v4 => v4,
    }
}

fn is_local(addr: &IpAddr) -> bool {
    match addr {
        IpAddr::V4(v4) => v4.is_loopback() || v4.is_private() || v4.is_link_local(),
        IpAddr::V6(v6) => {
            let first = v6.segments()[0];
            v6.is_loopback() || (first & 0xfe00) == 0xfc00 || (first & 0xffc0) == 0xfe80
        }
    }
}

/// Parses a user agent string.
///
/// An empty user agent yields `unknown` / `Unknown` / `Unknown`.
pub fn parse_user_agent(user_agent: &str) -> UserAgentInfo {
    if user_agent.trim().is_empty() {
        return UserAgentInfo {
            device: DeviceClass::Unknown,
            browser: UNKNOWN.to_string(),
            os: UNKNOWN.to_string(),
        };
    }

    let ua = user_agent.to_ascii_lowercase();

    UserAgentInfo {
        device: device_class(user_agent, &ua),
        browser: browser_name(&ua).to_string(),
        os: os_name(&ua).to_string(),
    }
}

fn device_class(raw: &str, lower: &str) -> DeviceClass {
    // Android without "mobi" after it is a tablet
    let android_tablet = lower
        .rfind("android")
        .is_some_and(|pos| !lower[pos..].contains("mobi"));

    if TABLET_UA.is_match(raw) || android_tablet {
        DeviceClass::Tablet
    } else if MOBILE_UA.is_match(raw) {
        DeviceClass::Mobile
    } else {
        DeviceClass::Desktop
    }
}

fn browser_name(ua: &str) -> &'static str {
    if ua.contains("firefox") {
        "Firefox"
    } else if ua.contains("edg") {
        "Edge"
    } else if ua.contains("opr/") || ua.contains("opera") {
        "Opera"
    } else if ua.contains("chrome") {
        "Chrome"
    } else if ua.contains("safari") {
        "Safari"
    } else {
        UNKNOWN
    }
}

fn os_name(ua: &str) -> &'static str {
    if ua.contains("windows") {
        "Windows"
    } else if ua.contains("android") {
        "Android"
    } else if ua.contains("iphone") || ua.contains("ipad") || ua.contains("ipod") {
        "iOS"
    } else if ua.contains("mac") {
        "MacOS"
    } else if ua.contains("linux") {
        "Linux"
    } else {
        UNKNOWN
    }
}
