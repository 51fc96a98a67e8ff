//! Target URL normalization.
//!
//! Shortened targets are stored in a canonical form: scheme-less input is
//! assumed to be HTTPS, hostnames are lowercased, default ports and fragments
//! are dropped.

use regex::Regex;
use std::sync::LazyLock;
use url::Url;

/// Matches an explicit non-hierarchical scheme such as `mailto:` or `javascript:`.
///
/// A digit after the colon means `host:port`, not a scheme.
static OPAQUE_SCHEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*:[^0-9]").expect("valid regex"));

/// Errors that can occur during URL normalization.
#[derive(Debug, thiserror::Error)]
pub enum UrlNormalizationError {
    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Only HTTP and HTTPS protocols are allowed")]
    UnsupportedProtocol,

    #[error("URL must contain a host")]
    MissingHost,

    #[error("Failed to normalize URL: {0}")]
    NormalizationFailed(String),
}

/// Normalizes a shorten target to a canonical absolute URL.
///
/// # Rules
///
/// 1. Input without a scheme (`example.com/path`) is treated as `https://`
/// 2. Only HTTP and HTTPS are accepted
/// 3. Hostname is lowercased
/// 4. Default ports (80, 443) are removed
/// 5. Fragments are removed; path and query are preserved
///
/// # Errors
///
/// Returns [`UrlNormalizationError::InvalidFormat`] for malformed input and
/// [`UrlNormalizationError::UnsupportedProtocol`] for schemes like
/// `javascript:`, `data:` or `ftp://`.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(
///     normalize_target_url("Example.COM/docs#intro").unwrap(),
///     "https://example.com/docs"
/// );
/// ```
pub fn normalize_target_url(input: &str) -> Result<String, UrlNormalizationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(UrlNormalizationError::InvalidFormat(
            "URL is empty".to_string(),
        ));
    }

    let candidate = if trimmed.contains("://") || OPAQUE_SCHEME.is_match(trimmed) {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    let mut url =
        Url::parse(&candidate).map_err(|e| UrlNormalizationError::InvalidFormat(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        _ => return Err(UrlNormalizationError::UnsupportedProtocol),
    }

    let host = url
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or(UrlNormalizationError::MissingHost)?
        .to_ascii_lowercase();
    url.set_host(Some(&host)).map_err(|_| {
        UrlNormalizationError::NormalizationFailed("Failed to set normalized host".to_string())
    })?;

    url.set_fragment(None);

    let is_default_port = matches!(
        (url.scheme(), url.port()),
        ("http", Some(80)) | ("https", Some(443))
    );
    if is_default_port {
        url.set_port(None).map_err(|_| {
            UrlNormalizationError::NormalizationFailed("Failed to remove default port".to_string())
        })?;
    }

    Ok(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_simple_https() {
        let result = normalize_target_url("https://example.com");
        assert_eq!(result.unwrap(), "https://example.com/");
    }

    #[test]
    fn test_normalize_missing_scheme_defaults_to_https() {
        let result = normalize_target_url("example.com/path");
        assert_eq!(result.unwrap(), "https://example.com/path");
    }

    #[test]
    fn test_normalize_missing_scheme_with_port() {
        let result = normalize_target_url("example.com:8080/path");
        assert_eq!(result.unwrap(), "https://example.com:8080/path");
    }

    #[test]
    fn test_normalize_keeps_http() {
        let result = normalize_target_url("http://example.com/a");
        assert_eq!(result.unwrap(), "http://example.com/a");
    }

    #[test]
    fn test_normalize_uppercase_host() {
        let result = normalize_target_url("https://EXAMPLE.COM/Path");
        assert_eq!(result.unwrap(), "https://example.com/Path");
    }

    #[test]
    fn test_normalize_remove_default_ports() {
        assert_eq!(
            normalize_target_url("http://example.com:80/path").unwrap(),
            "http://example.com/path"
        );
        assert_eq!(
            normalize_target_url("https://example.com:443/path").unwrap(),
            "https://example.com/path"
        );
    }

    #[test]
    fn test_normalize_remove_fragment_keep_query() {
        let result = normalize_target_url("https://example.com/page?key=value#section");
        assert_eq!(result.unwrap(), "https://example.com/page?key=value");
    }

    #[test]
    fn test_normalize_trims_whitespace() {
        let result = normalize_target_url("  https://example.com/x  ");
        assert_eq!(result.unwrap(), "https://example.com/x");
    }

    #[test]
    fn test_normalize_empty_string() {
        assert!(matches!(
            normalize_target_url("   ").unwrap_err(),
            UrlNormalizationError::InvalidFormat(_)
        ));
    }

    #[test]
    fn test_normalize_spaces_in_host() {
        assert!(matches!(
            normalize_target_url("not a valid url").unwrap_err(),
            UrlNormalizationError::InvalidFormat(_)
        ));
    }

    #[test]
    fn test_normalize_ftp_protocol() {
        assert!(matches!(
            normalize_target_url("ftp://example.com/file.txt").unwrap_err(),
            UrlNormalizationError::UnsupportedProtocol
        ));
    }

    #[test]
    fn test_normalize_javascript_protocol() {
        assert!(matches!(
            normalize_target_url("javascript:alert('xss')").unwrap_err(),
            UrlNormalizationError::UnsupportedProtocol
        ));
    }

    #[test]
    fn test_normalize_mailto_protocol() {
        assert!(matches!(
            normalize_target_url("mailto:test@example.com").unwrap_err(),
            UrlNormalizationError::UnsupportedProtocol
        ));
    }

    #[test]
    fn test_normalize_localhost_with_port() {
        let result = normalize_target_url("http://localhost:3000/test");
        assert_eq!(result.unwrap(), "http://localhost:3000/test");
    }
}
