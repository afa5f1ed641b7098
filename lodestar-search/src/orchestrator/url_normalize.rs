//! Canonical keys for comparing result URLs across engines.
//!
//! Two engines rarely link a page identically: one adds `www.`, another
//! appends click-tracking parameters, a third keeps a trailing slash. The
//! key produced here ignores those differences so that URL dedup sees one
//! page where there is one page.

use url::Url;

/// Query parameters that never change which page is served.
const TRACKING_PARAMS: &[&str] = &[
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
    "fbclid",
    "gclid",
    "msclkid",
    "yclid",
    "ref",
];

/// Canonical form of `raw` for equality comparison.
///
/// The key is scheme-less: `http://www.example.com/a/` and
/// `https://example.com/a?utm_source=x#top` map to the same key. Host case,
/// a leading `www.`, default ports, fragments, tracking parameters, query
/// parameter order and a trailing path slash are all ignored. Path case is
/// kept. Unparseable input is returned trimmed and lowercased.
///
/// # Examples
///
/// ```
/// use lodestar_search::orchestrator::url_normalize::normalize_url;
///
/// assert_eq!(
///     normalize_url("https://WWW.Example.com/docs/?b=2&a=1#intro"),
///     normalize_url("http://example.com/docs?a=1&b=2"),
/// );
/// ```
pub fn normalize_url(raw: &str) -> String {
    let trimmed = raw.trim();
    let Ok(parsed) = Url::parse(trimmed) else {
        return trimmed.to_lowercase();
    };
    let Some(host) = parsed.host_str() else {
        return trimmed.to_lowercase();
    };

    let host = host.strip_prefix("www.").unwrap_or(host);
    let mut key = String::from(host);

    // `port()` is None when the port is the scheme default.
    if let Some(port) = parsed.port() {
        key.push(':');
        key.push_str(&port.to_string());
    }

    key.push_str(parsed.path().trim_end_matches('/'));

    let mut params: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(name, _)| !TRACKING_PARAMS.contains(&name.to_lowercase().as_str()))
        .map(|(name, value)| (name.into_owned(), value.into_owned()))
        .collect();
    if !params.is_empty() {
        params.sort();
        let query: Vec<String> = params
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect();
        key.push('?');
        key.push_str(&query.join("&"));
    }

    key
}
