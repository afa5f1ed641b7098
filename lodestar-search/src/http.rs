//! Shared HTTP client with User-Agent rotation for search engine requests.
//!
//! Provides a configured [`reqwest::Client`] with browser-like headers and
//! cookie support. Many engines refuse requests carrying a library default
//! User-Agent, so every request carries a realistic browser one.

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::types::SearchEngine;
use rand::seq::SliceRandom;

/// Realistic browser User-Agent strings, rotated per request.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:133.0) Gecko/20100101 Firefox/133.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:133.0) Gecko/20100101 Firefox/133.0",
];

/// Build a [`reqwest::Client`] configured for search engine scraping.
///
/// The client has a cookie store, brotli/gzip decompression and a bounded
/// redirect policy. Timeouts are applied per request by the caller so each
/// engine can carry its own bound.
///
/// # Errors
///
/// Returns [`SearchError::Http`] if the client cannot be constructed.
pub fn build_client() -> Result<reqwest::Client, SearchError> {
    reqwest::Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(|e| SearchError::Http(format!("failed to build HTTP client: {e}")))
}

/// The User-Agent to send: the configured one, or a random browser UA.
pub fn user_agent(config: &SearchConfig) -> String {
    match config.user_agent {
        Some(ref custom) => custom.clone(),
        None => random_user_agent().to_owned(),
    }
}

/// Select a random User-Agent string from the rotation list.
pub fn random_user_agent() -> &'static str {
    let mut rng = rand::thread_rng();
    USER_AGENTS
        .choose(&mut rng)
        .copied()
        // USER_AGENTS is a non-empty const array; choose only returns None on empty slices
        .unwrap_or(USER_AGENTS[0])
}

/// Send a prepared GET request and read the body as text.
///
/// Adds the browser-like headers shared by every engine and maps transport
/// and status failures to [`SearchError::Http`] tagged with the engine name.
pub async fn fetch_html(
    request: reqwest::RequestBuilder,
    engine: SearchEngine,
    config: &SearchConfig,
) -> Result<String, SearchError> {
    let response = request
        .header(reqwest::header::USER_AGENT, user_agent(config))
        .header(
            reqwest::header::ACCEPT,
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        )
        .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
        .timeout(config.timeout_for(engine))
        .send()
        .await
        .map_err(|e| SearchError::Http(format!("{engine} request failed: {e}")))?
        .error_for_status()
        .map_err(|e| SearchError::Http(format!("{engine} HTTP error: {e}")))?;

    let html = response
        .text()
        .await
        .map_err(|e| SearchError::Http(format!("{engine} response read failed: {e}")))?;

    tracing::trace!(%engine, bytes = html.len(), "response received");
    Ok(html)
}
