//! Error types for the lodestar-search crate.
//!
//! Messages are stable strings suitable for logs and API error bodies.
//! Query text never appears in an error message.

/// Errors that can occur while scraping or aggregating search engines.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// An HTTP request to a search engine failed.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Failed to parse a search engine response.
    #[error("parse error: {0}")]
    Parse(String),

    /// An engine did not answer within its timeout.
    #[error("search timed out: {0}")]
    Timeout(String),

    /// Invalid search configuration.
    #[error("config error: {0}")]
    Config(String),

    /// The headless browser could not be launched or driven.
    #[error("browser error: {0}")]
    Browser(String),
}

/// Convenience type alias for lodestar-search results.
pub type Result<T> = std::result::Result<T, SearchError>;
