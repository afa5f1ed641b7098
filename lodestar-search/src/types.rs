//! Core types for search results and engine identification.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single web search result scraped from one engine.
///
/// Only admitted when both `title` and `url` are non-empty; the parsers
/// skip anything else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// The title of the search result page.
    pub title: String,
    /// The destination URL, with engine redirect wrappers removed.
    pub url: String,
    /// A text snippet summarising the page content. Empty when the engine
    /// did not provide one.
    #[serde(default)]
    pub snippet: String,
    /// Which search engine returned this result.
    pub source: SearchEngine,
}

impl SearchResult {
    /// Build a result, returning `None` if the title or URL is blank.
    pub fn admit(
        title: impl Into<String>,
        url: impl Into<String>,
        snippet: impl Into<String>,
        source: SearchEngine,
    ) -> Option<Self> {
        let title = collapse_whitespace(&title.into());
        let url = url.into().trim().to_string();
        if title.is_empty() || url.is_empty() {
            return None;
        }
        Some(Self {
            title,
            url,
            snippet: collapse_whitespace(&snippet.into()),
            source,
        })
    }
}

/// A single image result scraped from the rendered image search page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageResult {
    /// Human-readable description of the image.
    pub title: String,
    /// Small preview image URL.
    pub thumbnail_url: String,
    /// Full-resolution image URL.
    pub full_url: String,
    /// The page the image was found on.
    pub page_url: String,
    /// Which search engine returned this image.
    pub source: SearchEngine,
}

/// Supported web search engines.
///
/// The declaration order of [`SearchEngine::all`] is the merge priority
/// used by the aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchEngine {
    /// Bing. Also hosts the image search vertical.
    Bing,
    /// Yahoo. Bing-backed, but with its own result selection.
    Yahoo,
    /// DuckDuckGo. HTML-only endpoint, scraper-friendly.
    DuckDuckGo,
    /// Brave Search. Independent index.
    Brave,
}

impl SearchEngine {
    /// Returns the human-readable name of this engine.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bing => "Bing",
            Self::Yahoo => "Yahoo",
            Self::DuckDuckGo => "DuckDuckGo",
            Self::Brave => "Brave",
        }
    }

    /// Position of this engine in the merge order (lower merges first).
    pub fn priority(&self) -> usize {
        match self {
            Self::Bing => 0,
            Self::Yahoo => 1,
            Self::DuckDuckGo => 2,
            Self::Brave => 3,
        }
    }

    /// Returns all web engines in merge priority order.
    pub fn all() -> &'static [SearchEngine] {
        &[Self::Bing, Self::Yahoo, Self::DuckDuckGo, Self::Brave]
    }
}

impl fmt::Display for SearchEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which vertical a query targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryKind {
    /// Fan out to every configured web engine.
    #[default]
    Web,
    /// Render the image search page in the headless browser.
    Image,
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Web => f.write_str("web"),
            Self::Image => f.write_str("image"),
        }
    }
}

/// Collapse runs of whitespace (including the newlines scraped markup is
/// full of) into single spaces.
pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
