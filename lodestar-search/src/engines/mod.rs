//! Search engine implementations.
//!
//! Each module provides a struct implementing [`crate::engine::SearchEngineTrait`] that
//! scrapes a specific search engine's HTML results page.

pub mod bing;
pub mod brave;
pub mod duckduckgo;
pub mod yahoo;

pub use bing::BingEngine;
pub use brave::BraveEngine;
pub use duckduckgo::DuckDuckGoEngine;
pub use yahoo::YahooEngine;

use std::sync::Arc;

use scraper::{ElementRef, Selector};

use crate::engine::SearchEngineTrait;
use crate::error::SearchError;
use crate::types::SearchEngine;

/// Construct the adapter for one engine, sharing the given HTTP client.
pub fn adapter_for(engine: SearchEngine, client: reqwest::Client) -> Arc<dyn SearchEngineTrait> {
    match engine {
        SearchEngine::Bing => Arc::new(BingEngine::new(client)),
        SearchEngine::Yahoo => Arc::new(YahooEngine::new(client)),
        SearchEngine::DuckDuckGo => Arc::new(DuckDuckGoEngine::new(client)),
        SearchEngine::Brave => Arc::new(BraveEngine::new(client)),
    }
}

/// Parse a CSS selector, mapping failures to [`SearchError::Parse`].
pub(crate) fn selector(css: &str) -> Result<Selector, SearchError> {
    Selector::parse(css).map_err(|e| SearchError::Parse(format!("invalid selector {css:?}: {e:?}")))
}

/// Concatenated, trimmed text content of an element.
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adapter_for_matches_engine() {
        let client = reqwest::Client::new();
        for engine in SearchEngine::all() {
            let adapter = adapter_for(*engine, client.clone());
            assert_eq!(adapter.engine_type(), *engine);
        }
    }

    #[test]
    fn invalid_selector_is_parse_error() {
        let err = selector("li[").unwrap_err();
        assert!(matches!(err, SearchError::Parse(_)));
    }
}
