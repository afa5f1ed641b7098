//! Trait definition for pluggable search engine backends.
//!
//! Each web engine (Bing, Yahoo, DuckDuckGo, Brave) implements
//! [`SearchEngineTrait`] so the aggregator can drive them uniformly and a
//! markup change on one site only ever breaks one adapter.

use async_trait::async_trait;

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::types::{SearchEngine, SearchResult};

/// A pluggable search engine backend.
///
/// Implementors scrape a specific search engine's HTML response and extract
/// structured [`SearchResult`] values. Each engine handles its own:
///
/// - URL construction with query encoding
/// - HTML parsing via CSS selectors
/// - Unwrapping of engine-specific redirect links
///
/// Implementations return errors freely; isolating one engine's failure from
/// the batch is the aggregator's job. All implementations must be
/// `Send + Sync` for concurrent engine queries.
#[async_trait]
pub trait SearchEngineTrait: Send + Sync {
    /// Perform a web search and return parsed results in scrape order.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] if the HTTP request fails or the response
    /// cannot be parsed.
    async fn search(
        &self,
        query: &str,
        config: &SearchConfig,
    ) -> Result<Vec<SearchResult>, SearchError>;

    /// Returns which [`SearchEngine`] variant this implementation represents.
    fn engine_type(&self) -> SearchEngine;
}
