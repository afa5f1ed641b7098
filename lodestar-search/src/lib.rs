//! # lodestar-search
//!
//! Concurrent metasearch over scraped public search engines.
//!
//! This crate fetches result pages from Bing, Yahoo, DuckDuckGo and Brave,
//! extracts a common [`SearchResult`] shape with CSS selectors, and merges
//! the per-engine lists in a fixed priority order. Image queries are served
//! by rendering Bing Images in a headless browser.
//!
//! ## Design
//!
//! - One adapter per engine behind [`SearchEngineTrait`]
//! - All engines queried concurrently; a failing or slow engine contributes
//!   an empty list and never fails the batch
//! - Engine redirect wrappers (Bing `ck/a`, Yahoo `RU=`, DuckDuckGo `uddg=`)
//!   are unwrapped to the destination URL
//! - Optional URL dedup and an owned TTL cache
//! - No process-wide state: each query carries a [`SearchContext`]
//!
//! ## Security
//!
//! - Query text is logged only at trace level and never placed in errors
//! - No network listeners; this is a library

pub mod cache;
pub mod config;
pub mod engine;
pub mod engines;
pub mod error;
pub mod http;
pub mod images;
pub mod orchestrator;
pub mod types;

pub use cache::{CacheKey, ResultCache};
pub use config::{DedupPolicy, SearchConfig};
pub use engine::SearchEngineTrait;
pub use error::{Result, SearchError};
pub use images::{ImageSearch, PageRenderer};
pub use orchestrator::{Aggregated, Aggregator, SearchContext};
pub use types::{ImageResult, QueryKind, SearchEngine, SearchResult};

use std::sync::Arc;

/// Search the web across every engine in `config` and merge the results.
///
/// Builds a one-off [`Aggregator`]; long-running callers should build one
/// aggregator and reuse it.
///
/// # Errors
///
/// Returns [`SearchError::Config`] if `config` is invalid. Individual
/// engine failures are logged and never surface here.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> lodestar_search::Result<()> {
/// let config = lodestar_search::SearchConfig::default();
/// let merged = lodestar_search::search("rust programming", &config).await?;
/// for result in &merged.items {
///     println!("[{}] {}: {}", result.source, result.title, result.url);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn search(query: &str, config: &SearchConfig) -> Result<Aggregated<SearchResult>> {
    let aggregator = Aggregator::new(config)?;
    let ctx = SearchContext::new(query, QueryKind::Web, Arc::new(config.clone()));
    Ok(aggregator.search_web(&ctx).await)
}

/// Search for images, launching and then closing a headless browser.
///
/// # Errors
///
/// Returns [`SearchError::Config`] for an invalid `config`, or
/// [`SearchError::Browser`] if the browser cannot be launched.
pub async fn search_images(query: &str, config: &SearchConfig) -> Result<Aggregated<ImageResult>> {
    let aggregator = Aggregator::new(config)?;
    let ctx = SearchContext::new(query, QueryKind::Image, Arc::new(config.clone()));
    let outcome = aggregator.search_images(&ctx).await;
    aggregator.shutdown().await;
    outcome
}
