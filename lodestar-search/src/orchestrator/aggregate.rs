//! Concurrent multi-engine fan-out and merge.

use std::sync::Arc;

use futures::future::join_all;
use serde::{Deserialize, Serialize};

use crate::config::{DedupPolicy, SearchConfig};
use crate::engine::SearchEngineTrait;
use crate::engines::adapter_for;
use crate::error::SearchError;
use crate::http;
use crate::images::browser::BrowserPool;
use crate::images::{ImageSearch, PageRenderer};
use crate::types::{ImageResult, QueryKind, SearchEngine, SearchResult};

use super::dedup::dedup_by_url;

/// Everything one query needs, threaded explicitly through the pipeline.
///
/// Nothing about an in-flight query lives outside its context, so
/// concurrent queries never share mutable state.
#[derive(Debug, Clone)]
pub struct SearchContext {
    /// The raw query text.
    pub query: String,
    /// Which vertical to search.
    pub kind: QueryKind,
    /// Search settings in effect for this query.
    pub config: Arc<SearchConfig>,
}

impl SearchContext {
    /// Build a context for `query` under `config`.
    pub fn new(query: impl Into<String>, kind: QueryKind, config: Arc<SearchConfig>) -> Self {
        Self {
            query: query.into(),
            kind,
            config,
        }
    }
}

/// A merged, ordered result list and its length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aggregated<T> {
    /// Results in merge order.
    pub items: Vec<T>,
    /// Number of results in `items`.
    pub total: usize,
}

impl<T> Aggregated<T> {
    /// Wrap `items`, recording their count.
    pub fn new(items: Vec<T>) -> Self {
        let total = items.len();
        Self { items, total }
    }

    /// An empty result set.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }
}

/// Drives the engine adapters for a query.
pub struct Aggregator {
    adapters: Vec<Arc<dyn SearchEngineTrait>>,
    images: Option<ImageSearch>,
    browser: Option<Arc<BrowserPool>>,
}

impl Aggregator {
    /// Build adapters for every engine in `config` plus a lazily launched
    /// headless browser for image queries.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if `config` is invalid, or
    /// [`SearchError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &SearchConfig) -> Result<Self, SearchError> {
        config.validate()?;
        let client = http::build_client()?;
        let adapters = config
            .engines
            .iter()
            .map(|engine| adapter_for(*engine, client.clone()))
            .collect();

        let browser = Arc::new(BrowserPool::new(
            config.browser_executable.clone(),
            config.user_agent.clone(),
        ));
        let renderer: Arc<dyn PageRenderer> = browser.clone();

        Ok(Self {
            adapters,
            images: Some(ImageSearch::new(renderer)),
            browser: Some(browser),
        })
    }

    /// Build an aggregator from ready-made adapters.
    ///
    /// Used to drive the merge logic with stand-in engines or renderers.
    pub fn with_adapters(
        adapters: Vec<Arc<dyn SearchEngineTrait>>,
        images: Option<ImageSearch>,
    ) -> Self {
        Self {
            adapters,
            images,
            browser: None,
        }
    }

    /// Query every enabled web engine concurrently and merge the results.
    ///
    /// All engines are awaited. An engine that errors or exceeds its
    /// timeout contributes nothing and is logged; it never fails the batch.
    /// Per-engine lists are concatenated in [`SearchEngine::priority`] order
    /// and then deduplicated if [`DedupPolicy::Url`] is set.
    pub async fn search_web(&self, ctx: &SearchContext) -> Aggregated<SearchResult> {
        let config = ctx.config.as_ref();
        let query = ctx.query.as_str();

        let pending = self
            .adapters
            .iter()
            .filter(|adapter| config.engines.contains(&adapter.engine_type()))
            .map(|adapter| query_engine(adapter.as_ref(), query, config));

        let mut outcomes: Vec<(SearchEngine, Vec<SearchResult>)> = join_all(pending).await;
        outcomes.sort_by_key(|(engine, _)| engine.priority());

        let merged: Vec<SearchResult> = outcomes
            .into_iter()
            .flat_map(|(_, results)| results)
            .filter(|r| !r.title.trim().is_empty() && !r.url.trim().is_empty())
            .collect();

        let items = match config.dedup {
            DedupPolicy::None => merged,
            DedupPolicy::Url => dedup_by_url(merged),
        };

        tracing::debug!(total = items.len(), "web results merged");
        Aggregated::new(items)
    }

    /// Run an image query through the headless image adapter.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if image search was not configured,
    /// or [`SearchError::Browser`] if the browser cannot be launched.
    pub async fn search_images(
        &self,
        ctx: &SearchContext,
    ) -> Result<Aggregated<ImageResult>, SearchError> {
        let images = self
            .images
            .as_ref()
            .ok_or_else(|| SearchError::Config("image search is not enabled".into()))?;
        let items = images.search(&ctx.query, &ctx.config).await?;
        tracing::debug!(total = items.len(), "image results collected");
        Ok(Aggregated::new(items))
    }

    /// Engines this aggregator can query, in the order they were given.
    pub fn engines(&self) -> Vec<SearchEngine> {
        self.adapters.iter().map(|a| a.engine_type()).collect()
    }

    /// Close the headless browser if one was launched.
    pub async fn shutdown(&self) {
        if let Some(browser) = &self.browser {
            browser.shutdown().await;
        }
    }
}

/// Query one engine under its timeout, converting any failure to an empty list.
async fn query_engine(
    adapter: &dyn SearchEngineTrait,
    query: &str,
    config: &SearchConfig,
) -> (SearchEngine, Vec<SearchResult>) {
    let engine = adapter.engine_type();
    let limit = config.timeout_for(engine);

    let results = match tokio::time::timeout(limit, adapter.search(query, config)).await {
        Ok(Ok(results)) => {
            tracing::debug!(%engine, count = results.len(), "engine returned results");
            results
        }
        Ok(Err(err)) => {
            tracing::warn!(%engine, error = %err, "engine query failed");
            Vec::new()
        }
        Err(_) => {
            tracing::warn!(%engine, timeout_secs = limit.as_secs(), "engine query timed out");
            Vec::new()
        }
    };

    (engine, results)
}
