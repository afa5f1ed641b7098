//! The metasearch request pipeline.
//!
//! query → aggregate (all engines, or the image adapter) → post-process
//! (web only) → cache → paginate.
//!
//! The full ranked outcome is cached per query, so moving between pages
//! neither re-scrapes the engines nor repeats the LLM call.

use std::sync::Arc;

use lodestar_search::{
    Aggregated, Aggregator, CacheKey, ImageResult, QueryKind, ResultCache, SearchConfig,
    SearchContext, SearchResult,
};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ServiceError};
use crate::pagination::PageInfo;
use crate::ranking::{PostProcessor, Processed, ToolLink};

/// One metasearch query, as received from a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetasearchRequest {
    /// Query text.
    pub query: String,
    /// Web or image.
    pub kind: QueryKind,
    /// Requested 1-based page.
    pub page: usize,
    /// Requested page size.
    pub page_size: usize,
}

impl MetasearchRequest {
    /// Build a request, rejecting blank query text.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::BadRequest`] if `query` is empty after trimming.
    pub fn new(
        query: impl Into<String>,
        kind: QueryKind,
        page: usize,
        page_size: usize,
    ) -> Result<Self> {
        let query = query.into().trim().to_owned();
        if query.is_empty() {
            return Err(ServiceError::BadRequest("query must not be empty".into()));
        }
        Ok(Self {
            query,
            kind,
            page,
            page_size,
        })
    }
}

/// Items of one page, web or image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PageItems {
    /// Web results.
    Web(Vec<SearchResult>),
    /// Image results.
    Images(Vec<ImageResult>),
}

impl PageItems {
    /// Number of items on the page.
    pub fn len(&self) -> usize {
        match self {
            Self::Web(items) => items.len(),
            Self::Images(items) => items.len(),
        }
    }

    /// Whether the page is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Response body of `GET /api/metasearch`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetasearchResponse {
    /// This page's items.
    pub items: PageItems,
    /// Total items across all pages.
    pub total: usize,
    /// 1-based page number actually served.
    pub page: usize,
    /// Number of pages.
    pub total_pages: usize,
    /// Whether a previous page exists.
    pub has_previous: bool,
    /// Whether a next page exists.
    pub has_next: bool,
    /// LLM summary of the results (web only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Suggested tool (web only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<ToolLink>,
}

/// Ties the aggregator, post-processor and caches together.
pub struct Pipeline {
    aggregator: Arc<Aggregator>,
    post: PostProcessor,
    search: Arc<SearchConfig>,
    web_cache: ResultCache<Arc<Processed>>,
    image_cache: ResultCache<Arc<Aggregated<ImageResult>>>,
}

impl Pipeline {
    /// Create a pipeline. Caches use `search.cache_ttl_seconds`.
    pub fn new(aggregator: Arc<Aggregator>, post: PostProcessor, search: SearchConfig) -> Self {
        let ttl = search.cache_ttl_seconds;
        Self {
            aggregator,
            post,
            search: Arc::new(search),
            web_cache: ResultCache::from_ttl_seconds(ttl),
            image_cache: ResultCache::from_ttl_seconds(ttl),
        }
    }

    /// The aggregator this pipeline drives.
    pub fn aggregator(&self) -> &Arc<Aggregator> {
        &self.aggregator
    }

    /// Run one request end to end.
    ///
    /// # Errors
    ///
    /// Engine failures never surface here. Errors come only from the image
    /// adapter being unable to launch its browser.
    pub async fn run(&self, request: &MetasearchRequest) -> Result<MetasearchResponse> {
        let ctx = SearchContext::new(&request.query, request.kind, Arc::clone(&self.search));
        let key = CacheKey::new(&ctx.query, ctx.kind, &ctx.config.engines);

        match ctx.kind {
            QueryKind::Web => {
                let processed = self.web(&ctx, key).await;
                let info = PageInfo::new(processed.items.len(), request.page_size, request.page);
                Ok(MetasearchResponse {
                    items: PageItems::Web(info.slice(&processed.items).to_vec()),
                    total: info.total,
                    page: info.page,
                    total_pages: info.total_pages,
                    has_previous: info.has_previous,
                    has_next: info.has_next,
                    summary: processed.summary.clone(),
                    tool: processed.tool.clone(),
                })
            }
            QueryKind::Image => {
                let images = self.images(&ctx, key).await?;
                let info = PageInfo::new(images.total, request.page_size, request.page);
                Ok(MetasearchResponse {
                    items: PageItems::Images(info.slice(&images.items).to_vec()),
                    total: info.total,
                    page: info.page,
                    total_pages: info.total_pages,
                    has_previous: info.has_previous,
                    has_next: info.has_next,
                    summary: None,
                    tool: None,
                })
            }
        }
    }

    async fn web(&self, ctx: &SearchContext, key: CacheKey) -> Arc<Processed> {
        if let Some(hit) = self.web_cache.get(&key).await {
            tracing::debug!("web outcome served from cache");
            return hit;
        }

        let merged = self.aggregator.search_web(ctx).await;
        let processed = Arc::new(self.post.process(&ctx.query, merged.items).await);

        // An empty slate is usually a transient block; let the next request retry.
        if !processed.items.is_empty() {
            self.web_cache.insert(key, Arc::clone(&processed)).await;
        }
        processed
    }

    async fn images(
        &self,
        ctx: &SearchContext,
        key: CacheKey,
    ) -> Result<Arc<Aggregated<ImageResult>>> {
        if let Some(hit) = self.image_cache.get(&key).await {
            tracing::debug!("image outcome served from cache");
            return Ok(hit);
        }

        let images = Arc::new(self.aggregator.search_images(ctx).await?);
        if images.total > 0 {
            self.image_cache.insert(key, Arc::clone(&images)).await;
        }
        Ok(images)
    }
}
