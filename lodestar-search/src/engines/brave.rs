//! Brave Search engine. Last in merge priority.
//!
//! Brave Search has its own web crawler and index, making it a
//! valuable source of results independent from Bing-backed engines.
//! Result links are direct, so no redirect unwrapping is needed.

use async_trait::async_trait;
use scraper::Html;

use crate::config::SearchConfig;
use crate::engine::SearchEngineTrait;
use crate::error::SearchError;
use crate::http;
use crate::types::{SearchEngine, SearchResult};

use super::{element_text, selector};

/// Brave Search HTML scraper.
pub struct BraveEngine {
    client: reqwest::Client,
}

impl BraveEngine {
    /// Create an adapter that sends requests through `client`.
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SearchEngineTrait for BraveEngine {
    async fn search(
        &self,
        query: &str,
        config: &SearchConfig,
    ) -> Result<Vec<SearchResult>, SearchError> {
        tracing::trace!(query, "Brave search");

        let request = self
            .client
            .get("https://search.brave.com/search")
            .query(&[("q", query), ("source", "web")]);
        let html = http::fetch_html(request, SearchEngine::Brave, config).await?;

        parse_brave_html(&html, config.max_results_per_engine)
    }

    fn engine_type(&self) -> SearchEngine {
        SearchEngine::Brave
    }
}

/// Parse Brave HTML response into search results.
pub(crate) fn parse_brave_html(
    html: &str,
    max_results: usize,
) -> Result<Vec<SearchResult>, SearchError> {
    let document = Html::parse_document(html);

    let result_sel = selector(r#"#results .snippet[data-type="web"]"#)?;
    let link_sel = selector(r#"a[href^="http"]"#)?;
    let title_sel = selector(".title, .snippet-title")?;
    let snippet_sel = selector(".snippet-description, .generic-snippet .content, .snippet-content")?;

    let mut results = Vec::new();

    for element in document.select(&result_sel) {
        let Some(link) = element.select(&link_sel).next() else {
            continue;
        };
        let url = link.value().attr("href").unwrap_or_default();

        let title = element
            .select(&title_sel)
            .next()
            .map(element_text)
            .unwrap_or_default();
        let snippet = element
            .select(&snippet_sel)
            .next()
            .map(element_text)
            .unwrap_or_default();

        if let Some(result) = SearchResult::admit(title, url, snippet, SearchEngine::Brave) {
            results.push(result);
        }

        if results.len() >= max_results {
            break;
        }
    }

    tracing::debug!(count = results.len(), "Brave results parsed");
    Ok(results)
}
