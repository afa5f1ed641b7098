//! Yahoo web search. Second in merge priority.
//!
//! Yahoo routes every organic link through `r.search.yahoo.com`, encoding
//! the destination as a percent-encoded `/RU=` path segment.

use async_trait::async_trait;
use scraper::Html;

use crate::config::SearchConfig;
use crate::engine::SearchEngineTrait;
use crate::error::SearchError;
use crate::http;
use crate::types::{SearchEngine, SearchResult};

use super::{element_text, selector};

/// Yahoo HTML search scraper.
pub struct YahooEngine {
    client: reqwest::Client,
}

impl YahooEngine {
    /// Create an adapter that sends requests through `client`.
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Recover the destination from a Yahoo redirect link.
    ///
    /// `https://r.search.yahoo.com/_ylt=.../RU=https%3a%2f%2fexample.com%2f/RK=2/RS=...`
    /// yields `https://example.com/`. Anything else, including a redirect
    /// whose payload does not decode, is returned unchanged.
    pub fn resolve_url(href: &str) -> String {
        if !href.contains("r.search.yahoo.com") {
            return href.to_string();
        }
        let Some(start) = href.find("/RU=") else {
            return href.to_string();
        };
        let rest = &href[start + "/RU=".len()..];
        let encoded = rest.split("/R").next().unwrap_or(rest);

        match urlencoding::decode(encoded) {
            Ok(decoded) if decoded.starts_with("http") => decoded.into_owned(),
            _ => href.to_string(),
        }
    }
}

#[async_trait]
impl SearchEngineTrait for YahooEngine {
    async fn search(
        &self,
        query: &str,
        config: &SearchConfig,
    ) -> Result<Vec<SearchResult>, SearchError> {
        tracing::trace!(query, "Yahoo search");

        let request = self
            .client
            .get("https://search.yahoo.com/search")
            .query(&[("p", query), ("ei", "UTF-8")]);
        let html = http::fetch_html(request, SearchEngine::Yahoo, config).await?;

        parse_yahoo_html(&html, config.max_results_per_engine)
    }

    fn engine_type(&self) -> SearchEngine {
        SearchEngine::Yahoo
    }
}

/// Parse Yahoo HTML response into search results.
pub(crate) fn parse_yahoo_html(
    html: &str,
    max_results: usize,
) -> Result<Vec<SearchResult>, SearchError> {
    let document = Html::parse_document(html);

    let result_sel = selector("div.algo")?;
    let link_sel = selector("h3 a[href], .compTitle a[href]")?;
    let snippet_sel = selector(".compText p, .compText")?;

    let mut results = Vec::new();

    for element in document.select(&result_sel) {
        let Some(link) = element.select(&link_sel).next() else {
            continue;
        };

        // The anchor text is prefixed with a breadcrumb span; the aria-label
        // carries the clean title when present.
        let title = link
            .value()
            .attr("aria-label")
            .map(str::to_string)
            .unwrap_or_else(|| element_text(link));
        let url = YahooEngine::resolve_url(link.value().attr("href").unwrap_or_default());
        let snippet = element
            .select(&snippet_sel)
            .next()
            .map(element_text)
            .unwrap_or_default();

        if let Some(result) = SearchResult::admit(title, url, snippet, SearchEngine::Yahoo) {
            results.push(result);
        }

        if results.len() >= max_results {
            break;
        }
    }

    tracing::debug!(count = results.len(), "Yahoo results parsed");
    Ok(results)
}
