//! Bing web search. First in merge priority.
//!
//! Bing sometimes wraps result links in a `bing.com/ck/a` click-tracking
//! redirect whose `u` parameter carries the destination as `a1` followed by
//! URL-safe base64. Those are unwrapped during parsing.

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use scraper::Html;
use url::Url;

use crate::config::SearchConfig;
use crate::engine::SearchEngineTrait;
use crate::error::SearchError;
use crate::http;
use crate::types::{SearchEngine, SearchResult};

use super::{element_text, selector};

/// Bing HTML search scraper.
pub struct BingEngine {
    client: reqwest::Client,
}

impl BingEngine {
    /// Create an adapter that sends requests through `client`.
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Unwrap a `bing.com/ck/a` redirect, or return the link unchanged.
    ///
    /// Falls back to the raw link if the `u` parameter is missing or does
    /// not decode to a UTF-8 URL.
    pub fn resolve_url(href: &str) -> String {
        let Ok(parsed) = Url::parse(href) else {
            return href.to_string();
        };
        let is_redirect = parsed
            .host_str()
            .is_some_and(|host| host.ends_with("bing.com"))
            && parsed.path().starts_with("/ck/a");
        if !is_redirect {
            return href.to_string();
        }

        parsed
            .query_pairs()
            .find(|(key, _)| key == "u")
            .and_then(|(_, value)| {
                let encoded = value.strip_prefix("a1")?.trim_end_matches('=').to_string();
                let bytes = URL_SAFE_NO_PAD.decode(encoded).ok()?;
                String::from_utf8(bytes).ok()
            })
            .filter(|decoded| decoded.starts_with("http"))
            .unwrap_or_else(|| href.to_string())
    }
}

#[async_trait]
impl SearchEngineTrait for BingEngine {
    async fn search(
        &self,
        query: &str,
        config: &SearchConfig,
    ) -> Result<Vec<SearchResult>, SearchError> {
        tracing::trace!(query, "Bing search");

        let request = self
            .client
            .get("https://www.bing.com/search")
            .query(&[("q", query), ("setlang", "en")]);
        let html = http::fetch_html(request, SearchEngine::Bing, config).await?;

        parse_bing_html(&html, config.max_results_per_engine)
    }

    fn engine_type(&self) -> SearchEngine {
        SearchEngine::Bing
    }
}

/// Parse Bing HTML response into search results.
pub(crate) fn parse_bing_html(
    html: &str,
    max_results: usize,
) -> Result<Vec<SearchResult>, SearchError> {
    let document = Html::parse_document(html);

    // Organic results live in li.b_algo; ads use li.b_ad and are not matched.
    let result_sel = selector("li.b_algo")?;
    let title_sel = selector("h2")?;
    let link_sel = selector("a[href]")?;
    let snippet_sel = selector(".b_caption p, .b_lineclamp2, .b_lineclamp3, .b_algoSlug")?;

    let mut results = Vec::new();

    for element in document.select(&result_sel) {
        let Some(title_el) = element.select(&title_sel).next() else {
            continue;
        };

        let href = title_el
            .select(&link_sel)
            .next()
            .and_then(|a| a.value().attr("href"))
            .unwrap_or_default();
        let url = BingEngine::resolve_url(href);

        let snippet = element
            .select(&snippet_sel)
            .next()
            .map(element_text)
            .unwrap_or_default();

        if let Some(result) =
            SearchResult::admit(element_text(title_el), url, snippet, SearchEngine::Bing)
        {
            results.push(result);
        }

        if results.len() >= max_results {
            break;
        }
    }

    tracing::debug!(count = results.len(), "Bing results parsed");
    Ok(results)
}
