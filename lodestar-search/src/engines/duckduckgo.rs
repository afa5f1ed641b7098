//! DuckDuckGo search engine. Third in merge priority.
//!
//! Uses the HTML-only version at `https://html.duckduckgo.com/html/`
//! which requires no JavaScript and is tolerant of automated requests.

use async_trait::async_trait;
use scraper::Html;

use crate::config::SearchConfig;
use crate::engine::SearchEngineTrait;
use crate::error::SearchError;
use crate::http;
use crate::types::{SearchEngine, SearchResult};

use super::{element_text, selector};

/// Prefixes of DuckDuckGo's click-through redirect, in the forms seen in markup.
const REDIRECT_PREFIXES: &[&str] = &[
    "//duckduckgo.com/l/?",
    "https://duckduckgo.com/l/?",
    "http://duckduckgo.com/l/?",
];

/// DuckDuckGo HTML search engine scraper.
pub struct DuckDuckGoEngine {
    client: reqwest::Client,
}

impl DuckDuckGoEngine {
    /// Create an adapter that sends requests through `client`.
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Extract the actual URL from DuckDuckGo's redirect wrapper.
    ///
    /// DDG wraps URLs like `//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com&rut=...`.
    /// The `uddg` parameter is percent-decoded to recover the destination.
    /// Links that are not redirects, and redirects whose `uddg` parameter is
    /// missing or does not decode, are returned unchanged.
    pub fn resolve_url(href: &str) -> String {
        let Some(query) = REDIRECT_PREFIXES
            .iter()
            .find_map(|prefix| href.strip_prefix(prefix))
        else {
            return href.to_string();
        };

        let Some(encoded) = query
            .split('&')
            .find_map(|pair| pair.strip_prefix("uddg="))
        else {
            return href.to_string();
        };

        match urlencoding::decode(encoded) {
            Ok(decoded) if !decoded.is_empty() => decoded.into_owned(),
            _ => href.to_string(),
        }
    }
}

#[async_trait]
impl SearchEngineTrait for DuckDuckGoEngine {
    async fn search(
        &self,
        query: &str,
        config: &SearchConfig,
    ) -> Result<Vec<SearchResult>, SearchError> {
        tracing::trace!(query, "DuckDuckGo search");

        let request = self
            .client
            .get("https://html.duckduckgo.com/html/")
            .query(&[("q", query)]);
        let html = http::fetch_html(request, SearchEngine::DuckDuckGo, config).await?;

        parse_duckduckgo_html(&html, config.max_results_per_engine)
    }

    fn engine_type(&self) -> SearchEngine {
        SearchEngine::DuckDuckGo
    }
}

/// Parse DuckDuckGo HTML response into search results.
pub(crate) fn parse_duckduckgo_html(
    html: &str,
    max_results: usize,
) -> Result<Vec<SearchResult>, SearchError> {
    let document = Html::parse_document(html);

    let result_sel = selector(
        ".result.results_links.results_links_deep:not(.result--ad), .web-result:not(.result--ad)",
    )?;
    let title_sel = selector(".result__a")?;
    let snippet_sel = selector(".result__snippet")?;

    let mut results = Vec::new();

    for element in document.select(&result_sel) {
        let Some(title_el) = element.select(&title_sel).next() else {
            continue;
        };

        let url = DuckDuckGoEngine::resolve_url(title_el.value().attr("href").unwrap_or_default());
        let snippet = element
            .select(&snippet_sel)
            .next()
            .map(element_text)
            .unwrap_or_default();

        if let Some(result) =
            SearchResult::admit(element_text(title_el), url, snippet, SearchEngine::DuckDuckGo)
        {
            results.push(result);
        }

        if results.len() >= max_results {
            break;
        }
    }

    tracing::debug!(count = results.len(), "DuckDuckGo results parsed");
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MOCK_DDG_HTML: &str = r#"<!DOCTYPE html>
<html>
<body>
<div class="result results_links results_links_deep web-result">
    <a class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fwww.rust-lang.org%2F&amp;rut=abc123">
        Rust Programming Language
    </a>
    <div class="result__snippet">
        A language empowering everyone to build reliable and efficient software.
    </div>
</div>
<div class="result results_links results_links_deep web-result result--ad">
    <a class="result__a" href="https://ads.example.com/">Buy Rust (Ad)</a>
</div>
<div class="result results_links results_links_deep web-result">
    <a class="result__a" href="https://doc.rust-lang.org/book/">
        The Rust Programming Language Book
    </a>
</div>
<div class="result results_links results_links_deep web-result">
    <a class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fen.wikipedia.org%2Fwiki%2FRust_(programming_language)&amp;rut=def456">
        Rust (programming language) - Wikipedia
    </a>
    <div class="result__snippet">
        Rust is a multi-paradigm, general-purpose programming language.
    </div>
</div>
<div class="result results_links results_links_deep web-result">
    <a class="result__a">No href</a>
</div>
</body>
</html>"#;

    #[test]
    fn resolve_url_decodes_uddg_redirect() {
        let href = "//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com";
        assert_eq!(DuckDuckGoEngine::resolve_url(href), "https://example.com");
    }

    #[test]
    fn resolve_url_ignores_trailing_params() {
        let href = "//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com%2Fpage&rut=abc";
        assert_eq!(DuckDuckGoEngine::resolve_url(href), "https://example.com/page");
    }

    #[test]
    fn resolve_url_malformed_redirect_falls_back_to_raw() {
        let missing_param = "//duckduckgo.com/l/?rut=abc";
        assert_eq!(DuckDuckGoEngine::resolve_url(missing_param), missing_param);

        let bad_encoding = "//duckduckgo.com/l/?uddg=%FF%FE";
        assert_eq!(DuckDuckGoEngine::resolve_url(bad_encoding), bad_encoding);
    }

    #[test]
    fn resolve_url_direct_link_unchanged() {
        let href = "https://example.com/direct";
        assert_eq!(DuckDuckGoEngine::resolve_url(href), href);
    }

    #[test]
    fn parse_mock_html_returns_results() {
        let results = parse_duckduckgo_html(MOCK_DDG_HTML, 10).expect("should parse");
        assert_eq!(results.len(), 3);

        assert_eq!(results[0].title, "Rust Programming Language");
        assert_eq!(results[0].url, "https://www.rust-lang.org/");
        assert!(results[0].snippet.contains("reliable and efficient"));
        assert_eq!(results[0].source, SearchEngine::DuckDuckGo);

        assert_eq!(results[1].url, "https://doc.rust-lang.org/book/");
        assert_eq!(results[1].snippet, "");

        assert!(results[2].url.contains("wikipedia.org"));
    }

    #[test]
    fn parse_excludes_ads() {
        let results = parse_duckduckgo_html(MOCK_DDG_HTML, 10).expect("should parse");
        assert!(results.iter().all(|r| !r.title.contains("(Ad)")));
    }

    #[test]
    fn parse_never_leaves_redirect_wrappers() {
        let results = parse_duckduckgo_html(MOCK_DDG_HTML, 10).expect("should parse");
        for r in &results {
            assert!(!r.url.contains("duckduckgo.com/l/"), "URL still wrapped: {}", r.url);
        }
    }

    #[test]
    fn parse_respects_max_results() {
        let results = parse_duckduckgo_html(MOCK_DDG_HTML, 2).expect("should parse");
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn parse_empty_html_returns_empty() {
        let results = parse_duckduckgo_html("<html><body></body></html>", 10).expect("should parse");
        assert!(results.is_empty());
    }

    #[tokio::test]
    #[ignore] // Live test: run with `cargo test -- --ignored`
    async fn live_duckduckgo_search() {
        let engine = DuckDuckGoEngine::new(http::build_client().expect("client"));
        let results = engine
            .search("rust programming", &SearchConfig::default())
            .await
            .expect("live search should work");
        assert!(!results.is_empty());
    }
}
