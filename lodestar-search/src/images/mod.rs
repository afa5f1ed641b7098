//! Image search via a rendered results page.
//!
//! Bing Images only fills in image metadata after its scripts run: each
//! result anchor (`a.iusc`) carries a JSON blob in its `m` attribute with
//! the title, thumbnail, full-size and source-page URLs. The page is
//! therefore rendered in a headless browser (see [`browser`]) before the
//! anchors are parsed.

pub mod browser;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use scraper::Html;
use serde::Deserialize;
use url::Url;

use crate::config::SearchConfig;
use crate::engines::selector;
use crate::error::SearchError;
use crate::types::{ImageResult, SearchEngine};

/// Path fragments that mark an image as site chrome rather than content.
const DENYLIST: &[&str] = &[
    "logo",
    "favicon",
    "icon",
    "sprite",
    "transparent.png",
    "blank.gif",
];

/// CSS selector that appears once image metadata has been rendered.
const READY_SELECTOR: &str = "a.iusc";

/// Something that can load a URL, let its scripts run, and hand back the DOM.
///
/// Implementations must distinguish between the renderer itself being
/// unavailable ([`SearchError::Browser`]) and a single page failing to load
/// (any other variant).
#[async_trait]
pub trait PageRenderer: Send + Sync {
    /// Load `url`, wait up to `timeout` for `ready_selector` to match, and
    /// return the serialised DOM.
    async fn render(
        &self,
        url: &str,
        ready_selector: &str,
        timeout: Duration,
    ) -> Result<String, SearchError>;
}

/// Headless-browser image search adapter.
pub struct ImageSearch {
    renderer: Arc<dyn PageRenderer>,
}

impl ImageSearch {
    /// Create an adapter that renders pages through `renderer`.
    pub fn new(renderer: Arc<dyn PageRenderer>) -> Self {
        Self { renderer }
    }

    /// Search for images matching `query`.
    ///
    /// A page that fails to load or parse yields an empty list (logged).
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Browser`] only when the browser itself cannot
    /// be launched or driven.
    pub async fn search(
        &self,
        query: &str,
        config: &SearchConfig,
    ) -> Result<Vec<ImageResult>, SearchError> {
        tracing::trace!(query, "image search");

        let url = image_search_url(query);
        let html = match self
            .renderer
            .render(&url, READY_SELECTOR, config.image_timeout())
            .await
        {
            Ok(html) => html,
            Err(err @ SearchError::Browser(_)) => return Err(err),
            Err(err) => {
                tracing::warn!(error = %err, "image page render failed");
                return Ok(Vec::new());
            }
        };

        match parse_image_html(&html, config.image_limit()) {
            Ok(images) => Ok(images),
            Err(err) => {
                tracing::warn!(error = %err, "image page parse failed");
                Ok(Vec::new())
            }
        }
    }
}

/// Build the Bing Images results URL for `query`.
pub fn image_search_url(query: &str) -> String {
    format!(
        "https://www.bing.com/images/search?q={}&form=HDRSC2&first=1",
        urlencoding::encode(query)
    )
}

/// Returns `false` for URLs whose path names a logo, icon, sprite or
/// placeholder image.
///
/// Matching is a case-insensitive substring test against the URL path; if
/// the URL cannot be parsed the whole string is tested instead. Non-HTTP
/// URLs are rejected outright.
pub fn is_valid_image_url(raw: &str) -> bool {
    let trimmed = raw.trim();
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return false;
    }
    let path = match Url::parse(trimmed) {
        Ok(parsed) => parsed.path().to_lowercase(),
        Err(_) => trimmed.to_lowercase(),
    };
    !DENYLIST.iter().any(|token| path.contains(token))
}

/// Metadata blob embedded in each rendered image anchor.
///
/// Bing uses short keys; the long names are accepted for engines that
/// spell them out.
#[derive(Debug, Deserialize)]
struct AnchorMetadata {
    #[serde(default, alias = "desc")]
    description: Option<String>,
    #[serde(default, rename = "t")]
    title: Option<String>,
    #[serde(default, alias = "turl")]
    thumbnail_url: Option<String>,
    #[serde(default, alias = "murl")]
    full_url: Option<String>,
    #[serde(default, alias = "purl")]
    page_url: Option<String>,
}

/// Parse rendered image search HTML into at most `limit` valid images.
pub(crate) fn parse_image_html(html: &str, limit: usize) -> Result<Vec<ImageResult>, SearchError> {
    let document = Html::parse_document(html);
    let anchor_sel = selector("a.iusc")?;

    let mut images = Vec::new();

    for anchor in document.select(&anchor_sel) {
        let Some(blob) = anchor
            .value()
            .attr("m")
            .or_else(|| anchor.value().attr("data-m"))
        else {
            continue;
        };

        let meta: AnchorMetadata = match serde_json::from_str(blob) {
            Ok(meta) => meta,
            Err(err) => {
                tracing::debug!(error = %err, "skipping image anchor with bad metadata");
                continue;
            }
        };

        let Some(full_url) = meta.full_url.filter(|u| is_valid_image_url(u)) else {
            continue;
        };
        let thumbnail_url = meta.thumbnail_url.unwrap_or_else(|| full_url.clone());
        if !is_valid_image_url(&thumbnail_url) {
            continue;
        }

        let title = meta
            .description
            .or(meta.title)
            .map(|t| crate::types::collapse_whitespace(&t))
            .unwrap_or_default();

        images.push(ImageResult {
            title,
            thumbnail_url,
            full_url,
            page_url: meta.page_url.unwrap_or_default(),
            source: SearchEngine::Bing,
        });

        if images.len() >= limit {
            break;
        }
    }

    tracing::debug!(count = images.len(), "image results parsed");
    Ok(images)
}
