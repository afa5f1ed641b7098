//! YouTube Data API v3 video search.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::VideoConfig;
use crate::error::{Result, ServiceError};

/// Longest upstream error body echoed into an error message.
const MAX_ERROR_BODY: usize = 300;

/// One video hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoResult {
    /// YouTube video id.
    pub video_id: String,
    /// Video title.
    pub title: String,
    /// Video description, possibly truncated by the API.
    pub description: String,
    /// Uploading channel.
    pub channel_title: String,
    /// Best available thumbnail.
    pub thumbnail_url: String,
    /// Watch page.
    pub url: String,
    /// RFC 3339 publish time as reported by the API.
    pub published_at: String,
}

/// Client for the YouTube `search` endpoint.
pub struct YouTubeClient {
    api_key: String,
    base_url: String,
    max_results: u32,
    http: reqwest::Client,
}

impl std::fmt::Debug for YouTubeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YouTubeClient")
            .field("base_url", &self.base_url)
            .field("max_results", &self.max_results)
            .finish_non_exhaustive()
    }
}

impl YouTubeClient {
    /// Build a client.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Config`] if the HTTP client cannot be built.
    pub fn new(api_key: impl Into<String>, config: &VideoConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ServiceError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            api_key: api_key.into(),
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            max_results: config.max_results,
            http,
        })
    }

    /// Search videos matching `query`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::BadRequest`] for a blank query and
    /// [`ServiceError::Upstream`] if the API call fails.
    pub async fn search(&self, query: &str) -> Result<Vec<VideoResult>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ServiceError::BadRequest("query must not be empty".into()));
        }

        let max_results = self.max_results.to_string();
        let response = self
            .http
            .get(format!("{}/youtube/v3/search", self.base_url))
            .query(&[
                ("part", "snippet"),
                ("type", "video"),
                ("maxResults", max_results.as_str()),
                ("q", query),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| ServiceError::Upstream(format!("video search failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let body: String = body.chars().take(MAX_ERROR_BODY).collect();
            return Err(ServiceError::Upstream(format!("video API HTTP {status}: {body}")));
        }

        let parsed: SearchListResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::Upstream(format!("invalid video API response: {e}")))?;

        let videos: Vec<VideoResult> = parsed.items.into_iter().filter_map(to_video).collect();
        tracing::debug!(count = videos.len(), "video search complete");
        Ok(videos)
    }
}

#[derive(Debug, Deserialize)]
struct SearchListResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: ItemId,
    #[serde(default)]
    snippet: Option<Snippet>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemId {
    #[serde(default)]
    video_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Snippet {
    title: String,
    description: String,
    channel_title: String,
    published_at: String,
    thumbnails: Thumbnails,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Thumbnails {
    high: Option<Thumbnail>,
    medium: Option<Thumbnail>,
    default: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

fn to_video(item: SearchItem) -> Option<VideoResult> {
    let video_id = item.id.video_id.filter(|id| !id.is_empty())?;
    let snippet = item.snippet.unwrap_or_default();
    let thumbnail_url = [
        snippet.thumbnails.high,
        snippet.thumbnails.medium,
        snippet.thumbnails.default,
    ]
    .into_iter()
    .flatten()
    .map(|t| t.url)
    .next()
    .unwrap_or_default();

    Some(VideoResult {
        url: format!("https://www.youtube.com/watch?v={video_id}"),
        video_id,
        title: snippet.title,
        description: snippet.description,
        channel_title: snippet.channel_title,
        thumbnail_url,
        published_at: snippet.published_at,
    })
}
