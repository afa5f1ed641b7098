//! End-to-end tests for the HTTP surface.
//!
//! The server is bound to an OS-assigned port with stand-in engines and a
//! scripted language model, then driven over real HTTP with `reqwest`.
//! The video collaborator is a `wiremock` server.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lodestar::config::{PaginationConfig, ServerConfig, VideoConfig};
use lodestar::error::ErrorResponse;
use lodestar::llm::{GenerateRequest, LlmClient};
use lodestar::ranking::PostProcessor;
use lodestar::video::YouTubeClient;
use lodestar::{AppState, Pipeline, Server, ServiceError};
use lodestar_search::{
    Aggregator, SearchConfig, SearchEngine, SearchEngineTrait, SearchError, SearchResult,
};
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ALLOWED_ORIGIN: &str = "http://localhost:3000";

// ---------------------------------------------------------------------------
// Stand-ins
// ---------------------------------------------------------------------------

struct ListEngine {
    engine: SearchEngine,
    count: usize,
}

#[async_trait]
impl SearchEngineTrait for ListEngine {
    async fn search(
        &self,
        query: &str,
        _config: &SearchConfig,
    ) -> Result<Vec<SearchResult>, SearchError> {
        Ok((0..self.count)
            .map(|i| SearchResult {
                title: format!("{query} {} #{i}", self.engine),
                url: format!("https://{}.example.com/{i}", self.engine.name().to_lowercase()),
                snippet: format!("snippet {i}"),
                source: self.engine,
            })
            .collect())
    }

    fn engine_type(&self) -> SearchEngine {
        self.engine
    }
}

struct EchoLlm;

#[async_trait]
impl LlmClient for EchoLlm {
    async fn generate(&self, request: &GenerateRequest) -> Result<String, ServiceError> {
        let last = request
            .contents
            .last()
            .map(|c| c.text())
            .unwrap_or_default();
        if last == "convert 5 miles to km" {
            return Ok("About 8 km. @@TOOL:[unit_converter]@@@@RANKING:[1, 0]@@".to_owned());
        }
        Ok(format!("echo: {last}"))
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

fn state(per_engine: usize, llm: bool, video: Option<YouTubeClient>) -> AppState {
    let adapters: Vec<Arc<dyn SearchEngineTrait>> = SearchEngine::all()
        .iter()
        .map(|engine| {
            Arc::new(ListEngine {
                engine: *engine,
                count: per_engine,
            }) as Arc<dyn SearchEngineTrait>
        })
        .collect();
    let aggregator = Arc::new(Aggregator::with_adapters(adapters, None));

    let llm: Option<Arc<dyn LlmClient>> = llm.then(|| Arc::new(EchoLlm) as Arc<dyn LlmClient>);
    let post = PostProcessor::new(llm.clone(), 5, Duration::from_secs(5));

    AppState {
        pipeline: Arc::new(Pipeline::new(aggregator, post, SearchConfig::default())),
        llm,
        video: video.map(Arc::new),
        pagination: PaginationConfig::default(),
    }
}

async fn start(state: AppState) -> (Server, String) {
    let config = ServerConfig {
        port: 0,
        ..Default::default()
    };
    let server = Server::start(state, &config).await.unwrap();
    let base = format!("http://{}", server.addr());
    (server, base)
}

async fn get_json(url: &str) -> (reqwest::StatusCode, Value) {
    let response = reqwest::get(url).await.unwrap();
    let status = response.status();
    (status, response.json().await.unwrap())
}

// ---------------------------------------------------------------------------
// /health
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_reports_ok() {
    let (_server, base) = start(state(0, false, None)).await;
    let (status, body) = get_json(&format!("{base}/health")).await;
    assert_eq!(status, 200);
    assert_eq!(body, json!({ "status": "ok" }));
}

// ---------------------------------------------------------------------------
// /api/metasearch
// ---------------------------------------------------------------------------

#[tokio::test]
async fn metasearch_pages_merged_results() {
    let (_server, base) = start(state(32, false, None)).await;

    let (status, body) = get_json(&format!("{base}/api/metasearch?q=rust&page=3")).await;
    assert_eq!(status, 200);
    assert_eq!(body["total"], 128);
    assert_eq!(body["page"], 3);
    assert_eq!(body["totalPages"], 3);
    assert_eq!(body["hasPrevious"], true);
    assert_eq!(body["hasNext"], false);
    assert_eq!(body["items"].as_array().unwrap().len(), 28);
    assert!(body.get("summary").is_none());
    assert!(body.get("tool").is_none());
}

#[tokio::test]
async fn metasearch_applies_ranking_and_tool() {
    let (_server, base) = start(state(3, true, None)).await;

    let url = format!("{base}/api/metasearch?q=convert%205%20miles%20to%20km&pageSize=5");
    let (status, body) = get_json(&url).await;
    assert_eq!(status, 200);
    assert_eq!(body["summary"], "About 8 km.");
    assert_eq!(body["tool"]["name"], "unit_converter");
    assert!(
        body["tool"]["url"]
            .as_str()
            .unwrap()
            .ends_with("?q=convert%205%20miles%20to%20km")
    );
    assert_eq!(body["items"][0]["url"], "https://bing.example.com/1");
    assert_eq!(body["items"][1]["url"], "https://bing.example.com/0");
    assert_eq!(body["totalPages"], 3);
}

#[tokio::test]
async fn metasearch_without_query_is_structured_400() {
    let (_server, base) = start(state(1, false, None)).await;

    for url in [
        format!("{base}/api/metasearch"),
        format!("{base}/api/metasearch?q=%20%20"),
    ] {
        let response = reqwest::get(&url).await.unwrap();
        assert_eq!(response.status(), 400);
        let body: ErrorResponse = response.json().await.unwrap();
        assert_eq!(body.error.error_type, "invalid_request_error");
        assert!(!body.error.message.is_empty());
    }
}

#[tokio::test]
async fn metasearch_rejects_unknown_type() {
    let (_server, base) = start(state(1, false, None)).await;
    let response = reqwest::get(format!("{base}/api/metasearch?q=fox&type=videos"))
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn image_query_without_image_adapter_is_500() {
    let (_server, base) = start(state(1, false, None)).await;
    let response = reqwest::get(format!("{base}/api/metasearch?q=fox&type=image"))
        .await
        .unwrap();
    assert_eq!(response.status(), 500);
    let body: ErrorResponse = response.json().await.unwrap();
    assert_eq!(body.error.error_type, "server_error");
}

// ---------------------------------------------------------------------------
// CORS
// ---------------------------------------------------------------------------

#[tokio::test]
async fn allowed_origin_receives_cors_header() {
    let (_server, base) = start(state(1, false, None)).await;
    let response = reqwest::Client::new()
        .get(format!("{base}/api/metasearch?q=rust"))
        .header("Origin", ALLOWED_ORIGIN)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        ALLOWED_ORIGIN
    );
}

#[tokio::test]
async fn other_origin_is_served_without_cors_header() {
    let (_server, base) = start(state(1, false, None)).await;
    let response = reqwest::Client::new()
        .get(format!("{base}/api/metasearch?q=rust"))
        .header("Origin", "https://evil.example")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert!(response.headers().get("access-control-allow-origin").is_none());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["total"], 4);
}

// ---------------------------------------------------------------------------
// /api/generate
// ---------------------------------------------------------------------------

#[tokio::test]
async fn generate_proxies_to_llm() {
    let (_server, base) = start(state(0, true, None)).await;
    let response = reqwest::Client::new()
        .post(format!("{base}/api/generate"))
        .json(&json!({
            "contents": [{ "role": "user", "parts": [{ "text": "hello" }] }],
            "system_instruction": { "parts": [{ "text": "be brief" }] }
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["text"], "echo: hello");
}

#[tokio::test]
async fn generate_rejects_malformed_json() {
    let (_server, base) = start(state(0, true, None)).await;
    let response = reqwest::Client::new()
        .post(format!("{base}/api/generate"))
        .header("Content-Type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let body: ErrorResponse = response.json().await.unwrap();
    assert_eq!(body.error.error_type, "invalid_request_error");
}

#[tokio::test]
async fn generate_without_llm_is_503() {
    let (_server, base) = start(state(0, false, None)).await;
    let response = reqwest::Client::new()
        .post(format!("{base}/api/generate"))
        .json(&json!({ "contents": [{ "role": "user", "parts": [{ "text": "hi" }] }] }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 503);
}

// ---------------------------------------------------------------------------
// /api/videos
// ---------------------------------------------------------------------------

#[tokio::test]
async fn videos_without_key_is_503() {
    let (_server, base) = start(state(0, false, None)).await;
    let (status, body) = get_json(&format!("{base}/api/videos?q=rust")).await;
    assert_eq!(status, 503);
    assert_eq!(body["error"]["type"], "unavailable_error");
}

#[tokio::test]
async fn videos_come_from_youtube_api() {
    let youtube = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/youtube/v3/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{
                "id": { "videoId": "v1" },
                "snippet": { "title": "Rust in 100 seconds", "channelTitle": "Fireship" }
            }]
        })))
        .mount(&youtube)
        .await;
    let client = YouTubeClient::new(
        "key",
        &VideoConfig {
            base_url: youtube.uri(),
            max_results: 5,
        },
    )
    .unwrap();

    let (_server, base) = start(state(0, false, Some(client))).await;
    let (status, body) = get_json(&format!("{base}/api/videos?q=rust")).await;
    assert_eq!(status, 200);
    assert_eq!(body["items"][0]["videoId"], "v1");
    assert_eq!(body["items"][0]["url"], "https://www.youtube.com/watch?v=v1");
}

#[tokio::test]
async fn video_api_failure_is_502() {
    let youtube = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&youtube)
        .await;
    let client = YouTubeClient::new(
        "key",
        &VideoConfig {
            base_url: youtube.uri(),
            max_results: 5,
        },
    )
    .unwrap();

    let (_server, base) = start(state(0, false, Some(client))).await;
    let (status, body) = get_json(&format!("{base}/api/videos?q=rust")).await;
    assert_eq!(status, 502);
    assert_eq!(body["error"]["type"], "upstream_error");
}
