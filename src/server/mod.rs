//! HTTP surface for the metasearch service.
//!
//! ## Endpoints
//!
//! - `GET /health` - liveness probe
//! - `GET /api/metasearch?q=&type=&page=&pageSize=` - paged, ranked results
//! - `POST /api/generate` - pass-through to the language model
//! - `GET /api/videos?q=` - YouTube video search
//!
//! Cross-origin access is limited to `server.allowed_origins`. Requests
//! from other origins are still served, just without the
//! `Access-Control-Allow-Origin` header.

pub mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderValue, Method, Request, header};
use axum::routing::{get, post};
use lodestar_search::Aggregator;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

use crate::config::{PaginationConfig, Secrets, ServerConfig, ServiceConfig};
use crate::error::{Result, ServiceError};
use crate::llm::{GeminiClient, GeminiConfig, LlmClient};
use crate::pipeline::Pipeline;
use crate::ranking::PostProcessor;
use crate::video::YouTubeClient;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// The metasearch pipeline.
    pub pipeline: Arc<Pipeline>,
    /// Language model for `/api/generate`; `None` without an API key.
    pub llm: Option<Arc<dyn LlmClient>>,
    /// Video search; `None` without an API key.
    pub video: Option<Arc<YouTubeClient>>,
    /// Page size defaults and limits.
    pub pagination: PaginationConfig,
}

impl AppState {
    /// Wire up the production collaborators from configuration and secrets.
    ///
    /// Ranking is skipped when disabled or when no Gemini key is present;
    /// video search is skipped when no YouTube key is present.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or a client cannot
    /// be built.
    pub fn from_config(config: &ServiceConfig, secrets: &Secrets) -> Result<Self> {
        config.validate()?;

        let llm: Option<Arc<dyn LlmClient>> = match &secrets.gemini_api_key {
            Some(key) => {
                let gemini = GeminiConfig::new(key.clone(), config.ranking.model.clone())
                    .with_base_url(config.ranking.base_url.clone())
                    .with_timeout(config.ranking.timeout());
                Some(Arc::new(GeminiClient::new(gemini)?))
            }
            None => {
                tracing::warn!("GEMINI_API_KEY not set; ranking and /api/generate disabled");
                None
            }
        };

        let ranker = llm.clone().filter(|_| config.ranking.enabled);
        let post = PostProcessor::new(ranker, config.ranking.top_n, config.ranking.timeout());

        let aggregator = Arc::new(Aggregator::new(&config.search)?);
        let pipeline = Pipeline::new(aggregator, post, config.search.clone());

        let video = match &secrets.youtube_api_key {
            Some(key) => Some(Arc::new(YouTubeClient::new(key.clone(), &config.video)?)),
            None => {
                tracing::warn!("YOUTUBE_API_KEY not set; /api/videos disabled");
                None
            }
        };

        Ok(Self {
            pipeline: Arc::new(pipeline),
            llm,
            video,
            pagination: config.pagination.clone(),
        })
    }
}

/// Build the router with CORS and request tracing.
pub fn build_router(state: AppState, allowed_origins: &[String]) -> Router {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/metasearch", get(handlers::metasearch))
        .route("/api/generate", post(handlers::generate))
        .route("/api/videos", get(handlers::videos))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    id = %Uuid::new_v4(),
                    method = %request.method(),
                    path = %request.uri().path(),
                )
            }),
        )
        .with_state(state)
}

/// The running HTTP server.
pub struct Server {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl Server {
    /// Start serving in a background task.
    ///
    /// Binds to `{config.host}:{config.port}` (use port `0` for auto-assign).
    ///
    /// # Errors
    ///
    /// Returns an error if the TCP listener cannot bind.
    pub async fn start(state: AppState, config: &ServerConfig) -> Result<Self> {
        let app = build_router(state, &config.allowed_origins);

        let bind_addr = format!("{}:{}", config.host, config.port);
        let listener = TcpListener::bind(&bind_addr)
            .await
            .map_err(|e| ServiceError::Config(format!("server bind to {bind_addr} failed: {e}")))?;
        let addr = listener.local_addr()?;

        info!("metasearch server listening on http://{addr}");

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("server error: {e}");
            }
        });

        Ok(Self { addr, handle })
    }

    /// Returns the address the server is listening on.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Returns the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Abort the server task.
    pub fn shutdown(&self) {
        self.handle.abort();
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
