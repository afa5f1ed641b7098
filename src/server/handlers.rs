//! Route handlers.

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use lodestar_search::QueryKind;
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::error::{Result, ServiceError};
use crate::llm::GenerateRequest;
use crate::pipeline::{MetasearchRequest, MetasearchResponse};
use crate::video::VideoResult;

/// Query string of `GET /api/metasearch`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetasearchParams {
    /// Query text.
    #[serde(default)]
    pub q: Option<String>,
    /// `web` (default) or `image`.
    #[serde(default, rename = "type")]
    pub kind: QueryKind,
    /// 1-based page; defaults to 1.
    #[serde(default)]
    pub page: Option<usize>,
    /// Items per page; defaults to the configured page size.
    #[serde(default)]
    pub page_size: Option<usize>,
}

/// Query string of `GET /api/videos`.
#[derive(Debug, Deserialize)]
pub struct VideoParams {
    /// Query text.
    #[serde(default)]
    pub q: Option<String>,
}

/// Body of a `/health` response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"ok"`.
    pub status: String,
}

/// Body of a `/api/generate` response.
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// Model reply.
    pub text: String,
}

/// Body of a `/api/videos` response.
#[derive(Debug, Serialize, Deserialize)]
pub struct VideoResponse {
    /// Matching videos.
    pub items: Vec<VideoResult>,
}

/// `GET /health`
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_owned(),
    })
}

/// `GET /api/metasearch`
pub async fn metasearch(
    State(state): State<AppState>,
    params: std::result::Result<Query<MetasearchParams>, QueryRejection>,
) -> Result<Json<MetasearchResponse>> {
    let Query(params) = params.map_err(|e| ServiceError::BadRequest(e.body_text()))?;

    let query = params
        .q
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| ServiceError::BadRequest("missing query parameter `q`".into()))?;

    let page_size = params
        .page_size
        .unwrap_or(state.pagination.page_size)
        .clamp(1, state.pagination.max_page_size);
    let request = MetasearchRequest::new(query, params.kind, params.page.unwrap_or(1), page_size)?;

    tracing::info!(kind = %request.kind, page = request.page, page_size, "metasearch request");
    let response = state.pipeline.run(&request).await?;
    Ok(Json(response))
}

/// `POST /api/generate`
pub async fn generate(
    State(state): State<AppState>,
    body: std::result::Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>> {
    let Json(request) = body.map_err(|e| ServiceError::BadRequest(e.body_text()))?;
    if request.contents.is_empty() {
        return Err(ServiceError::BadRequest("`contents` must not be empty".into()));
    }

    let llm = state
        .llm
        .as_ref()
        .ok_or_else(|| ServiceError::Unavailable("language model is not configured".into()))?;

    let text = llm.generate(&request).await?;
    Ok(Json(GenerateResponse { text }))
}

/// `GET /api/videos`
pub async fn videos(
    State(state): State<AppState>,
    params: std::result::Result<Query<VideoParams>, QueryRejection>,
) -> Result<Json<VideoResponse>> {
    let Query(params) = params.map_err(|e| ServiceError::BadRequest(e.body_text()))?;
    let query = params
        .q
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| ServiceError::BadRequest("missing query parameter `q`".into()))?;

    let video = state
        .video
        .as_ref()
        .ok_or_else(|| ServiceError::Unavailable("video search is not configured".into()))?;

    let items = video.search(&query).await?;
    Ok(Json(VideoResponse { items }))
}
