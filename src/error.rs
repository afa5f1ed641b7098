//! Error types for the lodestar service.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use lodestar_search::SearchError;
use serde::{Deserialize, Serialize};

/// Top-level error type for the metasearch service.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The client sent a malformed request.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Search layer failure that could not be recovered locally.
    #[error("search error: {0}")]
    Search(#[from] SearchError),

    /// Language model request or response error.
    #[error("LLM error: {0}")]
    Llm(String),

    /// A third-party API (other than the LLM) failed.
    #[error("upstream error: {0}")]
    Upstream(String),

    /// A collaborator needed for this request is not configured.
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, ServiceError>;

/// JSON error body returned by every endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// The error details.
    pub error: ErrorBody,
}

/// Error details within an [`ErrorResponse`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable error message.
    pub message: String,
    /// Error type (e.g. `"invalid_request_error"`, `"server_error"`).
    #[serde(rename = "type")]
    pub error_type: String,
}

impl ServiceError {
    /// HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Llm(_) | Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Search(_) | Self::Config(_) | Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_type(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "invalid_request_error",
            Self::Llm(_) | Self::Upstream(_) => "upstream_error",
            Self::Unavailable(_) => "unavailable_error",
            Self::Search(_) | Self::Config(_) | Self::Io(_) => "server_error",
        }
    }

    /// The structured body for this error.
    pub fn to_body(&self) -> ErrorResponse {
        ErrorResponse {
            error: ErrorBody {
                message: self.to_string(),
                error_type: self.error_type().to_owned(),
            },
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }
        (status, Json(self.to_body())).into_response()
    }
}
