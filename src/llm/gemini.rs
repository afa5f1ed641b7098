//! Gemini `generateContent` client.
//!
//! Sends `POST {base_url}/v1beta/models/{model}:generateContent` with the
//! API key in the `x-goog-api-key` header and returns the first
//! candidate's text.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::ServiceError;

use super::{Content, GenerateRequest, LlmClient};

/// Longest upstream error body echoed into an error message.
const MAX_ERROR_BODY: usize = 300;

/// Configuration for [`GeminiClient`].
#[derive(Clone)]
pub struct GeminiConfig {
    /// Gemini API key.
    pub api_key: String,
    /// Base URL for the API (defaults to `https://generativelanguage.googleapis.com`).
    pub base_url: String,
    /// Model identifier (e.g. `"gemini-2.0-flash"`).
    pub model: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl GeminiConfig {
    /// Create a config with the public endpoint and a 20 second timeout.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: "https://generativelanguage.googleapis.com".to_owned(),
            model: model.into(),
            timeout: Duration::from_secs(20),
        }
    }

    /// Set the base URL (useful for testing with mock servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// HTTP client for the Gemini API.
#[derive(Debug)]
pub struct GeminiClient {
    config: GeminiConfig,
    http: reqwest::Client,
}

impl GeminiClient {
    /// Build a client.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Config`] if the HTTP client cannot be built.
    pub fn new(config: GeminiConfig) -> Result<Self, ServiceError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ServiceError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { config, http })
    }

    /// The configured model identifier.
    pub fn model(&self) -> &str {
        &self.config.model
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn generate(&self, request: &GenerateRequest) -> Result<String, ServiceError> {
        tracing::debug!(
            model = %self.config.model,
            turns = request.contents.len(),
            "sending generateContent request"
        );

        let response = self
            .http
            .post(self.config.endpoint())
            .header("x-goog-api-key", &self.config.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| ServiceError::Llm(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let body: String = body.chars().take(MAX_ERROR_BODY).collect();
            return Err(ServiceError::Llm(format!("HTTP {status}: {body}")));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::Llm(format!("invalid response body: {e}")))?;

        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| content.text())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(ServiceError::Llm("response contained no text".into()));
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;
    use crate::llm::{ROLE_USER, Content};
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> GeminiClient {
        let config = GeminiConfig::new("test-gemini-key", "gemini-test")
            .with_base_url(server.uri())
            .with_timeout(Duration::from_secs(5));
        GeminiClient::new(config).unwrap()
    }

    fn request() -> GenerateRequest {
        GenerateRequest {
            contents: vec![Content::turn(ROLE_USER, "hello")],
            system_instruction: Some(Content::instruction("Be brief.")),
        }
    }

    #[tokio::test]
    async fn sends_key_header_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-test:generateContent"))
            .and(header("x-goog-api-key", "test-gemini-key"))
            .and(body_partial_json(json!({
                "contents": [{"role": "user", "parts": [{"text": "hello"}]}],
                "system_instruction": {"parts": [{"text": "Be brief."}]}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"role": "model", "parts": [{"text": "Hi "}, {"text": "there."}]}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let text = client(&server).generate(&request()).await.unwrap();
        assert_eq!(text, "Hi there.");
    }

    #[tokio::test]
    async fn error_status_is_llm_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
            .mount(&server)
            .await;

        let err = client(&server).generate(&request()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Llm(_)));
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("quota exceeded"));
    }

    #[tokio::test]
    async fn no_candidates_is_llm_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
            .mount(&server)
            .await;

        let err = client(&server).generate(&request()).await.unwrap_err();
        assert!(err.to_string().contains("no text"));
    }

    #[tokio::test]
    async fn malformed_body_is_llm_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = client(&server).generate(&request()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Llm(_)));
    }

    #[test]
    fn debug_hides_api_key() {
        let config = GeminiConfig::new("secret-key", "m");
        assert!(!format!("{config:?}").contains("secret-key"));
    }

    #[test]
    fn endpoint_tolerates_trailing_slash() {
        let config = GeminiConfig::new("k", "gemini-2.0-flash").with_base_url("http://localhost:1/");
        assert_eq!(
            config.endpoint(),
            "http://localhost:1/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }
}
