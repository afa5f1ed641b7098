//! Service configuration.
//!
//! Loaded from TOML. Every section has defaults, so an empty file (or no
//! file) yields a working local setup. API keys are never stored here;
//! they are read from the environment by [`Secrets::from_env`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use lodestar_search::SearchConfig;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ServiceError};

/// Environment variable holding the Gemini API key.
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";
/// Environment variable holding the YouTube Data API key.
pub const YOUTUBE_API_KEY_ENV: &str = "YOUTUBE_API_KEY";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// HTTP listener and CORS settings.
    pub server: ServerConfig,
    /// Engines, timeouts, dedup and caching.
    pub search: SearchConfig,
    /// LLM summary, ranking and tool detection.
    pub ranking: RankingConfig,
    /// Page sizes.
    pub pagination: PaginationConfig,
    /// Video search collaborator.
    pub video: VideoConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind.
    pub host: String,
    /// Port to bind. Use `0` for an OS-assigned port.
    pub port: u16,
    /// Origins that receive `Access-Control-Allow-Origin`.
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 8080,
            allowed_origins: vec![
                "http://localhost:3000".to_owned(),
                "http://127.0.0.1:3000".to_owned(),
            ],
        }
    }
}

/// LLM post-processing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    /// Whether web results are sent to the LLM at all.
    pub enabled: bool,
    /// Base URL of the Gemini API.
    pub base_url: String,
    /// Model identifier.
    pub model: String,
    /// How many leading results are given to the ranker.
    pub top_n: usize,
    /// Timeout for one LLM request in seconds.
    pub timeout_seconds: u64,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://generativelanguage.googleapis.com".to_owned(),
            model: "gemini-2.0-flash".to_owned(),
            top_n: 5,
            timeout_seconds: 20,
        }
    }
}

impl RankingConfig {
    /// Request timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Page size settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    /// Page size used when the client does not ask for one.
    pub page_size: usize,
    /// Largest page size a client may request.
    pub max_page_size: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_size: 50,
            max_page_size: 100,
        }
    }
}

/// Video search settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    /// Base URL of the YouTube Data API.
    pub base_url: String,
    /// Maximum videos returned per query.
    pub max_results: u32,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.googleapis.com".to_owned(),
            max_results: 12,
        }
    }
}

/// API keys read from the environment.
#[derive(Clone, Default)]
pub struct Secrets {
    /// Gemini key; ranking is skipped without it.
    pub gemini_api_key: Option<String>,
    /// YouTube key; `/api/videos` answers 503 without it.
    pub youtube_api_key: Option<String>,
}

impl Secrets {
    /// Read keys from [`GEMINI_API_KEY_ENV`] and [`YOUTUBE_API_KEY_ENV`].
    ///
    /// Empty values are treated as absent.
    pub fn from_env() -> Self {
        Self {
            gemini_api_key: non_empty_env(GEMINI_API_KEY_ENV),
            youtube_api_key: non_empty_env(YOUTUBE_API_KEY_ENV),
        }
    }
}

// Keys stay out of debug output.
impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("gemini_api_key", &self.gemini_api_key.as_ref().map(|_| "***"))
            .field("youtube_api_key", &self.youtube_api_key.as_ref().map(|_| "***"))
            .finish()
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

impl ServiceConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| ServiceError::Config(e.to_string()))
    }

    /// Load `path` if it exists, otherwise fall back to defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            tracing::info!(path = %path.display(), "loading config");
            Self::from_file(path)
        } else {
            tracing::info!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| ServiceError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path: `<config dir>/lodestar/config.toml`.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("lodestar")
            .join("config.toml")
    }

    /// Reject settings the service cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Config`] describing the first invalid field.
    pub fn validate(&self) -> Result<()> {
        self.search
            .validate()
            .map_err(|e| ServiceError::Config(e.to_string()))?;
        if self.pagination.page_size == 0 {
            return Err(ServiceError::Config(
                "pagination.page_size must be greater than 0".into(),
            ));
        }
        if self.pagination.max_page_size < self.pagination.page_size {
            return Err(ServiceError::Config(
                "pagination.max_page_size must be at least page_size".into(),
            ));
        }
        if self.ranking.top_n == 0 {
            return Err(ServiceError::Config(
                "ranking.top_n must be greater than 0".into(),
            ));
        }
        if self.ranking.timeout_seconds == 0 {
            return Err(ServiceError::Config(
                "ranking.timeout_seconds must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;
    use lodestar_search::{DedupPolicy, SearchEngine};

    #[test]
    fn default_config_is_valid() {
        let config = ServiceConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.pagination.page_size, 50);
        assert_eq!(config.ranking.top_n, 5);
        assert_eq!(config.search.timeout_seconds, 10);
    }

    #[test]
    fn empty_toml_uses_defaults() {
        let config: ServiceConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.search.engines, SearchEngine::all());
    }

    #[test]
    fn partial_toml_overrides_only_named_fields() {
        let toml_str = r#"
            [server]
            port = 9000
            allowed_origins = ["https://lodestar.example"]

            [search]
            engines = ["duckduckgo", "brave"]
            dedup = "url"

            [search.engine_timeouts]
            brave = 4

            [ranking]
            enabled = false
        "#;
        let config: ServiceConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.allowed_origins, ["https://lodestar.example"]);
        assert_eq!(
            config.search.engines,
            [SearchEngine::DuckDuckGo, SearchEngine::Brave]
        );
        assert_eq!(config.search.dedup, DedupPolicy::Url);
        assert_eq!(
            config.search.timeout_for(SearchEngine::Brave),
            Duration::from_secs(4)
        );
        assert!(!config.ranking.enabled);
        assert_eq!(config.ranking.top_n, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_page_size_rejected() {
        let mut config = ServiceConfig::default();
        config.pagination.page_size = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("page_size"));
    }

    #[test]
    fn zero_top_n_rejected() {
        let mut config = ServiceConfig::default();
        config.ranking.top_n = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn invalid_search_section_rejected() {
        let mut config = ServiceConfig::default();
        config.search.engines.clear();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ServiceError::Config(_)));
    }

    #[test]
    fn from_file_nonexistent_returns_error() {
        let result = ServiceConfig::from_file(Path::new("/nonexistent/path/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn from_file_invalid_toml_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "this is not valid toml {{{").unwrap();
        let err = ServiceConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, ServiceError::Config(_)));
    }

    #[test]
    fn load_or_default_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServiceConfig::load_or_default(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = ServiceConfig::default();
        config.server.port = 7777;
        config.search.dedup = DedupPolicy::Url;
        config.save_to_file(&path).unwrap();

        let loaded = ServiceConfig::from_file(&path).unwrap();
        assert_eq!(loaded.server.port, 7777);
        assert_eq!(loaded.search.dedup, DedupPolicy::Url);
    }

    #[test]
    fn default_config_path_ends_with_config_toml() {
        let path = ServiceConfig::default_config_path();
        let path_str = path.to_string_lossy();
        assert!(path_str.ends_with("config.toml"));
        assert!(path_str.contains("lodestar"));
    }

    #[test]
    fn secrets_debug_hides_keys() {
        let secrets = Secrets {
            gemini_api_key: Some("super-secret".into()),
            youtube_api_key: None,
        };
        let debug = format!("{secrets:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("***"));
    }
}
