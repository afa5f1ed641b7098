//! Search configuration with sensible defaults.
//!
//! [`SearchConfig`] controls which engines are queried, per-engine
//! timeouts, the image scraper limits, caching and dedup behaviour.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::SearchError;
use crate::types::SearchEngine;

/// Upper bound on image results returned for one query.
pub const MAX_IMAGE_RESULTS: usize = 40;

/// How results from different engines that point at the same page are merged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DedupPolicy {
    /// Keep every result, preserving per-engine provenance.
    #[default]
    None,
    /// Keep only the first result (in engine priority order) per normalised URL.
    Url,
}

/// Configuration for the search layer.
///
/// Use [`Default::default()`] for sensible defaults, or deserialize from the
/// `[search]` table of the service config.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Which web engines to query. Queried concurrently, merged in priority order.
    pub engines: Vec<SearchEngine>,
    /// Default per-engine HTTP timeout in seconds.
    pub timeout_seconds: u64,
    /// Per-engine timeout overrides in seconds, keyed by lowercase engine name.
    pub engine_timeouts: BTreeMap<String, u64>,
    /// Timeout for rendering the image search page in the headless browser.
    pub image_timeout_seconds: u64,
    /// Maximum number of results kept from a single engine.
    pub max_results_per_engine: usize,
    /// Maximum number of image results (never more than [`MAX_IMAGE_RESULTS`]).
    pub max_images: usize,
    /// Cross-engine duplicate handling.
    pub dedup: DedupPolicy,
    /// Custom User-Agent string. If `None`, rotates through a built-in list
    /// of realistic browser User-Agents.
    pub user_agent: Option<String>,
    /// How long aggregated outcomes stay cached. Set to 0 to disable caching.
    pub cache_ttl_seconds: u64,
    /// Chrome/Chromium binary to launch. If `None`, the browser is located
    /// on `PATH`.
    pub browser_executable: Option<PathBuf>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            engines: SearchEngine::all().to_vec(),
            timeout_seconds: 10,
            engine_timeouts: BTreeMap::new(),
            image_timeout_seconds: 15,
            max_results_per_engine: 30,
            max_images: MAX_IMAGE_RESULTS,
            dedup: DedupPolicy::None,
            user_agent: None,
            cache_ttl_seconds: 300,
            browser_executable: None,
        }
    }
}

impl SearchConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `engines` must not be empty
    /// - every timeout must be greater than 0
    /// - `engine_timeouts` keys must name a known engine
    /// - `max_results_per_engine` and `max_images` must be greater than 0
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.engines.is_empty() {
            return Err(SearchError::Config(
                "at least one engine must be enabled".into(),
            ));
        }
        if self.timeout_seconds == 0 {
            return Err(SearchError::Config(
                "timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.image_timeout_seconds == 0 {
            return Err(SearchError::Config(
                "image_timeout_seconds must be greater than 0".into(),
            ));
        }
        for (name, secs) in &self.engine_timeouts {
            if engine_by_key(name).is_none() {
                return Err(SearchError::Config(format!(
                    "engine_timeouts: unknown engine '{name}'"
                )));
            }
            if *secs == 0 {
                return Err(SearchError::Config(format!(
                    "engine_timeouts.{name} must be greater than 0"
                )));
            }
        }
        if self.max_results_per_engine == 0 {
            return Err(SearchError::Config(
                "max_results_per_engine must be greater than 0".into(),
            ));
        }
        if self.max_images == 0 {
            return Err(SearchError::Config(
                "max_images must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// Timeout for a single engine, honouring any override.
    pub fn timeout_for(&self, engine: SearchEngine) -> Duration {
        let secs = self
            .engine_timeouts
            .iter()
            .find(|(key, _)| engine_by_key(key) == Some(engine))
            .map(|(_, secs)| *secs)
            .unwrap_or(self.timeout_seconds);
        Duration::from_secs(secs)
    }

    /// Timeout for the headless image render.
    pub fn image_timeout(&self) -> Duration {
        Duration::from_secs(self.image_timeout_seconds)
    }

    /// Image cap after clamping to [`MAX_IMAGE_RESULTS`].
    pub fn image_limit(&self) -> usize {
        self.max_images.min(MAX_IMAGE_RESULTS)
    }
}

fn engine_by_key(key: &str) -> Option<SearchEngine> {
    SearchEngine::all()
        .iter()
        .copied()
        .find(|engine| engine.name().eq_ignore_ascii_case(key))
}
