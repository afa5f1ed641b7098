//! One-shot "crawl": run a web query and write the merged results to disk.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use lodestar_search::{Aggregator, QueryKind, SearchConfig, SearchContext, SearchResult};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ServiceError};

/// What a crawl writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlRecord {
    /// The query that was run.
    pub query: String,
    /// When the engines were queried.
    pub crawled_at: DateTime<Utc>,
    /// Number of results.
    pub total: usize,
    /// Merged results in engine-priority order.
    pub results: Vec<SearchResult>,
}

/// Run `query` against every configured engine and return the record.
///
/// # Errors
///
/// Returns [`ServiceError::BadRequest`] for a blank query.
pub async fn crawl(
    aggregator: &Aggregator,
    query: &str,
    config: SearchConfig,
) -> Result<CrawlRecord> {
    let query = query.trim();
    if query.is_empty() {
        return Err(ServiceError::BadRequest("query must not be empty".into()));
    }

    let crawled_at = Utc::now();
    let ctx = SearchContext::new(query, QueryKind::Web, Arc::new(config));
    let merged = aggregator.search_web(&ctx).await;

    Ok(CrawlRecord {
        query: ctx.query,
        crawled_at,
        total: merged.total,
        results: merged.items,
    })
}

/// Write `record` as pretty JSON, creating parent directories as needed.
///
/// # Errors
///
/// Returns an error if the directory or file cannot be written.
pub fn write_record(record: &CrawlRecord, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(record)
        .map_err(|e| ServiceError::Config(format!("failed to serialize crawl record: {e}")))?;
    std::fs::write(path, json)?;
    tracing::info!(path = %path.display(), total = record.total, "crawl written");
    Ok(())
}

/// [`crawl`] then [`write_record`].
///
/// # Errors
///
/// See [`crawl`] and [`write_record`].
pub async fn crawl_to_file(
    aggregator: &Aggregator,
    query: &str,
    config: SearchConfig,
    path: &Path,
) -> Result<CrawlRecord> {
    let record = crawl(aggregator, query, config).await?;
    write_record(&record, path)?;
    Ok(record)
}
