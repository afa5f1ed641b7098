//! Optional cross-engine deduplication by normalised URL.
//!
//! Applied only when [`DedupPolicy::Url`](crate::config::DedupPolicy) is
//! configured. The merged list is already in engine priority order, so
//! keeping the first occurrence keeps the highest-priority engine's copy.

use std::collections::HashSet;

use crate::types::SearchResult;

use super::url_normalize::normalize_url;

/// Drop every result whose normalised URL has already been seen.
///
/// Order of the survivors is unchanged.
pub fn dedup_by_url(results: Vec<SearchResult>) -> Vec<SearchResult> {
    let before = results.len();
    let mut seen = HashSet::with_capacity(before);

    let kept: Vec<SearchResult> = results
        .into_iter()
        .filter(|result| seen.insert(normalize_url(&result.url)))
        .collect();

    tracing::debug!(before, after = kept.len(), "deduplicated results by URL");
    kept
}
