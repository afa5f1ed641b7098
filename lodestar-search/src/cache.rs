//! In-memory TTL cache for per-query outcomes.
//!
//! Keyed by (trimmed query, query kind, engine set) so that paging
//! through one query's results does not re-scrape every engine. The cache
//! is an ordinary value owned by whoever builds it; there is no global.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::Duration;

use moka::future::Cache;

use crate::types::{QueryKind, SearchEngine};

/// Default maximum number of cached outcomes.
pub const DEFAULT_CAPACITY: u64 = 256;

/// Composite cache key: trimmed query + kind + engine set hash.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    query: String,
    kind: QueryKind,
    engine_hash: u64,
}

impl CacheKey {
    /// Build a deterministic key.
    ///
    /// The query is trimmed but keeps its case, since cached outcomes can
    /// embed the literal query. The engine list is hashed order-independently.
    pub fn new(query: &str, kind: QueryKind, engines: &[SearchEngine]) -> Self {
        Self {
            query: query.trim().to_string(),
            kind,
            engine_hash: hash_engines(engines),
        }
    }
}

/// TTL-bounded cache of query outcomes of type `V`.
///
/// A TTL of zero disables caching: lookups always miss and inserts are
/// dropped.
#[derive(Clone)]
pub struct ResultCache<V> {
    inner: Option<Cache<CacheKey, V>>,
}

impl<V> ResultCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Create a cache whose entries expire after `ttl`.
    pub fn new(ttl: Duration, capacity: u64) -> Self {
        let inner = (!ttl.is_zero()).then(|| {
            Cache::builder()
                .max_capacity(capacity)
                .time_to_live(ttl)
                .build()
        });
        Self { inner }
    }

    /// Create a cache from a TTL in seconds with [`DEFAULT_CAPACITY`].
    pub fn from_ttl_seconds(ttl_seconds: u64) -> Self {
        Self::new(Duration::from_secs(ttl_seconds), DEFAULT_CAPACITY)
    }

    /// Whether entries are retained at all.
    pub fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }

    /// Look up a cached outcome.
    pub async fn get(&self, key: &CacheKey) -> Option<V> {
        let cache = self.inner.as_ref()?;
        let hit = cache.get(key).await;
        tracing::trace!(hit = hit.is_some(), "result cache lookup");
        hit
    }

    /// Store an outcome, replacing any previous entry for `key`.
    pub async fn insert(&self, key: CacheKey, value: V) {
        if let Some(cache) = &self.inner {
            cache.insert(key, value).await;
        }
    }
}

/// Order-independent hash of an engine set.
fn hash_engines(engines: &[SearchEngine]) -> u64 {
    let mut sorted = engines.to_vec();
    sorted.sort();
    sorted.dedup();
    let mut hasher = DefaultHasher::new();
    sorted.hash(&mut hasher);
    hasher.finish()
}
