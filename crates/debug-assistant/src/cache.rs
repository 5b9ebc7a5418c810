/// Redis caching layer for the debug-assistant.
///
/// All operations return `Option<T>` for graceful degradation. If Redis is
/// unavailable, callers fall through to compute from source; caching never
/// changes what a query returns, only how fast it returns.
///
/// Key schema (namespaced to avoid collisions):
/// - `hda:v1:search:{sha256(query|k)}` — JSON-serialized Vec<RetrievedDocument> (TTL: 3600s)
/// - `hda:v1:corpus_fingerprint` — SHA-256 hex of the knowledge-base file (no TTL)
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::model::RetrievedDocument;
use assistant_common::redis::RedisCache;

const KEY_PREFIX: &str = "hda:v1:";
const SEARCH_TTL_SECS: u64 = 3600;

pub struct SearchCache {
    redis: RedisCache,
}

impl SearchCache {
    pub fn new(redis: RedisCache) -> Self {
        Self { redis }
    }

    // --- Search results ---

    pub async fn get_search_results(
        &self,
        query: &str,
        limit: usize,
    ) -> Option<Vec<RetrievedDocument>> {
        let key = search_key(query, limit);
        let json = self.redis.get(&key).await?;
        serde_json::from_str(&json)
            .inspect_err(|e| warn!(error = %e, key, "cache deserialization failed"))
            .ok()
    }

    pub async fn set_search_results(
        &self,
        query: &str,
        limit: usize,
        results: &[RetrievedDocument],
    ) {
        let key = search_key(query, limit);
        if let Ok(json) = serde_json::to_string(results) {
            self.redis.set_with_ttl(&key, &json, SEARCH_TTL_SECS).await;
        }
    }

    // --- Corpus fingerprint ---

    pub async fn get_corpus_fingerprint(&self) -> Option<String> {
        let key = format!("{KEY_PREFIX}corpus_fingerprint");
        self.redis.get(&key).await
    }

    pub async fn set_corpus_fingerprint(&self, fingerprint: &str) {
        let key = format!("{KEY_PREFIX}corpus_fingerprint");
        self.redis.set(&key, fingerprint).await;
    }

    // --- Invalidation ---

    /// Delete all cached data. Used when the index is rebuilt.
    /// Uses SCAN-based prefix deletion (not KEYS).
    pub async fn invalidate_all(&self) {
        self.redis.delete_by_prefix(KEY_PREFIX).await;
    }
}

/// Compute a deterministic cache key for a search query using SHA-256.
fn search_key(query: &str, limit: usize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(query.as_bytes());
    hasher.update(b"|");
    hasher.update(limit.to_string().as_bytes());
    let hash = hasher.finalize();
    format!("{KEY_PREFIX}search:{:x}", hash)
}
