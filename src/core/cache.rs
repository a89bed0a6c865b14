//! In-memory response cache keyed by request fingerprint.

use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

#[derive(Debug)]
struct CacheEntry {
    body: String,
    expires_at: Instant,
}

/// Mapping from request fingerprint to a cached response body with expiry.
///
/// Entries expire lazily: a stale entry discovered on read is removed on the
/// spot. There is no background sweep and no eviction beyond TTL; the entry
/// count is bounded by the distinct endpoint/param combinations issued.
#[derive(Debug)]
pub(crate) struct CacheStore {
    map: RwLock<HashMap<String, CacheEntry>>,
    default_ttl: Duration,
}

impl CacheStore {
    pub(crate) fn new(default_ttl: Duration) -> Self {
        Self {
            map: RwLock::new(HashMap::new()),
            default_ttl,
        }
    }

    /// Return the body of a fresh entry, or `None`. An expired entry found
    /// here is discarded.
    pub(crate) async fn get(&self, fingerprint: &str) -> Option<String> {
        {
            let guard = self.map.read().await;
            match guard.get(fingerprint) {
                Some(entry) if Instant::now() <= entry.expires_at => {
                    return Some(entry.body.clone());
                }
                Some(_) => {}
                None => return None,
            }
        }
        // Entry was stale under the read lock; re-check under the write lock
        // in case a writer replaced it in between.
        let mut guard = self.map.write().await;
        if let Some(entry) = guard.get(fingerprint)
            && Instant::now() > entry.expires_at
        {
            guard.remove(fingerprint);
        }
        None
    }

    /// Insert or overwrite unconditionally (last-writer-wins).
    pub(crate) async fn put(&self, fingerprint: &str, body: &str, ttl_override: Option<Duration>) {
        let ttl = ttl_override.unwrap_or(self.default_ttl);
        let entry = CacheEntry {
            body: body.to_string(),
            expires_at: Instant::now() + ttl,
        };
        let mut guard = self.map.write().await;
        guard.insert(fingerprint.to_string(), entry);
    }

    pub(crate) async fn clear(&self) {
        self.map.write().await.clear();
    }
}
