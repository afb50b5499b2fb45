//! In-memory cache implementation
//!
//! Thread-safe map of raw bytes keyed by string. Entries carry the expiry the
//! caller supplied, but the cache itself never evicts and never consults it:
//! deciding whether an entry is still fresh is the caller's job.

use std::{
    collections::HashMap,
    sync::atomic::{AtomicU64, Ordering},
};

use application::{
    error::ApplicationError,
    ports::{CachePort, CacheStats, Cached, CachedBytes},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::{debug, instrument};

/// In-memory cache with no eviction
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, CachedBytes>>,
    hits: AtomicU64,
    misses: AtomicU64,
    writes: AtomicU64,
}

impl std::fmt::Debug for MemoryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCache")
            .field("entries", &self.len())
            .field("hits", &self.hits.load(Ordering::Relaxed))
            .field("misses", &self.misses.load(Ordering::Relaxed))
            .field("writes", &self.writes.load(Ordering::Relaxed))
            .finish()
    }
}

impl MemoryCache {
    /// Create an empty cache
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether the cache holds no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Remove every entry; statistics are kept
    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

#[async_trait]
impl CachePort for MemoryCache {
    #[instrument(skip(self), level = "debug")]
    async fn get_bytes(&self, key: &str) -> Result<Option<CachedBytes>, ApplicationError> {
        let entry = self.entries.lock().get(key).cloned();

        if entry.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(key = %key, "Cache hit");
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            debug!(key = %key, "Cache miss");
        }

        Ok(entry)
    }

    #[instrument(skip(self, value), fields(bytes = value.len()), level = "debug")]
    async fn set_bytes(
        &self,
        key: &str,
        value: Vec<u8>,
        expiry: DateTime<Utc>,
    ) -> Result<(), ApplicationError> {
        self.entries
            .lock()
            .insert(key.to_string(), Cached { value, expiry });
        self.writes.fetch_add(1, Ordering::Relaxed);
        debug!(key = %key, "Cache set");
        Ok(())
    }

    fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            entries: u64::try_from(self.len()).unwrap_or(u64::MAX),
        }
    }
}
