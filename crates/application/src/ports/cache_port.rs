//! Cache port definition
//!
//! Defines the key/value contract the coordinator consumes. Entries carry
//! their own expiry, but stores are not expected to act on it: values persist
//! until overwritten and expiry is enforced by the caller's clock.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::ApplicationError;

/// A cached value together with the expiry it was stored with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cached<T> {
    /// The stored value
    pub value: T,
    /// The expiry supplied when the value was stored
    pub expiry: DateTime<Utc>,
}

/// Raw cached bytes as returned by [`CachePort::get_bytes`]
pub type CachedBytes = Cached<Vec<u8>>;

/// Cache port for storing and retrieving values with an expiry
///
/// Implementations must be safe for concurrent use. No atomicity between a
/// `get` and a later `set` is assumed: callers only ever blind-write.
#[async_trait]
pub trait CachePort: Send + Sync + std::fmt::Debug {
    /// Get a cached value by key
    ///
    /// Returns `None` if the key has never been set. Expired values are still
    /// returned; deciding what expiry means is up to the caller.
    async fn get_bytes(&self, key: &str) -> Result<Option<CachedBytes>, ApplicationError>;

    /// Set a cached value with its absolute expiry
    ///
    /// If the key already exists, its value and expiry are replaced.
    async fn set_bytes(
        &self,
        key: &str,
        value: Vec<u8>,
        expiry: DateTime<Utc>,
    ) -> Result<(), ApplicationError>;

    /// Get cache statistics (hits, misses, writes, size)
    fn stats(&self) -> CacheStats;
}

/// Extension trait for typed cache operations
///
/// Provides typed get/set methods on top of the raw byte interface.
#[async_trait]
pub trait CachePortExt: CachePort {
    /// Get a typed value from cache
    async fn get<T>(&self, key: &str) -> Result<Option<Cached<T>>, ApplicationError>
    where
        T: serde::de::DeserializeOwned + Send,
    {
        match self.get_bytes(key).await? {
            Some(Cached { value, expiry }) => {
                let value: T = serde_json::from_slice(&value).map_err(|e| {
                    ApplicationError::Cache(format!("Cache deserialization error: {e}"))
                })?;
                Ok(Some(Cached { value, expiry }))
            },
            None => Ok(None),
        }
    }

    /// Set a typed value in cache
    async fn set<T>(
        &self,
        key: &str,
        value: &T,
        expiry: DateTime<Utc>,
    ) -> Result<(), ApplicationError>
    where
        T: serde::Serialize + Send + Sync,
    {
        let bytes = serde_json::to_vec(value)
            .map_err(|e| ApplicationError::Cache(format!("Cache serialization error: {e}")))?;
        self.set_bytes(key, bytes, expiry).await
    }
}

// Blanket implementation for all CachePort implementors
impl<T: CachePort + ?Sized> CachePortExt for T {}

/// Cache statistics for monitoring
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of lookups that found a value
    pub hits: u64,
    /// Number of lookups that found nothing
    pub misses: u64,
    /// Number of values stored
    pub writes: u64,
    /// Current number of entries
    pub entries: u64,
}

impl CacheStats {
    /// Calculate the hit rate as a fraction (0.0 - 1.0)
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            // Precision loss is acceptable for statistics display
            self.hits as f64 / total as f64
        }
    }
}
