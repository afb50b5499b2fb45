//! Weather result entity
//!
//! A [`WeatherSummary`] together with its creation time and absolute expiry.
//! Results are created right after a successful provider fetch, never mutated,
//! and superseded by the next successful refresh.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::WeatherSummary;

/// The unit returned to callers and cached between refreshes
///
/// Invariant: `expiry >= created_at`.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use chrono::{TimeZone, Utc};
/// use domain::{WeatherResult, WeatherSummary};
///
/// let t0 = Utc.with_ymd_and_hms(2020, 11, 11, 10, 10, 10).unwrap();
/// let result = WeatherResult::fresh(WeatherSummary::new(123.456, 0.0), t0, Duration::from_secs(1));
///
/// assert!(result.is_fresh_at(t0));
/// assert!(!result.is_fresh_at(t0 + chrono::TimeDelta::seconds(2)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherResult {
    summary: WeatherSummary,
    created_at: DateTime<Utc>,
    expiry: DateTime<Utc>,
}

impl WeatherResult {
    /// Create a result for a summary that was just fetched
    ///
    /// The expiry is `created_at + ttl`, saturating at the latest representable time.
    #[must_use]
    pub fn fresh(summary: WeatherSummary, created_at: DateTime<Utc>, ttl: Duration) -> Self {
        let ttl = TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX);
        let expiry = created_at
            .checked_add_signed(ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        Self {
            summary,
            created_at,
            expiry,
        }
    }

    /// Rebuild a result from a persisted cache entry and its stored expiry
    ///
    /// An expiry earlier than the entry's creation time is clamped to the creation time.
    #[must_use]
    pub fn from_cache(entry: CacheEntry, expiry: DateTime<Utc>) -> Self {
        Self {
            summary: entry.summary,
            created_at: entry.created_at,
            expiry: expiry.max(entry.created_at),
        }
    }

    /// Get the weather summary
    #[must_use]
    pub const fn summary(&self) -> &WeatherSummary {
        &self.summary
    }

    /// Get the creation time
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Get the absolute expiry time
    #[must_use]
    pub const fn expiry(&self) -> DateTime<Utc> {
        self.expiry
    }

    /// Check whether the result may still be served without a refresh
    ///
    /// Freshness is inclusive: a result is fresh at exactly its expiry.
    #[must_use]
    pub fn is_fresh_at(&self, now: DateTime<Utc>) -> bool {
        now <= self.expiry
    }

    /// Time left until expiry, zero once expired
    #[must_use]
    pub fn remaining_ttl(&self, now: DateTime<Utc>) -> TimeDelta {
        (self.expiry - now).max(TimeDelta::zero())
    }

    /// The part of the result that is persisted in the cache
    #[must_use]
    pub const fn to_cache_entry(&self) -> CacheEntry {
        CacheEntry {
            summary: self.summary,
            created_at: self.created_at,
        }
    }
}

/// The value persisted in the cache store
///
/// The expiry is not part of the entry: the cache carries it natively
/// alongside the value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// The cached summary
    pub summary: WeatherSummary,
    /// When the summary was fetched
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 11, 11, 10, 10, 10).unwrap()
    }

    fn summary() -> WeatherSummary {
        WeatherSummary::new(123.456, 0.0)
    }

    #[test]
    fn fresh_sets_expiry_from_ttl() {
        let result = WeatherResult::fresh(summary(), t0(), Duration::from_secs(3));
        assert_eq!(result.created_at(), t0());
        assert_eq!(result.expiry(), t0() + TimeDelta::seconds(3));
        assert_eq!(result.summary(), &summary());
    }

    #[test]
    fn zero_ttl_expires_at_creation() {
        let result = WeatherResult::fresh(summary(), t0(), Duration::ZERO);
        assert_eq!(result.expiry(), result.created_at());
        assert!(result.is_fresh_at(t0()));
    }

    #[test]
    fn huge_ttl_saturates() {
        let result = WeatherResult::fresh(summary(), t0(), Duration::MAX);
        assert!(result.expiry() >= result.created_at());
        assert_eq!(result.expiry(), DateTime::<Utc>::MAX_UTC);
    }

    #[test]
    fn freshness_is_inclusive_at_expiry() {
        let result = WeatherResult::fresh(summary(), t0(), Duration::from_secs(1));
        assert!(result.is_fresh_at(t0() + TimeDelta::milliseconds(500)));
        assert!(result.is_fresh_at(t0() + TimeDelta::seconds(1)));
        assert!(!result.is_fresh_at(t0() + TimeDelta::milliseconds(1001)));
    }

    #[test]
    fn remaining_ttl_saturates_at_zero() {
        let result = WeatherResult::fresh(summary(), t0(), Duration::from_secs(1));
        assert_eq!(result.remaining_ttl(t0()), TimeDelta::seconds(1));
        assert_eq!(
            result.remaining_ttl(t0() + TimeDelta::seconds(5)),
            TimeDelta::zero()
        );
    }

    #[test]
    fn cache_entry_roundtrip_preserves_result() {
        let result = WeatherResult::fresh(summary(), t0(), Duration::from_secs(1));
        let rebuilt = WeatherResult::from_cache(result.to_cache_entry(), result.expiry());
        assert_eq!(rebuilt, result);
    }

    #[test]
    fn from_cache_clamps_expiry_before_creation() {
        let entry = CacheEntry {
            summary: summary(),
            created_at: t0(),
        };
        let result = WeatherResult::from_cache(entry, t0() - TimeDelta::seconds(10));
        assert_eq!(result.expiry(), t0());
    }

    #[test]
    fn cache_entry_serializes_to_json() {
        let entry = CacheEntry {
            summary: summary(),
            created_at: t0(),
        };
        let json = serde_json::to_string(&entry).unwrap();
        let parsed: CacheEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, entry);
    }
}
