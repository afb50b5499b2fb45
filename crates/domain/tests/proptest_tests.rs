//! Property-based tests for domain value objects
//!
//! These tests use proptest to verify invariants across many random inputs.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use domain::{CacheEntry, CityName, WeatherResult, WeatherSummary};
use proptest::prelude::*;

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

// ============================================================================
// WeatherResult Property Tests
// ============================================================================

mod weather_result_tests {
    use super::*;

    proptest! {
        #[test]
        fn expiry_never_precedes_creation(
            offset_secs in 0i64..1_000_000_000,
            ttl_ms in any::<u64>(),
        ) {
            let created_at = base_time() + TimeDelta::seconds(offset_secs);
            let result = WeatherResult::fresh(
                WeatherSummary::new(10.0, 1.0),
                created_at,
                Duration::from_millis(ttl_ms),
            );
            prop_assert!(result.expiry() >= result.created_at());
        }

        #[test]
        fn fresh_until_ttl_elapses(
            ttl_ms in 0u64..86_400_000,
            probe_ms in 0u64..172_800_000,
        ) {
            let t0 = base_time();
            let result = WeatherResult::fresh(
                WeatherSummary::new(0.0, 0.0),
                t0,
                Duration::from_millis(ttl_ms),
            );
            let now = t0 + TimeDelta::milliseconds(i64::try_from(probe_ms).unwrap());
            prop_assert_eq!(result.is_fresh_at(now), probe_ms <= ttl_ms);
        }

        #[test]
        fn cached_expiry_is_clamped(
            created_offset in 0i64..1_000_000,
            expiry_offset in -1_000_000i64..1_000_000,
        ) {
            let created_at = base_time() + TimeDelta::seconds(created_offset);
            let entry = CacheEntry {
                summary: WeatherSummary::new(5.0, 5.0),
                created_at,
            };
            let result = WeatherResult::from_cache(entry, base_time() + TimeDelta::seconds(expiry_offset));
            prop_assert!(result.expiry() >= result.created_at());
        }

        #[test]
        fn summary_survives_json(
            temperature in -100.0f64..100.0,
            wind_speed in 0.0f64..400.0,
        ) {
            let summary = WeatherSummary::new(temperature, wind_speed);
            let json = serde_json::to_string(&summary).unwrap();
            let parsed: WeatherSummary = serde_json::from_str(&json).unwrap();
            prop_assert_eq!(parsed, summary);
        }
    }
}

// ============================================================================
// CityName Property Tests
// ============================================================================

mod city_name_tests {
    use super::*;

    proptest! {
        #[test]
        fn valid_names_are_trimmed(name in "[A-Za-z][A-Za-z ]{0,40}[A-Za-z]", pad in 0usize..5) {
            let padded = format!("{}{name}{}", " ".repeat(pad), " ".repeat(pad));
            let city = CityName::new(&padded).unwrap();
            prop_assert_eq!(city.as_str(), name.as_str());
        }

        #[test]
        fn whitespace_only_is_rejected(name in "[ \t]{0,20}") {
            prop_assert!(CityName::new(&name).is_err());
        }

        #[test]
        fn overlong_names_are_rejected(len in (CityName::MAX_LEN + 1)..(CityName::MAX_LEN * 3)) {
            prop_assert!(CityName::new("x".repeat(len)).is_err());
        }
    }
}
