//! Integration tests for the wired coordinator
//!
//! These tests run `WeatherQueryService` over the real `MemoryCache` adapter
//! and the configuration loader.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use application::{
    ApplicationError, CachePort, CachePortExt, ClockPort, ManualClock, RESULT_CACHE_KEY,
    WeatherProviderPort, WeatherQueryService,
};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use domain::{CacheEntry, CityName, WeatherSummary};
use infrastructure::{AppConfig, MemoryCache, build_query_service, build_query_service_with_cache};
use mockall::mock;

// ============================================================================
// Test Helpers
// ============================================================================

mock! {
    Provider {}

    #[async_trait]
    impl WeatherProviderPort for Provider {
        fn name(&self) -> String;
        async fn fetch_summary(&self, city: &CityName) -> Result<WeatherSummary, ApplicationError>;
    }
}

const SUMMARY: WeatherSummary = WeatherSummary::new(18.0, 9.5);

fn city() -> CityName {
    CityName::new("Lisbon").expect("valid city")
}

fn answering_provider(times: usize) -> MockProvider {
    let mut provider = MockProvider::new();
    provider.expect_name().return_const("mock".to_string());
    provider
        .expect_fetch_summary()
        .times(times)
        .returning(|_| Ok(SUMMARY));
    provider
}

/// Provider that answers after a delay and counts its calls
#[derive(Debug, Default)]
struct SlowProvider {
    calls: AtomicUsize,
}

#[async_trait]
impl WeatherProviderPort for SlowProvider {
    fn name(&self) -> String {
        "slow".to_string()
    }

    async fn fetch_summary(&self, _city: &CityName) -> Result<WeatherSummary, ApplicationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(200)).await;
        Ok(SUMMARY)
    }
}

// ============================================================================
// Wired Service
// ============================================================================

#[tokio::test]
async fn second_read_is_served_from_memory_cache() {
    let cache = Arc::new(MemoryCache::new());
    let service = build_query_service_with_cache(
        &AppConfig::default(),
        vec![Arc::new(answering_provider(1))],
        cache.clone(),
    )
    .expect("service builds");

    let first = service.read(&city()).await.expect("first read");
    assert!(service.shutdown(Duration::from_secs(1)).await);

    let second = service.read(&city()).await.expect("second read");
    assert_eq!(second, first);

    let stats = cache.stats();
    assert_eq!(stats.writes, 1);
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
}

#[tokio::test]
async fn completed_refresh_is_persisted_under_the_result_key() {
    let cache = Arc::new(MemoryCache::new());
    let service = build_query_service_with_cache(
        &AppConfig::default(),
        vec![Arc::new(answering_provider(1))],
        cache.clone(),
    )
    .expect("service builds");

    let result = service.read(&city()).await.expect("read");
    assert!(service.shutdown(Duration::from_secs(1)).await);

    let cached = cache
        .get::<CacheEntry>(RESULT_CACHE_KEY)
        .await
        .expect("cache read")
        .expect("entry stored");
    assert_eq!(cached.value, result.to_cache_entry());
    assert_eq!(cached.expiry, result.expiry());
    assert_eq!(cache.len(), 1);
}

#[tokio::test]
async fn expired_entry_is_served_when_refresh_fails() {
    let start = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
    let clock = Arc::new(ManualClock::new(start));
    let cache = Arc::new(MemoryCache::new());

    let calls = AtomicUsize::new(0);
    let mut provider = MockProvider::new();
    provider.expect_name().return_const("flaky".to_string());
    provider.expect_fetch_summary().times(2).returning(move |_| {
        if calls.fetch_add(1, Ordering::SeqCst) == 0 {
            Ok(SUMMARY)
        } else {
            Err(ApplicationError::Provider("upstream 503".into()))
        }
    });

    let service = WeatherQueryService::new(vec![Arc::new(provider)], cache.clone())
        .with_clock(clock.clone());

    let fresh = service.read(&city()).await.expect("fresh read");
    assert!(service.shutdown(Duration::from_secs(1)).await);

    clock.advance(Duration::from_secs(60));
    let stale = service.read(&city()).await.expect("stale read");

    assert_eq!(stale, fresh);
    assert!(!stale.is_fresh_at(clock.now()));
}

#[tokio::test]
async fn failure_with_empty_memory_cache_is_an_error() {
    let mut provider = MockProvider::new();
    provider.expect_name().return_const("down".to_string());
    provider
        .expect_fetch_summary()
        .returning(|_| Err(ApplicationError::Provider("unreachable".into())));

    let service = build_query_service(&AppConfig::default(), vec![Arc::new(provider)])
        .expect("service builds");

    let err = service.read(&city()).await.unwrap_err();
    assert_eq!(err, ApplicationError::NothingToServe);
    assert_eq!(
        err.to_string(),
        "failed to load a new result and no cached result to fall back on"
    );
}

#[tokio::test(start_paused = true)]
async fn concurrent_tasks_share_one_provider_call() {
    let provider = Arc::new(SlowProvider::default());
    let service = Arc::new(
        build_query_service(&AppConfig::default(), vec![provider.clone()])
            .expect("service builds"),
    );

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.read(&city()).await })
        })
        .collect();

    let mut results = Vec::new();
    for handle in handles {
        results.push(handle.await.expect("task joins").expect("read succeeds"));
    }

    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    assert!(results.windows(2).all(|pair| pair[0] == pair[1]));
}

// ============================================================================
// Configuration
// ============================================================================

#[tokio::test]
async fn toml_configuration_reaches_the_coordinator() {
    let config = AppConfig::from_toml_str(
        "[coordinator]\nresult_ttl_ms = 250\nprovider_timeout_ms = 100\n",
    )
    .expect("config parses");

    let service = build_query_service(&config, vec![Arc::new(answering_provider(1))])
        .expect("service builds");

    assert_eq!(service.config().result_ttl(), Duration::from_millis(250));
    assert_eq!(service.config().provider_timeout(), Duration::from_millis(100));

    let result = service.read(&city()).await.expect("read");
    assert_eq!(
        (result.expiry() - result.created_at()).num_milliseconds(),
        250
    );
}

#[test]
fn zero_refresh_timeout_is_rejected_at_wiring() {
    let config = AppConfig::from_toml_str("[coordinator]\nrefresh_timeout_ms = 0\n")
        .expect("config parses");

    let err = build_query_service(&config, Vec::new()).unwrap_err();
    assert!(matches!(err, ApplicationError::Configuration(_)));
}
