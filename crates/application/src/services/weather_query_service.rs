//! Weather query service
//!
//! Coordinates reads of the current weather result:
//!
//! 1. Load the cached result (bounded by the cache timeout). Cache failures
//!    are logged and treated as a miss.
//! 2. Serve it directly while it is fresh.
//! 3. Otherwise refresh through a single-flight guard, trying providers one at
//!    a time in priority order until one succeeds.
//! 4. Persist a successful result in the background and return it.
//! 5. If the refresh fails, serve the stale cached result when there is one.
//!
//! Only one result is tracked: the cache key and the single-flight key are
//! constants, so reads for different cities share one slot and one refresh.

use std::sync::Arc;
use std::time::Duration;

use domain::{CacheEntry, CityName, WeatherResult, WeatherSummary};
use serde::{Deserialize, Serialize};
use tokio::time::{Instant, timeout};
use tracing::{debug, error, info, instrument, warn};

use crate::background::BackgroundTasks;
use crate::error::ApplicationError;
use crate::ports::{CachePort, CachePortExt, ClockPort, SystemClock, WeatherProviderPort};
use crate::single_flight::SingleFlight;

/// Cache key under which the current result is stored
pub const RESULT_CACHE_KEY: &str = "weather:current";

/// Single-flight key shared by every refresh
pub const REFRESH_FLIGHT_KEY: &str = "refresh:current";

/// Timing configuration for the coordinator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// How long a fetched result stays fresh, in milliseconds (default: 3s)
    #[serde(default = "default_result_ttl_ms")]
    pub result_ttl_ms: u64,

    /// Bound on a single provider call, in milliseconds (default: 3s)
    #[serde(default = "default_provider_timeout_ms")]
    pub provider_timeout_ms: u64,

    /// Bound on each cache read or write, in milliseconds (default: 2s)
    #[serde(default = "default_cache_timeout_ms")]
    pub cache_timeout_ms: u64,

    /// Bound on a whole refresh across all providers, in milliseconds (default: 10s)
    #[serde(default = "default_refresh_timeout_ms")]
    pub refresh_timeout_ms: u64,
}

const fn default_result_ttl_ms() -> u64 {
    3_000
}

const fn default_provider_timeout_ms() -> u64 {
    3_000
}

const fn default_cache_timeout_ms() -> u64 {
    2_000
}

const fn default_refresh_timeout_ms() -> u64 {
    10_000
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            result_ttl_ms: default_result_ttl_ms(),
            provider_timeout_ms: default_provider_timeout_ms(),
            cache_timeout_ms: default_cache_timeout_ms(),
            refresh_timeout_ms: default_refresh_timeout_ms(),
        }
    }
}

impl CoordinatorConfig {
    /// Get the result TTL as a Duration
    #[must_use]
    pub const fn result_ttl(&self) -> Duration {
        Duration::from_millis(self.result_ttl_ms)
    }

    /// Get the per-provider timeout as a Duration
    #[must_use]
    pub const fn provider_timeout(&self) -> Duration {
        Duration::from_millis(self.provider_timeout_ms)
    }

    /// Get the cache operation timeout as a Duration
    #[must_use]
    pub const fn cache_timeout(&self) -> Duration {
        Duration::from_millis(self.cache_timeout_ms)
    }

    /// Get the overall refresh timeout as a Duration
    #[must_use]
    pub const fn refresh_timeout(&self) -> Duration {
        Duration::from_millis(self.refresh_timeout_ms)
    }

    /// Check that every duration is usable
    pub fn validate(&self) -> Result<(), ApplicationError> {
        let fields = [
            ("result_ttl_ms", self.result_ttl_ms),
            ("provider_timeout_ms", self.provider_timeout_ms),
            ("cache_timeout_ms", self.cache_timeout_ms),
            ("refresh_timeout_ms", self.refresh_timeout_ms),
        ];

        for (name, value) in fields {
            if value == 0 {
                return Err(ApplicationError::Configuration(format!(
                    "{name} must be greater than zero"
                )));
            }
        }

        Ok(())
    }
}

type ProviderList = Arc<[Arc<dyn WeatherProviderPort>]>;

/// Result coordinator for weather reads
pub struct WeatherQueryService {
    providers: ProviderList,
    cache: Arc<dyn CachePort>,
    clock: Arc<dyn ClockPort>,
    config: CoordinatorConfig,
    refresh: SingleFlight<Result<WeatherResult, ApplicationError>>,
    background: Arc<BackgroundTasks>,
}

impl std::fmt::Debug for WeatherQueryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherQueryService")
            .field("providers", &self.provider_names())
            .field("cache", &self.cache)
            .field("clock", &self.clock)
            .field("config", &self.config)
            .field("refresh", &self.refresh)
            .field("background", &self.background)
            .finish()
    }
}

impl WeatherQueryService {
    /// Create a coordinator over providers in priority order
    ///
    /// Uses the wall clock and [`CoordinatorConfig::default`].
    #[must_use]
    pub fn new(providers: Vec<Arc<dyn WeatherProviderPort>>, cache: Arc<dyn CachePort>) -> Self {
        Self {
            providers: providers.into(),
            cache,
            clock: Arc::new(SystemClock),
            config: CoordinatorConfig::default(),
            refresh: SingleFlight::new(),
            background: Arc::new(BackgroundTasks::new()),
        }
    }

    /// Set the timing configuration
    #[must_use]
    pub const fn with_config(mut self, config: CoordinatorConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the clock used for freshness decisions
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn ClockPort>) -> Self {
        self.clock = clock;
        self
    }

    /// Get the timing configuration
    #[must_use]
    pub const fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// Provider names in priority order
    #[must_use]
    pub fn provider_names(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Number of cache writes that have not finished yet
    #[must_use]
    pub fn pending_cache_writes(&self) -> usize {
        self.background.active_count()
    }

    /// Read the current weather result
    ///
    /// Serves the cached result while fresh, otherwise refreshes. A failed
    /// refresh falls back to the stale cached result if one exists.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::NothingToServe` if the refresh failed and
    /// nothing was cached.
    #[instrument(skip(self, city), fields(city = %city))]
    pub async fn read(&self, city: &CityName) -> Result<WeatherResult, ApplicationError> {
        let cached = self.load_cached().await;

        if let Some(result) = cached {
            if result.is_fresh_at(self.clock.now()) {
                return Ok(result);
            }
            debug!("Cached result expired");
        }

        debug!("Querying all providers");
        let job = self.refresh_job();
        let city = city.clone();
        let outcome = self
            .refresh
            .run(REFRESH_FLIGHT_KEY, move || job.run(city))
            .await
            .unwrap_or_else(|e| Err(ApplicationError::Internal(e.to_string())));

        match (outcome, cached) {
            (Ok(result), _) => Ok(result),
            (Err(e), Some(stale)) => {
                error!(error = %e, "Failed to retrieve new weather");
                warn!(
                    created_at = %stale.created_at(),
                    expiry = %stale.expiry(),
                    "Serving stale cached result"
                );
                Ok(stale)
            },
            (Err(e), None) => {
                error!(error = %e, "Failed to retrieve new weather");
                Err(ApplicationError::NothingToServe)
            },
        }
    }

    /// Query providers in priority order and return the first summary obtained
    ///
    /// Bypasses the cache and the single-flight guard. The whole fan-out is
    /// bounded by the refresh timeout.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::NoSuccessfulProvider` if every provider failed,
    /// or a timeout error if the refresh budget ran out.
    #[instrument(skip(self, city), fields(city = %city))]
    pub async fn query_providers(
        &self,
        city: &CityName,
    ) -> Result<WeatherSummary, ApplicationError> {
        query_within_budget(&self.providers, city, &self.config).await
    }

    /// Wait for pending cache writes, up to `timeout`
    ///
    /// Returns `true` if every write finished in time.
    pub async fn shutdown(&self, timeout: Duration) -> bool {
        let drained = self.background.drain(timeout).await;

        let stats = self.cache.stats();
        info!(
            drained,
            hits = stats.hits,
            misses = stats.misses,
            writes = stats.writes,
            hit_rate = stats.hit_rate(),
            "Weather query service shut down"
        );

        drained
    }

    async fn load_cached(&self) -> Option<WeatherResult> {
        let lookup = self.cache.get::<CacheEntry>(RESULT_CACHE_KEY);

        match timeout(self.config.cache_timeout(), lookup).await {
            Ok(Ok(Some(cached))) => {
                let result = WeatherResult::from_cache(cached.value, cached.expiry);
                debug!(
                    expires_in_ms = (result.expiry() - self.clock.now()).num_milliseconds(),
                    "Cache hit"
                );
                Some(result)
            },
            Ok(Ok(None)) => {
                debug!("Cache miss");
                None
            },
            Ok(Err(e)) => {
                warn!(error = %e, "Failed to retrieve result from cache");
                None
            },
            Err(_) => {
                warn!(
                    timeout_ms = self.config.cache_timeout_ms,
                    "Timed out retrieving result from cache"
                );
                None
            },
        }
    }

    fn refresh_job(&self) -> RefreshJob {
        RefreshJob {
            providers: Arc::clone(&self.providers),
            cache: Arc::clone(&self.cache),
            clock: Arc::clone(&self.clock),
            config: self.config,
            background: Arc::clone(&self.background),
        }
    }
}

/// Everything a refresh needs, owned so it can outlive the caller that started it
struct RefreshJob {
    providers: ProviderList,
    cache: Arc<dyn CachePort>,
    clock: Arc<dyn ClockPort>,
    config: CoordinatorConfig,
    background: Arc<BackgroundTasks>,
}

impl RefreshJob {
    async fn run(self, city: CityName) -> Result<WeatherResult, ApplicationError> {
        let summary = query_within_budget(&self.providers, &city, &self.config).await?;

        let result = WeatherResult::fresh(summary, self.clock.now(), self.config.result_ttl());
        debug!(summary = %result.summary(), expiry = %result.expiry(), "Fetched new result");

        self.store_in_background(result);
        Ok(result)
    }

    fn store_in_background(&self, result: WeatherResult) {
        let cache = Arc::clone(&self.cache);
        let cache_timeout = self.config.cache_timeout();
        let entry = result.to_cache_entry();
        let expiry = result.expiry();

        self.background.spawn("cache_write", async move {
            match timeout(cache_timeout, cache.set(RESULT_CACHE_KEY, &entry, expiry)).await {
                Ok(Ok(())) => debug!("Cached result"),
                Ok(Err(e)) => warn!(error = %e, "Failed to set result in cache"),
                Err(_) => warn!(
                    timeout_ms = u64::try_from(cache_timeout.as_millis()).unwrap_or(u64::MAX),
                    "Timed out setting result in cache"
                ),
            }
        });
    }
}

/// Fan out under the overall refresh budget
async fn query_within_budget(
    providers: &[Arc<dyn WeatherProviderPort>],
    city: &CityName,
    config: &CoordinatorConfig,
) -> Result<WeatherSummary, ApplicationError> {
    let budget = config.refresh_timeout();
    let deadline = Instant::now() + budget;

    timeout(
        budget,
        fan_out(providers, city, config.provider_timeout(), deadline, budget),
    )
    .await
    .unwrap_or_else(|_| {
        Err(ApplicationError::Timeout(format!(
            "refresh exceeded {}ms",
            config.refresh_timeout_ms
        )))
    })
}

/// Try each provider in order; the first success wins
///
/// No provider is started once `deadline` has passed; `budget` is the span the
/// deadline was derived from and is only reported.
async fn fan_out(
    providers: &[Arc<dyn WeatherProviderPort>],
    city: &CityName,
    provider_timeout: Duration,
    deadline: Instant,
    budget: Duration,
) -> Result<WeatherSummary, ApplicationError> {
    for provider in providers {
        if Instant::now() >= deadline {
            return Err(ApplicationError::Cancelled(format!(
                "{}ms refresh budget spent",
                budget.as_millis()
            )));
        }

        match query_provider(provider.as_ref(), city, provider_timeout).await {
            Ok(summary) => {
                debug!(provider = %provider.name(), "Provider responded");
                return Ok(summary);
            },
            Err(e) => {
                warn!(provider = %provider.name(), error = %e, "Provider responded with error");
            },
        }
    }

    Err(ApplicationError::NoSuccessfulProvider)
}

async fn query_provider(
    provider: &dyn WeatherProviderPort,
    city: &CityName,
    provider_timeout: Duration,
) -> Result<WeatherSummary, ApplicationError> {
    timeout(provider_timeout, provider.fetch_summary(city))
        .await
        .unwrap_or_else(|_| {
            Err(ApplicationError::Timeout(format!(
                "provider did not respond within {}ms",
                provider_timeout.as_millis()
            )))
        })
}
