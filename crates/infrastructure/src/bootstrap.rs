//! Service wiring
//!
//! Builds a ready [`WeatherQueryService`] from loaded configuration.

use std::sync::Arc;

use application::{
    WeatherQueryService,
    error::ApplicationError,
    ports::{CachePort, SystemClock, WeatherProviderPort},
};
use tracing::info;

use crate::{cache::MemoryCache, config::AppConfig};

/// Build the coordinator over an in-memory cache and the wall clock
///
/// Providers are tried in the order given.
pub fn build_query_service(
    config: &AppConfig,
    providers: Vec<Arc<dyn WeatherProviderPort>>,
) -> Result<WeatherQueryService, ApplicationError> {
    build_query_service_with_cache(config, providers, Arc::new(MemoryCache::new()))
}

/// Build the coordinator over a caller-supplied cache
pub fn build_query_service_with_cache(
    config: &AppConfig,
    providers: Vec<Arc<dyn WeatherProviderPort>>,
    cache: Arc<dyn CachePort>,
) -> Result<WeatherQueryService, ApplicationError> {
    config.validate()?;

    let service = WeatherQueryService::new(providers, cache)
        .with_config(config.coordinator)
        .with_clock(Arc::new(SystemClock));

    info!(
        environment = %config.environment,
        providers = ?service.provider_names(),
        result_ttl_ms = config.coordinator.result_ttl_ms,
        "Weather query service ready"
    );

    Ok(service)
}
