//! Weather provider port
//!
//! The single capability every upstream weather integration implements.

use async_trait::async_trait;
use domain::{CityName, WeatherSummary};
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Port for an upstream weather provider
///
/// Implementations must give up promptly when their future is dropped;
/// the coordinator bounds every call with a timeout and drops it on expiry.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait WeatherProviderPort: Send + Sync {
    /// A unique, human-readable name for the provider (used in logs)
    fn name(&self) -> String;

    /// Fetch the current weather summary for a city
    async fn fetch_summary(&self, city: &CityName) -> Result<WeatherSummary, ApplicationError>;
}
