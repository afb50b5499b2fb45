//! Port definitions for application layer
//!
//! Ports are interfaces that define how the application interacts with
//! external systems. Adapters in the infrastructure layer implement these ports.

mod cache_port;
mod clock_port;
mod weather_provider_port;

pub use cache_port::{CachePort, CachePortExt, CacheStats, Cached, CachedBytes};
pub use clock_port::{ClockPort, ManualClock, SystemClock};
#[cfg(test)]
pub use weather_provider_port::MockWeatherProviderPort;
pub use weather_provider_port::WeatherProviderPort;
