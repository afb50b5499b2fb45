//! Infrastructure layer - Adapters for external systems
//!
//! Implements ports defined in the application layer and carries the
//! process-level concerns: configuration loading, tracing setup and wiring.

pub mod bootstrap;
pub mod cache;
pub mod config;
pub mod telemetry;

pub use bootstrap::{build_query_service, build_query_service_with_cache};
pub use cache::MemoryCache;
pub use config::{AppConfig, ENV_PREFIX, Environment};
pub use telemetry::{TelemetryConfig, TelemetryError, init_tracing};
