//! Logging and tracing infrastructure
//!
//! Installs the global `tracing` subscriber used by the application.

mod subscriber;

pub use subscriber::{TelemetryConfig, TelemetryError, init_tracing};
