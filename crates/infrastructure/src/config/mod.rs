//! Application configuration
//!
//! Layered through the `config` crate, later sources overriding earlier ones:
//! 1. Built-in defaults
//! 2. `config.toml` in the working directory (optional)
//! 3. `SKYCAST_*` environment variables, nested keys separated by `__`
//!    (e.g. `SKYCAST_COORDINATOR__RESULT_TTL_MS=5000`)

use std::collections::HashMap;
use std::fmt;

use application::{error::ApplicationError, services::CoordinatorConfig};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::telemetry::TelemetryConfig;

/// Prefix for environment variable overrides
pub const ENV_PREFIX: &str = "SKYCAST";

/// Application environment (development or production)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Development environment - human-readable logs
    #[default]
    Development,
    /// Production environment
    Production,
}

impl Environment {
    /// Check if running in production
    #[must_use]
    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            _ => Err(format!(
                "Invalid environment: {s}. Use 'development' or 'production'"
            )),
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development or production)
    #[serde(default)]
    pub environment: Environment,

    /// Result TTL and timeout configuration for the coordinator
    #[serde(default)]
    pub coordinator: CoordinatorConfig,

    /// Logging configuration
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::build(config::File::with_name("config").required(false), None)
    }

    /// Load configuration from a TOML document, ignoring the process environment
    pub fn from_toml_str(toml: &str) -> Result<Self, config::ConfigError> {
        Self::build(
            config::File::from_str(toml, config::FileFormat::Toml),
            Some(HashMap::new()),
        )
    }

    /// Layer defaults, `file` and environment variables
    ///
    /// `env_vars` replaces the process environment when given.
    fn build<S>(file: S, env_vars: Option<HashMap<String, String>>) -> Result<Self, config::ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let defaults = CoordinatorConfig::default();

        let builder = config::Config::builder()
            // Start with defaults
            .set_default("environment", Environment::default().to_string())?
            .set_default("coordinator.result_ttl_ms", defaults.result_ttl_ms)?
            .set_default("coordinator.provider_timeout_ms", defaults.provider_timeout_ms)?
            .set_default("coordinator.cache_timeout_ms", defaults.cache_timeout_ms)?
            .set_default("coordinator.refresh_timeout_ms", defaults.refresh_timeout_ms)?
            .add_source(file)
            // Override with environment variables (e.g., SKYCAST_COORDINATOR__RESULT_TTL_MS)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .source(env_vars),
            );

        let config: Self = builder.build()?.try_deserialize()?;
        debug!(environment = %config.environment, "Configuration loaded");
        Ok(config)
    }

    /// Check the loaded values are usable
    pub fn validate(&self) -> Result<(), ApplicationError> {
        self.coordinator.validate()
    }
}
