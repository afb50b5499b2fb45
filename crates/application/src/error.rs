//! Application-level errors

use domain::DomainError;
use thiserror::Error;

/// Errors that can occur in the application layer
///
/// Errors are `Clone` so a single refresh outcome can be handed to every
/// caller waiting on it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApplicationError {
    /// Domain-level error
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// An upstream weather provider failed
    #[error("Provider error: {0}")]
    Provider(String),

    /// The cache store failed or could not decode an entry
    #[error("Cache error: {0}")]
    Cache(String),

    /// An operation exceeded its time budget
    #[error("Timed out: {0}")]
    Timeout(String),

    /// The refresh budget was spent before every provider could be tried
    #[error("context done before exhausting providers: {0}")]
    Cancelled(String),

    /// Every provider failed, or none are configured
    #[error("no successful provider responses")]
    NoSuccessfulProvider,

    /// The refresh failed and there is no cached result to fall back on
    #[error("failed to load a new result and no cached result to fall back on")]
    NothingToServe,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApplicationError {
    /// Check if this error came from exceeding a time bound
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Cancelled(_))
    }
}
