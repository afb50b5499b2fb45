//! Domain-level errors

use thiserror::Error;

/// Errors that can occur in the domain layer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// The requested city name is empty or malformed
    #[error("Invalid city: {0}")]
    InvalidCity(String),
}
