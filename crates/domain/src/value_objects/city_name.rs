//! City name value object
//!
//! The subject of a weather read. Validated once at the edge so providers
//! always receive a trimmed, non-empty name.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::DomainError;

/// A validated city name
///
/// # Examples
///
/// ```
/// use domain::value_objects::CityName;
///
/// let city = CityName::new("  Sydney ").expect("valid city");
/// assert_eq!(city.as_str(), "Sydney");
///
/// assert!(CityName::new("   ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CityName(String);

impl CityName {
    /// Maximum accepted length in characters
    pub const MAX_LEN: usize = 100;

    /// Create a new city name, trimming surrounding whitespace
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidCity` if the trimmed name is empty,
    /// longer than [`Self::MAX_LEN`] characters, or contains control characters.
    pub fn new(name: impl AsRef<str>) -> Result<Self, DomainError> {
        let trimmed = name.as_ref().trim();

        if trimmed.is_empty() {
            return Err(DomainError::InvalidCity("city name is empty".to_string()));
        }

        let len = trimmed.chars().count();
        if len > Self::MAX_LEN {
            return Err(DomainError::InvalidCity(format!(
                "city name is {len} characters long (max {})",
                Self::MAX_LEN
            )));
        }

        if trimmed.chars().any(char::is_control) {
            return Err(DomainError::InvalidCity(
                "city name contains control characters".to_string(),
            ));
        }

        Ok(Self(trimmed.to_string()))
    }

    /// Get the city name as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CityName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CityName {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl std::str::FromStr for CityName {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl From<CityName> for String {
    fn from(city: CityName) -> Self {
        city.0
    }
}
