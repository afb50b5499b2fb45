//! Weather summary value object
//!
//! A single weather reading for a location at a point in time.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Weather datapoints reported by an upstream provider
///
/// Summaries have no identity and are compared by value.
///
/// # Examples
///
/// ```
/// use domain::value_objects::WeatherSummary;
///
/// let summary = WeatherSummary::new(21.5, 12.0);
/// assert!((summary.temperature() - 21.5).abs() < f64::EPSILON);
/// assert_eq!(format!("{summary}"), "21.5°, wind 12.0 km/h");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherSummary {
    /// Temperature in degrees
    #[serde(rename = "temperature_degrees")]
    temperature: f64,
    /// Wind speed in km/h
    wind_speed: f64,
}

impl WeatherSummary {
    /// Create a new summary
    #[must_use]
    pub const fn new(temperature: f64, wind_speed: f64) -> Self {
        Self {
            temperature,
            wind_speed,
        }
    }

    /// Get the temperature in degrees
    #[must_use]
    pub const fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Get the wind speed in km/h
    #[must_use]
    pub const fn wind_speed(&self) -> f64 {
        self.wind_speed
    }
}

impl fmt::Display for WeatherSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.1}°, wind {:.1} km/h",
            self.temperature, self.wind_speed
        )
    }
}
