//! Value Objects - Immutable, identity-less domain primitives

mod city_name;
mod weather_summary;

pub use city_name::CityName;
pub use weather_summary::WeatherSummary;
