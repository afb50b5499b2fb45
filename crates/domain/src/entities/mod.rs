//! Domain entities - Objects with a lifecycle

mod weather_result;

pub use weather_result::{CacheEntry, WeatherResult};
