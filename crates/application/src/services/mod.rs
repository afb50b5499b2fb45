//! Application services - Use case implementations

mod weather_query_service;

pub use weather_query_service::{
    CoordinatorConfig, REFRESH_FLIGHT_KEY, RESULT_CACHE_KEY, WeatherQueryService,
};
