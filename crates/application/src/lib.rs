//! Application layer - Use cases and orchestration
//!
//! Contains the result coordinator, its collaborator ports and the
//! concurrency primitives it is built on.

pub mod background;
pub mod error;
pub mod ports;
pub mod services;
pub mod single_flight;

pub use background::BackgroundTasks;
pub use error::ApplicationError;
pub use ports::*;
pub use services::*;
pub use single_flight::{FlightAborted, SingleFlight};
