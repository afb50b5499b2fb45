//! Domain layer for Skycast
//!
//! Contains the weather value objects, the cached result entity and domain errors.
//! This layer has no async code and no I/O.

pub mod entities;
pub mod errors;
pub mod value_objects;

pub use entities::*;
pub use errors::DomainError;
pub use value_objects::*;
