//! Domain layer for the Valhalla route tester
//!
//! Contains the value objects shared by the routing client and its callers.
//! This layer performs no I/O.

pub mod errors;
pub mod value_objects;

pub use errors::DomainError;
pub use value_objects::*;
