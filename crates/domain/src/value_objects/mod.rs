//! Value Objects - Immutable, identity-less domain primitives

mod coordinate;
mod costing;

pub use coordinate::Coordinate;
pub use costing::Costing;
