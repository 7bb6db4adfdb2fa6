//! Valhalla routing integration
//!
//! Talks to a [Valhalla](https://github.com/valhalla/valhalla) routing service
//! for two operations:
//!
//! - optimal multi-stop routes via `/optimized_route`, falling back to `/route`
//! - isochrone-based reachability filtering via `/isochrone`
//!
//! # Architecture
//!
//! [`RoutingClient`] and [`ReachabilityFilter`] define the interface consumed by
//! the presentation layer; [`ValhallaClient`] implements both. Failures never
//! reach the caller as errors: routing yields `None` (or a
//! [`RouteOutcome::Failed`] from [`RoutingClient::compute_route`]) and the
//! filter yields an empty set, each with a log entry.
//!
//! # Example
//!
//! ```rust,ignore
//! use domain::{Coordinate, Costing};
//! use integration_valhalla::{RoutingClient, ValhallaClient, ValhallaConfig};
//!
//! let config = ValhallaConfig::new("http://localhost:8002");
//! let client = ValhallaClient::new(&config)?;
//!
//! let trip = client.get_optimal_route(
//!     &[Coordinate::new(36.72, -4.42)?, Coordinate::new(36.73, -4.40)?],
//!     Costing::Auto,
//! ).await;
//! ```

mod client;
mod config;
mod error;
mod isochrone;
mod models;
mod shape;

pub use client::{
    OPTIMIZED_ROUTE_MAX_SPAN_METERS, RouteEndpoint, RouteOutcome, RoutingClient, ValhallaClient,
};
pub use config::{Units, ValhallaConfig};
pub use error::ValhallaError;
pub use isochrone::{IsochronePolygon, Reachability, ReachabilityFilter};
pub use models::{ExitTowardElement, Leg, Maneuver, Sign, Summary, Trip, TripLocation};
pub use shape::{SHAPE_PRECISION, decode_shape, encode_shape};
