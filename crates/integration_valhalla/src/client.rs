//! Valhalla routing client
//!
//! Computes multi-stop routes with a two-tier endpoint strategy: the
//! `/optimized_route` solver first, then the sequential `/route` endpoint
//! with the identical payload if the solver fails.

use std::time::Duration;

use async_trait::async_trait;
use domain::{Coordinate, Costing};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument, warn};

use crate::config::{Units, ValhallaConfig};
use crate::error::ValhallaError;
use crate::models::Trip;

/// Span above which `/optimized_route` rejects a location set
pub const OPTIMIZED_ROUTE_MAX_SPAN_METERS: f64 = 400_000.0;

/// Trait for route computation clients
#[async_trait]
pub trait RoutingClient: Send + Sync {
    /// Run the optimized-then-sequential pipeline and report every branch
    async fn compute_route(&self, locations: &[Coordinate], costing: Costing) -> RouteOutcome;

    /// Optimal route through `locations`, or `None` if both endpoints failed
    async fn get_optimal_route(&self, locations: &[Coordinate], costing: Costing) -> Option<Trip> {
        self.compute_route(locations, costing).await.into_trip()
    }

    /// Check if the routing service is reachable
    async fn is_healthy(&self) -> bool;
}

/// Route endpoints, in the order they are attempted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteEndpoint {
    /// Multi-stop solver; fails for location sets spanning more than 400 km
    OptimizedRoute,
    /// Sequential router used as fallback
    Route,
}

impl RouteEndpoint {
    /// Request path relative to the base URL
    #[must_use]
    pub const fn path(&self) -> &'static str {
        match self {
            Self::OptimizedRoute => "/optimized_route",
            Self::Route => "/route",
        }
    }
}

/// Result of the two-step route pipeline
#[derive(Debug)]
pub enum RouteOutcome {
    /// `/optimized_route` produced the trip
    Primary(Trip),
    /// `/optimized_route` failed and `/route` produced the trip
    Fallback {
        /// Trip from the fallback endpoint
        trip: Trip,
        /// Why the primary endpoint failed
        primary_error: ValhallaError,
    },
    /// No request could be sent
    Unavailable(ValhallaError),
    /// Both endpoints failed
    Failed {
        /// Why the primary endpoint failed
        primary_error: ValhallaError,
        /// Why the fallback endpoint failed
        fallback_error: ValhallaError,
    },
}

impl RouteOutcome {
    /// The computed trip, if any
    #[must_use]
    pub fn into_trip(self) -> Option<Trip> {
        match self {
            Self::Primary(trip) | Self::Fallback { trip, .. } => Some(trip),
            Self::Unavailable(_) | Self::Failed { .. } => None,
        }
    }

    /// Borrow the computed trip, if any
    #[must_use]
    pub const fn trip(&self) -> Option<&Trip> {
        match self {
            Self::Primary(trip) | Self::Fallback { trip, .. } => Some(trip),
            Self::Unavailable(_) | Self::Failed { .. } => None,
        }
    }

    /// Endpoint that produced the trip
    #[must_use]
    pub const fn endpoint(&self) -> Option<RouteEndpoint> {
        match self {
            Self::Primary(_) => Some(RouteEndpoint::OptimizedRoute),
            Self::Fallback { .. } => Some(RouteEndpoint::Route),
            Self::Unavailable(_) | Self::Failed { .. } => None,
        }
    }

    /// Failure of `/optimized_route`, if it was attempted and failed
    #[must_use]
    pub const fn primary_error(&self) -> Option<&ValhallaError> {
        match self {
            Self::Primary(_) | Self::Unavailable(_) => None,
            Self::Fallback { primary_error, .. } | Self::Failed { primary_error, .. } => {
                Some(primary_error)
            },
        }
    }

    /// Number of outbound route requests this outcome took
    #[must_use]
    pub const fn attempts(&self) -> usize {
        match self {
            Self::Unavailable(_) => 0,
            Self::Primary(_) => 1,
            Self::Fallback { .. } | Self::Failed { .. } => 2,
        }
    }
}

/// Body shared by `/optimized_route` and `/route`
#[derive(Debug, Serialize)]
struct RouteRequest<'a> {
    locations: &'a [Coordinate],
    costing: Costing,
    units: Units,
}

/// Valhalla-backed routing client
///
/// Holds configuration only. Each operation opens its own HTTP session and
/// drops it before returning.
#[derive(Debug, Clone)]
pub struct ValhallaClient {
    pub(crate) config: ValhallaConfig,
}

impl ValhallaClient {
    /// Create a new Valhalla client
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(config: &ValhallaConfig) -> Result<Self, ValhallaError> {
        config.validate().map_err(ValhallaError::ConfigurationError)?;

        Ok(Self {
            config: config.clone(),
        })
    }

    /// Client configuration
    #[must_use]
    pub const fn config(&self) -> &ValhallaConfig {
        &self.config
    }

    /// Open an HTTP session scoped to a single operation
    pub(crate) fn session(&self) -> Result<Client, ValhallaError> {
        Client::builder()
            .user_agent("valhalla-route-tester/0.1")
            .build()
            .map_err(|e| ValhallaError::ConnectionFailed(e.to_string()))
    }

    /// POST a JSON body and return the raw success body
    ///
    /// Non-2xx answers are logged with method, URL, status and body.
    pub(crate) async fn post_json<T: Serialize + Sync>(
        &self,
        session: &Client,
        path: &str,
        payload: &T,
        timeout_secs: u64,
    ) -> Result<String, ValhallaError> {
        let url = self.config.endpoint(path);
        let map_transport = |e: reqwest::Error| {
            if e.is_timeout() {
                ValhallaError::Timeout { timeout_secs }
            } else {
                ValhallaError::ConnectionFailed(e.to_string())
            }
        };

        debug!(%url, "POST to Valhalla");

        let response = session
            .post(&url)
            .timeout(Duration::from_secs(timeout_secs))
            .json(payload)
            .send()
            .await
            .map_err(map_transport)?;

        let status = response.status();
        let body = response.text().await.map_err(map_transport)?;

        if !status.is_success() {
            error!(
                method = "POST",
                %url,
                status = status.as_u16(),
                %body,
                "Valhalla request failed"
            );
            return Err(ValhallaError::RequestFailed {
                method: "POST".to_string(),
                url,
                status: status.as_u16(),
                body,
            });
        }

        Ok(body)
    }

    /// Parse a route response body into a validated trip
    fn parse_route_response(body: &str) -> Result<Trip, ValhallaError> {
        let raw: RawRouteResponse =
            serde_json::from_str(body).map_err(|e| ValhallaError::ParseError(e.to_string()))?;

        let trip = raw.trip.ok_or(ValhallaError::MissingField("trip"))?;
        trip.validate()?;
        Ok(trip)
    }

    /// Request a trip from one route endpoint
    async fn request_trip(
        &self,
        session: &Client,
        endpoint: RouteEndpoint,
        request: &RouteRequest<'_>,
    ) -> Result<Trip, ValhallaError> {
        let body = self
            .post_json(
                session,
                endpoint.path(),
                request,
                self.config.route_timeout_secs,
            )
            .await?;

        Self::parse_route_response(&body)
    }
}

#[async_trait]
impl RoutingClient for ValhallaClient {
    #[instrument(skip(self, locations), fields(locations = locations.len()))]
    async fn compute_route(&self, locations: &[Coordinate], costing: Costing) -> RouteOutcome {
        let request = RouteRequest {
            locations,
            costing,
            units: self.config.units,
        };

        let span_m = Coordinate::span_meters(locations);
        if span_m > OPTIMIZED_ROUTE_MAX_SPAN_METERS {
            debug!(span_m, "Locations exceed the optimized_route span limit");
        }

        let session = match self.session() {
            Ok(session) => session,
            Err(e) => {
                error!(error = %e, "Could not open HTTP session");
                return RouteOutcome::Unavailable(e);
            },
        };

        let primary_error = match self
            .request_trip(&session, RouteEndpoint::OptimizedRoute, &request)
            .await
        {
            Ok(trip) => {
                debug!(legs = trip.legs.len(), "optimized_route succeeded");
                return RouteOutcome::Primary(trip);
            },
            Err(e) => e,
        };

        if primary_error.is_expected_rejection() {
            debug!(error = %primary_error, "optimized_route rejected the locations; trying /route");
        } else {
            warn!(error = %primary_error, "optimized_route failed; trying /route");
        }

        match self
            .request_trip(&session, RouteEndpoint::Route, &request)
            .await
        {
            Ok(trip) => {
                debug!(legs = trip.legs.len(), "Fallback /route succeeded");
                RouteOutcome::Fallback {
                    trip,
                    primary_error,
                }
            },
            Err(fallback_error) => {
                error!(error = %fallback_error, "Fallback /route failed");
                RouteOutcome::Failed {
                    primary_error,
                    fallback_error,
                }
            },
        }
    }

    async fn is_healthy(&self) -> bool {
        let Ok(session) = self.session() else {
            return false;
        };

        session
            .get(self.config.endpoint("/status"))
            .timeout(Duration::from_secs(self.config.isochrone_timeout_secs))
            .send()
            .await
            .is_ok_and(|response| response.status().is_success())
    }
}

// --- Raw API response types for deserialization ---

#[derive(Debug, Deserialize)]
struct RawRouteResponse {
    trip: Option<Trip>,
}
