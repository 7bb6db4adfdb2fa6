//! Valhalla error types

use thiserror::Error;

/// Errors that can occur while talking to the Valhalla service
///
/// None of these escape [`RoutingClient::get_optimal_route`] or
/// [`ReachabilityFilter::filter_by_polygon`]; they drive the fallback and
/// empty-result paths and end up in logs and in [`RouteOutcome`].
///
/// [`RoutingClient::get_optimal_route`]: crate::RoutingClient::get_optimal_route
/// [`ReachabilityFilter::filter_by_polygon`]: crate::ReachabilityFilter::filter_by_polygon
/// [`RouteOutcome`]: crate::RouteOutcome
#[derive(Debug, Clone, Error)]
pub enum ValhallaError {
    /// Connection to the routing service failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Request timeout
    #[error("Request timed out after {timeout_secs} seconds")]
    Timeout {
        /// The timeout duration in seconds
        timeout_secs: u64,
    },

    /// The service answered with a non-success status
    #[error("Valhalla {method} {url} -> {status} | body={body}")]
    RequestFailed {
        /// HTTP method of the failed request
        method: String,
        /// Full request URL
        url: String,
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// A required field was absent from the response
    #[error("Missing '{0}' in response")]
    MissingField(&'static str),

    /// Failed to parse response from the routing service
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Trip payload parsed but violates a structural invariant
    #[error("Invalid trip: {0}")]
    InvalidTrip(String),

    /// Geometry could not be built from the response
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl ValhallaError {
    /// HTTP status of a rejected request, if any
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::RequestFailed { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns true for client-side rejections attributable to the input
    /// (malformed or oversized location sets): 400, 409 and 422
    #[must_use]
    pub const fn is_expected_rejection(&self) -> bool {
        matches!(self.status(), Some(400 | 409 | 422))
    }

    /// Returns true if the failure happened before a response was received
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::ConnectionFailed(_) | Self::Timeout { .. })
    }
}
