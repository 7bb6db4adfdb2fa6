//! Geographic coordinate value object

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::DomainError;

/// A geographic point with latitude and longitude in degrees
///
/// Serializes as `{"lat": .., "lon": ..}`, the location schema the routing
/// service expects for waypoints and isochrone centers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees (-90 to 90)
    #[serde(rename = "lat")]
    latitude: f64,
    /// Longitude in degrees (-180 to 180)
    #[serde(rename = "lon")]
    longitude: f64,
}

impl Coordinate {
    /// Create a new coordinate with validation
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidCoordinates` if latitude is not in [-90, 90]
    /// or longitude is not in [-180, 180]
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, DomainError> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(DomainError::InvalidCoordinates {
                latitude,
                longitude,
            });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Create a coordinate without validation (for trusted sources)
    ///
    /// Caller must ensure latitude is in [-90, 90] and longitude in [-180, 180]
    #[must_use]
    pub const fn new_unchecked(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Get the latitude
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Get the longitude
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Planar `(x, y)` pair, i.e. `(longitude, latitude)`
    #[must_use]
    pub const fn lon_lat(&self) -> (f64, f64) {
        (self.longitude, self.latitude)
    }

    /// Whether both axes are within `tolerance` degrees of `other`
    #[must_use]
    pub fn approx_eq(&self, other: &Self, tolerance: f64) -> bool {
        (self.latitude - other.latitude).abs() < tolerance
            && (self.longitude - other.longitude).abs() < tolerance
    }

    /// Calculate approximate distance to another coordinate in kilometers
    ///
    /// Uses the Haversine formula for great-circle distance
    #[must_use]
    pub fn distance_km(&self, other: &Self) -> f64 {
        const EARTH_RADIUS_KM: f64 = 6371.0;

        let lat1_rad = self.latitude.to_radians();
        let lat2_rad = other.latitude.to_radians();
        let delta_lat = (other.latitude - self.latitude).to_radians();
        let delta_lon = (other.longitude - self.longitude).to_radians();

        let a = (lat1_rad.cos() * lat2_rad.cos()).mul_add(
            (delta_lon / 2.0).sin().powi(2),
            (delta_lat / 2.0).sin().powi(2),
        );
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_KM * c
    }

    /// Largest pairwise great-circle distance within a set of coordinates, in meters
    #[must_use]
    pub fn span_meters(coordinates: &[Self]) -> f64 {
        let mut span = 0.0_f64;
        for (i, a) in coordinates.iter().enumerate() {
            for b in &coordinates[i + 1..] {
                span = span.max(a.distance_km(b) * 1000.0);
            }
        }
        span
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.latitude, self.longitude)
    }
}

impl std::str::FromStr for Coordinate {
    type Err = DomainError;

    /// Parse `"lat,lon"` (whitespace around either number is ignored)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DomainError::InvalidCoordinateFormat(s.to_string());

        let (lat, lon) = s.split_once(',').ok_or_else(invalid)?;
        let latitude: f64 = lat.trim().parse().map_err(|_| invalid())?;
        let longitude: f64 = lon.trim().parse().map_err(|_| invalid())?;

        Self::new(latitude, longitude)
    }
}

/// Well-known coordinates
impl Coordinate {
    /// Málaga city centre, Spain
    #[must_use]
    pub const fn malaga() -> Self {
        Self::new_unchecked(36.7213, -4.4214)
    }
}
