//! Domain-level errors

use thiserror::Error;

/// Errors that can occur in the domain layer
#[derive(Debug, Error)]
pub enum DomainError {
    /// Latitude or longitude out of range
    #[error("Invalid coordinates ({latitude}, {longitude}): latitude must be -90 to 90, longitude must be -180 to 180")]
    InvalidCoordinates { latitude: f64, longitude: f64 },

    /// Coordinate text that is not `lat,lon`
    #[error("Invalid coordinate format: {0} (expected \"lat,lon\")")]
    InvalidCoordinateFormat(String),

    /// Costing model name not recognised
    #[error("Unknown costing model: {0}")]
    UnknownCosting(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_coordinates_error_message() {
        let err = DomainError::InvalidCoordinates {
            latitude: 91.0,
            longitude: 0.0,
        };
        assert!(err.to_string().contains("91"));
        assert!(err.to_string().starts_with("Invalid coordinates"));
    }

    #[test]
    fn invalid_format_error_message() {
        let err = DomainError::InvalidCoordinateFormat("abc".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid coordinate format: abc (expected \"lat,lon\")"
        );
    }

    #[test]
    fn unknown_costing_error_message() {
        let err = DomainError::UnknownCosting("truck".to_string());
        assert_eq!(err.to_string(), "Unknown costing model: truck");
    }
}
