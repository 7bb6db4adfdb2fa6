//! Encoded polyline shapes
//!
//! Valhalla encodes leg geometry with the polyline algorithm at six decimal
//! digits of precision (polyline6). Decoding at the more common precision 5
//! yields coordinates off by a factor of ten.

use domain::Coordinate;
use geo::Coord;

use crate::error::ValhallaError;

/// Number of decimal digits Valhalla uses in encoded shapes
pub const SHAPE_PRECISION: u32 = 6;

/// Decode a polyline6 shape into coordinates
///
/// # Errors
///
/// Returns `ValhallaError::InvalidGeometry` if the string is not a valid
/// polyline or decodes to out-of-range coordinates.
pub fn decode_shape(encoded: &str) -> Result<Vec<Coordinate>, ValhallaError> {
    let line = polyline::decode_polyline(encoded, SHAPE_PRECISION)
        .map_err(|e| ValhallaError::InvalidGeometry(format!("undecodable shape: {e}")))?;

    Ok(line
        .coords()
        .map(|c| Coordinate::new_unchecked(c.y, c.x))
        .collect())
}

/// Encode coordinates as a polyline6 shape
///
/// # Errors
///
/// Returns `ValhallaError::InvalidGeometry` if a coordinate is out of range.
pub fn encode_shape(coordinates: &[Coordinate]) -> Result<String, ValhallaError> {
    polyline::encode_coordinates(
        coordinates.iter().map(|c| Coord {
            x: c.longitude(),
            y: c.latitude(),
        }),
        SHAPE_PRECISION,
    )
    .map_err(|e| ValhallaError::InvalidGeometry(format!("unencodable shape: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_precision_six() {
        let coords = decode_shape("_we`eA~xwlGowH_pRowH_pR").unwrap();
        assert_eq!(coords.len(), 3);
        assert!(coords[0].approx_eq(&Coordinate::new_unchecked(36.72, -4.42), 1e-9));
        assert!(coords[1].approx_eq(&Coordinate::new_unchecked(36.725, -4.41), 1e-9));
        assert!(coords[2].approx_eq(&Coordinate::new_unchecked(36.73, -4.40), 1e-9));
    }

    #[test]
    fn test_precision_five_string_is_scaled_down() {
        // Reference polyline5 example (38.5,-120.2), (40.7,-120.95), (43.252,-126.453)
        let coords = decode_shape("_p~iF~ps|U_ulLnnqC_mqNvxq`@").unwrap();
        assert_eq!(coords.len(), 3);
        assert!(coords[0].approx_eq(&Coordinate::new_unchecked(3.85, -12.02), 1e-9));
        assert!(coords[2].approx_eq(&Coordinate::new_unchecked(4.3252, -12.6453), 1e-9));
    }

    #[test]
    fn test_empty_shape_decodes_to_nothing() {
        assert!(decode_shape("").unwrap().is_empty());
    }

    #[test]
    fn test_invalid_shape() {
        let result = decode_shape("!!");
        assert!(matches!(result, Err(ValhallaError::InvalidGeometry(_))));
    }

    #[test]
    fn test_encode_matches_service_encoding() {
        let coords = [
            Coordinate::new_unchecked(36.73, -4.40),
            Coordinate::new_unchecked(36.735, -4.395),
            Coordinate::new_unchecked(36.74, -4.39),
        ];
        assert_eq!(encode_shape(&coords).unwrap(), "_hy`eA~vpkGowHowHowHowH");
    }
}
