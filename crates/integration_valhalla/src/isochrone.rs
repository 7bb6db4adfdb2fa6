//! Isochrone reachability filter
//!
//! Requests a single travel-time contour around a center and classifies
//! candidate points against the returned polygon.

use async_trait::async_trait;
use domain::{Coordinate, Costing};
use geo::coordinate_position::{CoordPos, CoordinatePosition};
use geo::{Coord, LineString, Polygon};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use crate::client::ValhallaClient;
use crate::error::ValhallaError;

/// Trait for isochrone-based reachability filters
#[async_trait]
pub trait ReachabilityFilter: Send + Sync {
    /// Candidates reachable from `center` within `minutes`, in input order
    ///
    /// Any failure yields an empty result.
    async fn filter_by_polygon(
        &self,
        center: Coordinate,
        minutes: u32,
        candidates: &[Coordinate],
        costing: Costing,
    ) -> Vec<Coordinate>;

    /// Every candidate tagged as reachable or not
    async fn classify_reachability(
        &self,
        center: Coordinate,
        minutes: u32,
        candidates: &[Coordinate],
        costing: Costing,
    ) -> Vec<Reachability>;
}

/// Classification of one candidate point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reachability {
    pub coordinate: Coordinate,
    pub reachable: bool,
}

impl Reachability {
    /// Tag each candidate with whether it matches a reachable point within `tolerance`
    #[must_use]
    pub fn classify(
        candidates: &[Coordinate],
        reachable: &[Coordinate],
        tolerance: f64,
    ) -> Vec<Self> {
        candidates
            .iter()
            .map(|candidate| Self {
                coordinate: *candidate,
                reachable: reachable
                    .iter()
                    .any(|r| r.approx_eq(candidate, tolerance)),
            })
            .collect()
    }

    /// Share of reachable entries in `[0, 1]`; 0 for an empty set
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn ratio(classified: &[Self]) -> f64 {
        if classified.is_empty() {
            return 0.0;
        }
        let reachable = classified.iter().filter(|r| r.reachable).count();
        reachable as f64 / classified.len() as f64
    }
}

/// Planar isochrone region in (longitude, latitude) space
#[derive(Debug, Clone, PartialEq)]
pub struct IsochronePolygon {
    polygon: Polygon<f64>,
}

impl IsochronePolygon {
    /// Build a polygon from a ring of `[lon, lat]` vertices
    ///
    /// The ring may or may not repeat its first vertex at the end.
    ///
    /// # Errors
    ///
    /// Returns `ValhallaError::InvalidGeometry` if a vertex is malformed or
    /// non-finite, or the ring has fewer than 3 distinct vertices.
    pub fn from_ring(ring: &[Vec<f64>]) -> Result<Self, ValhallaError> {
        let mut vertices: Vec<Coord<f64>> = Vec::with_capacity(ring.len());
        for (index, vertex) in ring.iter().enumerate() {
            let (x, y) = match vertex.as_slice() {
                [x, y, ..] if x.is_finite() && y.is_finite() => (*x, *y),
                _ => {
                    return Err(ValhallaError::InvalidGeometry(format!(
                        "vertex {index} is not a finite [lon, lat] pair"
                    )));
                },
            };
            vertices.push(Coord { x, y });
        }

        let mut unique = vertices.clone();
        unique.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
        unique.dedup();
        let distinct = unique.len();

        if distinct < 3 {
            return Err(ValhallaError::InvalidGeometry(format!(
                "ring has {distinct} distinct vertices, need at least 3"
            )));
        }

        Ok(Self {
            polygon: Polygon::new(LineString::from(vertices), vec![]),
        })
    }

    /// Whether the coordinate lies inside the polygon or on its boundary
    #[must_use]
    pub fn contains(&self, coordinate: &Coordinate) -> bool {
        let (x, y) = coordinate.lon_lat();
        !matches!(
            self.polygon.coordinate_position(&Coord { x, y }),
            CoordPos::Outside
        )
    }

    /// Candidates inside or on the polygon, in input order
    #[must_use]
    pub fn filter(&self, candidates: &[Coordinate]) -> Vec<Coordinate> {
        candidates
            .iter()
            .filter(|candidate| self.contains(candidate))
            .copied()
            .collect()
    }

    /// Number of ring vertices, including the closing vertex
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.polygon.exterior().0.len()
    }
}

/// Body for `/isochrone`
#[derive(Debug, Serialize)]
struct IsochroneRequest {
    locations: [Coordinate; 1],
    costing: Costing,
    contours: [Contour; 1],
    polygons: bool,
}

#[derive(Debug, Serialize)]
struct Contour {
    time: u32,
}

impl ValhallaClient {
    /// Request the isochrone polygon for `center` and a single `minutes` contour
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-2xx status, a response
    /// without a polygon, or a degenerate polygon.
    pub async fn isochrone(
        &self,
        center: Coordinate,
        minutes: u32,
        costing: Costing,
    ) -> Result<IsochronePolygon, ValhallaError> {
        let request = IsochroneRequest {
            locations: [center],
            costing,
            contours: [Contour { time: minutes }],
            polygons: true,
        };

        let session = self.session()?;
        let body = self
            .post_json(
                &session,
                "/isochrone",
                &request,
                self.config.isochrone_timeout_secs,
            )
            .await?;

        Self::parse_isochrone_response(&body)
    }

    /// Extract the first ring of the first feature
    fn parse_isochrone_response(body: &str) -> Result<IsochronePolygon, ValhallaError> {
        let raw: RawIsochroneResponse =
            serde_json::from_str(body).map_err(|e| ValhallaError::ParseError(e.to_string()))?;

        let ring = raw
            .features
            .ok_or(ValhallaError::MissingField("features"))?
            .into_iter()
            .next()
            .ok_or(ValhallaError::MissingField("features[0]"))?
            .geometry
            .coordinates
            .into_iter()
            .next()
            .ok_or(ValhallaError::MissingField("coordinates[0]"))?;

        IsochronePolygon::from_ring(&ring)
    }
}

#[async_trait]
impl ReachabilityFilter for ValhallaClient {
    #[instrument(skip(self, candidates), fields(candidates = candidates.len()))]
    async fn filter_by_polygon(
        &self,
        center: Coordinate,
        minutes: u32,
        candidates: &[Coordinate],
        costing: Costing,
    ) -> Vec<Coordinate> {
        match self.isochrone(center, minutes, costing).await {
            Ok(polygon) => {
                let reachable = polygon.filter(candidates);
                debug!(
                    vertices = polygon.vertex_count(),
                    reachable = reachable.len(),
                    "Classified candidates against isochrone"
                );
                reachable
            },
            Err(e) => {
                error!(error = %e, "Valhalla error (isochrone)");
                Vec::new()
            },
        }
    }

    async fn classify_reachability(
        &self,
        center: Coordinate,
        minutes: u32,
        candidates: &[Coordinate],
        costing: Costing,
    ) -> Vec<Reachability> {
        let reachable = self
            .filter_by_polygon(center, minutes, candidates, costing)
            .await;

        Reachability::classify(candidates, &reachable, self.config.match_tolerance)
    }
}

// --- Raw API response types for deserialization ---

#[derive(Debug, Deserialize)]
struct RawIsochroneResponse {
    features: Option<Vec<RawFeature>>,
}

#[derive(Debug, Deserialize)]
struct RawFeature {
    geometry: RawGeometry,
}

#[derive(Debug, Deserialize)]
struct RawGeometry {
    coordinates: Vec<Vec<Vec<f64>>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Axis-aligned square around Málaga centre, closed ring of [lon, lat]
    fn square_ring() -> Vec<Vec<f64>> {
        vec![
            vec![-4.43, 36.71],
            vec![-4.41, 36.71],
            vec![-4.41, 36.73],
            vec![-4.43, 36.73],
            vec![-4.43, 36.71],
        ]
    }

    fn square() -> IsochronePolygon {
        IsochronePolygon::from_ring(&square_ring()).unwrap()
    }

    #[test]
    fn test_inside_point() {
        assert!(square().contains(&Coordinate::new_unchecked(36.721, -4.421)));
    }

    #[test]
    fn test_outside_point() {
        assert!(!square().contains(&Coordinate::new_unchecked(40.0, 10.0)));
        assert!(!square().contains(&Coordinate::new_unchecked(36.72, -4.40)));
    }

    #[test]
    fn test_boundary_points_are_inclusive() {
        let polygon = square();
        // On an edge
        assert!(polygon.contains(&Coordinate::new_unchecked(36.72, -4.41)));
        // On a vertex
        assert!(polygon.contains(&Coordinate::new_unchecked(36.71, -4.43)));
    }

    #[test]
    fn test_filter_preserves_order() {
        let candidates = [
            Coordinate::new_unchecked(36.725, -4.415),
            Coordinate::new_unchecked(40.0, 10.0),
            Coordinate::new_unchecked(36.715, -4.425),
        ];
        let reachable = square().filter(&candidates);
        assert_eq!(reachable, vec![candidates[0], candidates[2]]);
    }

    #[test]
    fn test_open_ring_accepted() {
        let mut ring = square_ring();
        ring.pop();
        let polygon = IsochronePolygon::from_ring(&ring).unwrap();
        assert!(polygon.contains(&Coordinate::new_unchecked(36.72, -4.42)));
    }

    #[test]
    fn test_degenerate_rings_rejected() {
        let two = vec![vec![-4.43, 36.71], vec![-4.41, 36.71]];
        assert!(IsochronePolygon::from_ring(&two).is_err());

        let closed_two = vec![vec![-4.43, 36.71], vec![-4.41, 36.71], vec![-4.43, 36.71]];
        assert!(IsochronePolygon::from_ring(&closed_two).is_err());

        assert!(IsochronePolygon::from_ring(&[]).is_err());
    }

    #[test]
    fn test_repeated_vertices_rejected() {
        let a = vec![-4.43, 36.71];
        let b = vec![-4.41, 36.71];

        for ring in [
            vec![a.clone(), a.clone(), b.clone()],
            vec![a.clone(), b.clone(), a.clone(), b.clone()],
            vec![a.clone(), a.clone(), a.clone(), a.clone()],
        ] {
            assert!(matches!(
                IsochronePolygon::from_ring(&ring),
                Err(ValhallaError::InvalidGeometry(msg)) if msg.contains("distinct")
            ));
        }
    }

    #[test]
    fn test_repeated_vertex_in_valid_ring_accepted() {
        let mut ring = square_ring();
        ring.insert(1, ring[1].clone());
        let polygon = IsochronePolygon::from_ring(&ring).unwrap();
        assert!(polygon.contains(&Coordinate::new_unchecked(36.72, -4.42)));
    }

    #[test]
    fn test_malformed_vertex_rejected() {
        let ring = vec![vec![-4.43], vec![-4.41, 36.71], vec![-4.41, 36.73]];
        assert!(matches!(
            IsochronePolygon::from_ring(&ring),
            Err(ValhallaError::InvalidGeometry(_))
        ));

        let ring = vec![vec![f64::NAN, 36.71], vec![-4.41, 36.71], vec![-4.41, 36.73]];
        assert!(IsochronePolygon::from_ring(&ring).is_err());
    }

    #[test]
    fn test_parse_isochrone_response() {
        let body = serde_json::json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": { "contour": 15, "metric": "time" },
                "geometry": { "type": "Polygon", "coordinates": [square_ring()] }
            }]
        })
        .to_string();

        let polygon = ValhallaClient::parse_isochrone_response(&body).unwrap();
        assert_eq!(polygon.vertex_count(), 5);
    }

    #[test]
    fn test_parse_isochrone_missing_features() {
        assert!(matches!(
            ValhallaClient::parse_isochrone_response(r#"{ "type": "FeatureCollection" }"#),
            Err(ValhallaError::MissingField("features"))
        ));
        assert!(matches!(
            ValhallaClient::parse_isochrone_response(r#"{ "features": [] }"#),
            Err(ValhallaError::MissingField("features[0]"))
        ));
        assert!(matches!(
            ValhallaClient::parse_isochrone_response(
                r#"{ "features": [{ "geometry": { "coordinates": [] } }] }"#
            ),
            Err(ValhallaError::MissingField("coordinates[0]"))
        ));
    }

    #[test]
    fn test_isochrone_request_body() {
        let request = IsochroneRequest {
            locations: [Coordinate::new_unchecked(36.72, -4.42)],
            costing: Costing::Pedestrian,
            contours: [Contour { time: 15 }],
            polygons: true,
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({
                "locations": [{ "lat": 36.72, "lon": -4.42 }],
                "costing": "pedestrian",
                "contours": [{ "time": 15 }],
                "polygons": true
            })
        );
    }

    #[test]
    fn test_classify_with_tolerance() {
        let candidates = [
            Coordinate::new_unchecked(36.721, -4.421),
            Coordinate::new_unchecked(40.0, 10.0),
        ];
        let reachable = [Coordinate::new_unchecked(36.721_000_1, -4.421)];

        let classified = Reachability::classify(&candidates, &reachable, 1e-6);
        assert!(classified[0].reachable);
        assert!(!classified[1].reachable);
        assert!((Reachability::ratio(&classified) - 0.5).abs() < f64::EPSILON);

        let strict = Reachability::classify(&candidates, &reachable, 1e-9);
        assert!(!strict[0].reachable);
    }

    #[test]
    fn test_ratio_empty() {
        assert!(Reachability::ratio(&[]).abs() < f64::EPSILON);
    }
}
