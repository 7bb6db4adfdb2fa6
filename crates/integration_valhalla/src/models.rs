//! Valhalla trip models
//!
//! Typed representations of the `trip` object returned by `/optimized_route`
//! and `/route`. Every required field is required at deserialization time;
//! [`Trip::validate`] then checks the structural invariants serde cannot.

use std::fmt;

use domain::Coordinate;
use serde::{Deserialize, Serialize};

use crate::error::ValhallaError;
use crate::shape::decode_shape;

/// A computed route across all requested locations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Trip {
    /// Echo of the routed locations, in visiting order
    pub locations: Vec<TripLocation>,
    /// One leg per consecutive pair of locations
    pub legs: Vec<Leg>,
    /// Aggregate metrics for the whole trip
    pub summary: Summary,
    /// Service status text
    pub status_message: String,
    /// Service status code
    pub status: i32,
    /// Unit system of lengths (e.g. "kilometers")
    pub units: String,
    /// Language of narrative instructions
    pub language: String,
}

impl Trip {
    /// Check structural invariants of a parsed trip
    ///
    /// # Errors
    ///
    /// Returns `ValhallaError::InvalidTrip` if the leg count does not match the
    /// location count or any leg is invalid.
    pub fn validate(&self) -> Result<(), ValhallaError> {
        if self.legs.len() + 1 != self.locations.len() {
            return Err(ValhallaError::InvalidTrip(format!(
                "{} legs for {} locations",
                self.legs.len(),
                self.locations.len()
            )));
        }

        for (index, leg) in self.legs.iter().enumerate() {
            leg.validate().map_err(|e| match e {
                ValhallaError::InvalidTrip(msg) => {
                    ValhallaError::InvalidTrip(format!("leg {index}: {msg}"))
                },
                other => other,
            })?;
        }

        Ok(())
    }

    /// Sum of leg lengths, in the trip's units
    #[must_use]
    pub fn legs_length(&self) -> f64 {
        self.legs.iter().map(|leg| leg.summary.length).sum()
    }

    /// Sum of leg times in seconds
    #[must_use]
    pub fn legs_time(&self) -> f64 {
        self.legs.iter().map(|leg| leg.summary.time).sum()
    }

    /// Abbreviation for the unit system of this trip's lengths
    #[must_use]
    pub fn length_unit(&self) -> &'static str {
        if self.units.eq_ignore_ascii_case("miles") {
            "mi"
        } else {
            "km"
        }
    }

    /// Routed locations as coordinates, in visiting order
    #[must_use]
    pub fn waypoints(&self) -> Vec<Coordinate> {
        self.locations.iter().map(TripLocation::coordinate).collect()
    }
}

/// A location echoed back by the service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TripLocation {
    /// Location kind ("break", "through", ...)
    #[serde(rename = "type")]
    pub kind: String,
    /// Latitude
    pub lat: f64,
    /// Longitude
    pub lon: f64,
    /// Index of this location in the request
    pub original_index: usize,
    /// Side of street the location snapped to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side_of_street: Option<String>,
}

impl TripLocation {
    /// Position as a coordinate
    #[must_use]
    pub const fn coordinate(&self) -> Coordinate {
        Coordinate::new_unchecked(self.lat, self.lon)
    }
}

/// One segment of a trip between two consecutive locations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Leg {
    /// Turn-by-turn steps
    pub maneuvers: Vec<Maneuver>,
    /// Metrics for this leg
    pub summary: Summary,
    /// Polyline6-encoded path geometry
    pub shape: String,
}

impl Leg {
    /// Decode the leg's shape
    ///
    /// # Errors
    ///
    /// Returns `ValhallaError::InvalidGeometry` if the shape is not valid polyline6.
    pub fn coordinates(&self) -> Result<Vec<Coordinate>, ValhallaError> {
        decode_shape(&self.shape)
    }

    /// Check shape and maneuver invariants
    ///
    /// # Errors
    ///
    /// Returns an error if the shape cannot be decoded, is empty while
    /// maneuvers exist, or a maneuver's shape range is inverted or out of bounds.
    pub fn validate(&self) -> Result<(), ValhallaError> {
        if self.maneuvers.is_empty() {
            return Ok(());
        }

        let points = self.coordinates()?.len();
        if points == 0 {
            return Err(ValhallaError::InvalidTrip(
                "empty shape for a leg with maneuvers".to_string(),
            ));
        }

        for (index, maneuver) in self.maneuvers.iter().enumerate() {
            if maneuver.begin_shape_index > maneuver.end_shape_index {
                return Err(ValhallaError::InvalidTrip(format!(
                    "maneuver {index} shape range {}..={} is inverted",
                    maneuver.begin_shape_index, maneuver.end_shape_index
                )));
            }
            if maneuver.end_shape_index >= points {
                return Err(ValhallaError::InvalidTrip(format!(
                    "maneuver {index} ends at shape index {} but shape has {points} points",
                    maneuver.end_shape_index
                )));
            }
        }

        Ok(())
    }
}

/// A single instruction step within a leg
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Maneuver {
    /// Valhalla maneuver type code
    #[serde(rename = "type")]
    pub kind: u32,
    /// Written instruction
    pub instruction: String,
    /// Duration in seconds
    pub time: f64,
    /// Length in the trip's units
    pub length: f64,
    /// Cost as computed by the costing model
    pub cost: f64,
    /// First shape index of this maneuver in the parent leg
    pub begin_shape_index: usize,
    /// Last shape index of this maneuver in the parent leg
    pub end_shape_index: usize,
    /// Travel mode ("drive", "pedestrian", "bicycle", ...)
    pub travel_mode: String,
    /// Travel type within the mode ("car", "foot", "road", ...)
    pub travel_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verbal_succinct_transition_instruction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verbal_pre_transition_instruction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verbal_post_transition_instruction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verbal_transition_alert_instruction: Option<String>,
    /// Streets this maneuver travels along
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street_names: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bearing_before: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bearing_after: Option<f64>,
    /// Exit signage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sign: Option<Sign>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verbal_multi_cue: Option<bool>,
}

impl Maneuver {
    /// The part of a decoded leg path covered by this maneuver
    ///
    /// Out-of-range indices are clamped to the path.
    #[must_use]
    pub fn coordinates<'a>(&self, leg_path: &'a [Coordinate]) -> &'a [Coordinate] {
        if leg_path.is_empty() {
            return leg_path;
        }
        let last = leg_path.len() - 1;
        let begin = self.begin_shape_index.min(last);
        let end = self.end_shape_index.clamp(begin, last);
        &leg_path[begin..=end]
    }
}

impl fmt::Display for Maneuver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.2}, {:.0}s)", self.instruction, self.length, self.time)
    }
}

/// Exit signage attached to a maneuver
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Sign {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_toward_elements: Option<Vec<ExitTowardElement>>,
}

/// One "toward" entry of an exit sign
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExitTowardElement {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consecutive_count: Option<u32>,
}

/// Aggregate metrics for a trip or a leg
#[allow(clippy::struct_excessive_bools)] // Mirrors the service's flag set
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Summary {
    pub has_time_restrictions: bool,
    pub has_toll: bool,
    pub has_highway: bool,
    pub has_ferry: bool,
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
    /// Duration in seconds
    pub time: f64,
    /// Length in the trip's units
    pub length: f64,
    pub cost: f64,
}

impl Summary {
    /// Duration in minutes
    #[must_use]
    pub fn duration_minutes(&self) -> f64 {
        self.time / 60.0
    }

    /// South-west and north-east corners of the bounding box
    #[must_use]
    pub const fn bounds(&self) -> (Coordinate, Coordinate) {
        (
            Coordinate::new_unchecked(self.min_lat, self.min_lon),
            Coordinate::new_unchecked(self.max_lat, self.max_lon),
        )
    }

    /// Length and duration, e.g. `2.50 km, 5.0 min`
    #[must_use]
    pub fn describe(&self, length_unit: &str) -> String {
        format!(
            "{:.2} {length_unit}, {:.1} min",
            self.length,
            self.duration_minutes()
        )
    }

    /// Format the yes/no road flags as a compact string
    #[must_use]
    pub fn format_flags(&self) -> String {
        let yes_no = |flag: bool| if flag { "yes" } else { "no" };
        format!(
            "tolls: {}, highway: {}, ferry: {}",
            yes_no(self.has_toll),
            yes_no(self.has_highway),
            yes_no(self.has_ferry)
        )
    }
}
