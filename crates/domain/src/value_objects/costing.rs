//! Costing model value object

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::DomainError;

/// Travel-mode profile the routing service uses to compute time and cost
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Costing {
    /// Car
    #[default]
    Auto,
    /// Walking
    Pedestrian,
    /// Bicycle
    Bicycle,
}

impl Costing {
    /// Wire name used by the routing service
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Pedestrian => "pedestrian",
            Self::Bicycle => "bicycle",
        }
    }

    /// Get a human-readable label
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Auto => "Auto",
            Self::Pedestrian => "Pedestrian",
            Self::Bicycle => "Bicycle",
        }
    }

    /// Get an emoji representation
    #[must_use]
    pub const fn emoji(&self) -> &'static str {
        match self {
            Self::Auto => "🚗",
            Self::Pedestrian => "🚶",
            Self::Bicycle => "🚴",
        }
    }

    /// All costing models
    #[must_use]
    pub const fn all() -> [Self; 3] {
        [Self::Auto, Self::Pedestrian, Self::Bicycle]
    }
}

impl fmt::Display for Costing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Costing {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" | "car" => Ok(Self::Auto),
            "pedestrian" | "walk" => Ok(Self::Pedestrian),
            "bicycle" | "bike" => Ok(Self::Bicycle),
            other => Err(DomainError::UnknownCosting(other.to_string())),
        }
    }
}
