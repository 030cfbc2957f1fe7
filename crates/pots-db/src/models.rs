use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Whether an area is inside or outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LocationType {
    Indoor,
    Outdoor,
}

impl fmt::Display for LocationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Indoor => "indoor",
            Self::Outdoor => "outdoor",
        };
        f.write_str(s)
    }
}

impl FromStr for LocationType {
    type Err = LocationTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "indoor" => Ok(Self::Indoor),
            "outdoor" => Ok(Self::Outdoor),
            other => Err(LocationTypeParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`LocationType`] string.
#[derive(Debug, Clone)]
pub struct LocationTypeParseError(pub String);

impl fmt::Display for LocationTypeParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid location type: {:?}", self.0)
    }
}

impl std::error::Error for LocationTypeParseError {}

// ---------------------------------------------------------------------------
// Row structs
// ---------------------------------------------------------------------------

/// A physical location: a room, a garden, a greenhouse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Area {
    pub id: i64,
    pub name: String,
    pub location_type: LocationType,
    pub is_covered: bool,
    pub is_greenhouse: bool,
    pub brightness: String,
}

/// A bounded planting grid inside an area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Plot {
    pub id: i64,
    pub name: String,
    pub area_id: i64,
    pub plot_type: String,
    pub width: i32,
    pub length: i32,
    pub soil_type: Option<String>,
    pub drainage_level: Option<String>,
    pub ph: Option<f64>,
}

impl Plot {
    /// Whether `(x, y)` names a cell of this plot's `width` x `length` grid.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        (0..self.width).contains(&x) && (0..self.length).contains(&y)
    }
}

/// Catalog entry describing a species.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PlantType {
    pub id: i64,
    pub common_name: String,
    pub latin_name: Option<String>,
    pub light_requirements: Option<String>,
    pub water_requirements: Option<String>,
    pub soil_requirements: Option<String>,
    pub image_url: Option<String>,
    pub is_edible: bool,
}

/// An individual specimen, optionally anchored to a plot cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Plant {
    pub id: i64,
    pub name: String,
    pub species_id: i64,
    pub area_id: i64,
    pub plot_id: Option<i64>,
    pub position_x: Option<i32>,
    pub position_y: Option<i32>,
    pub planted_date: NaiveDate,
    pub health_status: String,
    pub notes: Option<String>,
    pub watering_schedule: String,
}

impl Plant {
    /// A plant with no plot assignment (and therefore no position).
    pub fn is_free_standing(&self) -> bool {
        self.plot_id.is_none()
    }

    /// The occupied cell, when both coordinates are set.
    pub fn position(&self) -> Option<(i32, i32)> {
        self.position_x.zip(self.position_y)
    }
}

/// Default health status assigned to new plants.
pub const DEFAULT_HEALTH_STATUS: &str = "healthy";

/// Default watering schedule assigned to new plants.
pub const DEFAULT_WATERING_SCHEDULE: &str = "weekly";

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
