//! Room Model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Seating location type (包厢 / 露台)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationType {
    /// Enclosed private room
    #[default]
    Private,
    /// Outdoor table or terrace
    Outdoor,
}

impl LocationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::Outdoor => "outdoor",
        }
    }
}

impl fmt::Display for LocationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LocationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "private" => Ok(Self::Private),
            "outdoor" => Ok(Self::Outdoor),
            other => Err(format!("Unknown location type: {}", other)),
        }
    }
}

/// Operational status of a room, independent of any particular date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    #[default]
    Available,
    Maintenance,
    Closed,
}

/// Room entity as returned by the rooms API
///
/// `booked_for_date` is computed by the server for the date/time passed to
/// the query and is distinct from the general `status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub room_type: LocationType,
    pub capacity: u32,
    #[serde(default)]
    pub has_audio: bool,
    #[serde(default)]
    pub has_projector: bool,
    #[serde(default)]
    pub has_heating: bool,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: RoomStatus,
    #[serde(default)]
    pub booked_for_date: bool,
    /// Surcharge in cents
    #[serde(default)]
    pub surcharge: i64,
}
