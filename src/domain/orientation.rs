use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Compass orientation of a room's main window wall
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
pub enum Orientation {
    #[serde(rename = "N")]
    #[strum(serialize = "N")]
    North,
    #[serde(rename = "NE")]
    #[strum(serialize = "NE")]
    NorthEast,
    #[serde(rename = "E")]
    #[strum(serialize = "E")]
    East,
    #[serde(rename = "SE")]
    #[strum(serialize = "SE")]
    SouthEast,
    #[serde(rename = "S")]
    #[strum(serialize = "S")]
    South,
    #[serde(rename = "SW")]
    #[strum(serialize = "SW")]
    SouthWest,
    #[serde(rename = "W")]
    #[strum(serialize = "W")]
    West,
    #[serde(rename = "NW")]
    #[strum(serialize = "NW")]
    NorthWest,
}

impl Orientation {
    /// Relative solar exposure versus true south, in [0, 1]
    pub const fn south_factor(self) -> f64 {
        match self {
            Orientation::North => 0.2,
            Orientation::NorthEast | Orientation::NorthWest => 0.4,
            Orientation::East | Orientation::West => 0.6,
            Orientation::SouthEast | Orientation::SouthWest => 0.8,
            Orientation::South => 1.0,
        }
    }
}
