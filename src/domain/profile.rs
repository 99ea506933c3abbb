//! Room thermal profiles
//!
//! A profile is a named set of default physical coefficients describing how
//! exposed a room is: exterior wall fraction, window fraction, conductive loss
//! and solar gain. The table is static and shared read-only by all rooms.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

/// Default coefficients supplied by a profile
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfileCoefficients {
    /// Exterior wall fraction
    pub f_out: f64,
    /// Window fraction
    pub f_win: f64,
    /// Conductive loss coefficient
    pub k_loss: f64,
    /// Solar gain coefficient
    pub k_solar: f64,
}

impl ProfileCoefficients {
    const fn new(f_out: f64, f_win: f64, k_loss: f64, k_solar: f64) -> Self {
        Self {
            f_out,
            f_win,
            k_loss,
            k_solar,
        }
    }
}

/// Room exposure profile
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RoomProfile {
    OneWallLargeWindow,
    TwoWallLargeWindow,
    Attic,
    TopfloorVertSmallWindow,
    TopfloorVertMediumWindow,
    TopfloorTwoWallsCavity,
    TopfloorColdAdjacent,
    TwoWallSmallWindow,
    OneWallSmallWindow,
    Basement,
    OneWallColdAdjacent,
    CornerColdAdjacent,
    Interior,
    InteriorColdAdjacent,
}

impl RoomProfile {
    /// Coefficients `(f_out, f_win, k_loss, k_solar)` for this profile
    pub const fn coefficients(self) -> ProfileCoefficients {
        match self {
            RoomProfile::OneWallLargeWindow => ProfileCoefficients::new(0.5, 0.40, 0.14, 1.20),
            RoomProfile::TwoWallLargeWindow => ProfileCoefficients::new(0.8, 0.50, 0.16, 1.40),
            RoomProfile::Attic => ProfileCoefficients::new(0.9, 0.40, 0.20, 1.50),
            RoomProfile::TopfloorVertSmallWindow => ProfileCoefficients::new(0.9, 0.15, 0.23, 0.75),
            RoomProfile::TopfloorVertMediumWindow => {
                ProfileCoefficients::new(0.9, 0.30, 0.22, 1.00)
            }
            RoomProfile::TopfloorTwoWallsCavity => ProfileCoefficients::new(0.95, 0.25, 0.24, 0.95),
            RoomProfile::TopfloorColdAdjacent => ProfileCoefficients::new(0.95, 0.35, 0.23, 1.15),
            RoomProfile::TwoWallSmallWindow => ProfileCoefficients::new(0.7, 0.30, 0.16, 1.00),
            RoomProfile::OneWallSmallWindow => ProfileCoefficients::new(0.5, 0.20, 0.12, 0.80),
            RoomProfile::Basement => ProfileCoefficients::new(0.4, 0.20, 0.10, 0.60),
            RoomProfile::OneWallColdAdjacent => ProfileCoefficients::new(0.6, 0.30, 0.18, 0.80),
            RoomProfile::CornerColdAdjacent => ProfileCoefficients::new(0.8, 0.40, 0.20, 1.00),
            RoomProfile::Interior => ProfileCoefficients::new(0.0, 0.00, 0.08, 0.40),
            RoomProfile::InteriorColdAdjacent => ProfileCoefficients::new(0.3, 0.00, 0.12, 0.40),
        }
    }

    /// Human readable label
    pub const fn label(self) -> &'static str {
        match self {
            RoomProfile::OneWallLargeWindow => "1 ext wall, large window",
            RoomProfile::TwoWallLargeWindow => "2 ext walls, large window",
            RoomProfile::Attic => "Top floor (tilted/high gain)",
            RoomProfile::TopfloorVertSmallWindow => "Top floor (vert/small win)",
            RoomProfile::TopfloorVertMediumWindow => "Top floor (vert/med win)",
            RoomProfile::TopfloorTwoWallsCavity => "Top floor (2 walls/cavity)",
            RoomProfile::TopfloorColdAdjacent => "Top floor (cold adjacent)",
            RoomProfile::TwoWallSmallWindow => "2 ext walls, small window",
            RoomProfile::OneWallSmallWindow => "1 ext wall, small window",
            RoomProfile::Basement => "Basement / semi-basement",
            RoomProfile::OneWallColdAdjacent => "1 ext wall, cold adjacent",
            RoomProfile::CornerColdAdjacent => "Corner room, cold adjacent",
            RoomProfile::Interior => "Interior room",
            RoomProfile::InteriorColdAdjacent => "Interior, cold adjacent",
        }
    }

    /// Identifiers of every known profile, in table order
    pub fn identifiers() -> Vec<&'static str> {
        RoomProfile::iter().map(|p| p.into()).collect()
    }
}
