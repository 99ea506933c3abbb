use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{Orientation, RoomProfile};

pub const DEFAULT_SUN_ENTITY: &str = "sun.sun";

fn default_sun_entity() -> String {
    DEFAULT_SUN_ENTITY.to_string()
}

/// Static configuration of one room instance
///
/// Profile and orientation are closed enums, so a room can never reference an
/// identifier missing from the profile or orientation tables.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RoomConfig {
    /// Stable identifier, used to derive control and output entity ids
    #[validate(length(min = 1, max = 64))]
    pub id: String,
    #[validate(length(min = 1))]
    pub name: String,
    pub profile: RoomProfile,
    pub orientation: Orientation,
    #[validate(length(min = 1))]
    pub air_temp_source: String,
    #[validate(length(min = 1))]
    pub weather_entity: String,
    #[serde(default)]
    pub solar_sensor: Option<String>,
    #[serde(default = "default_sun_entity")]
    #[validate(length(min = 1))]
    pub sun_entity: String,
    /// Initial value of the smoothing alpha control
    #[serde(default)]
    #[validate(range(min = 0.0, max = 1.0))]
    pub thermal_alpha: Option<f64>,
}

impl RoomConfig {
    pub fn new(
        id: impl Into<String>,
        profile: RoomProfile,
        orientation: Orientation,
        air_temp_source: impl Into<String>,
        weather_entity: impl Into<String>,
    ) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            profile,
            orientation,
            air_temp_source: air_temp_source.into(),
            weather_entity: weather_entity.into(),
            solar_sensor: None,
            sun_entity: default_sun_entity(),
            thermal_alpha: None,
        }
    }

    pub fn with_solar_sensor(mut self, entity_id: impl Into<String>) -> Self {
        self.solar_sensor = Some(entity_id.into());
        self
    }

    /// Room ids end up inside entity ids, so only `[a-z0-9_]` is allowed
    pub fn has_valid_id(&self) -> bool {
        !self.id.is_empty()
            && self
                .id
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    }

    /// Unique id of a control owned by this room, e.g. `living_room_f_out`
    pub fn control_unique_id(&self, suffix: &str) -> String {
        format!("{}_{}", self.id, suffix)
    }

    /// Entity that receives the published MRT value
    pub fn mrt_entity_id(&self) -> String {
        format!("sensor.{}_mrt", self.id)
    }

    /// Entity that receives the published operative temperature
    pub fn operative_entity_id(&self) -> String {
        format!("sensor.{}_operative_temperature", self.id)
    }
}
