use crate::domain::{round_to, RoomConfig};
use crate::host::{Attributes, StateReader};

/// `(air + mrt) / 2`, rounded to 2 decimals
pub fn operative_temperature(t_air: f64, t_mrt: f64) -> f64 {
    round_to((t_air + t_mrt) / 2.0, 2)
}

#[derive(Debug, Clone, PartialEq)]
pub struct OperativeReading {
    pub value: f64,
    /// Copy of the MRT output's diagnostics
    pub diagnostics: Attributes,
}

/// Averages the published MRT with the current air temperature.
///
/// Both values are read from the state view, so the aggregator reacts to the
/// MRT output the same way it reacts to the air sensor.
#[derive(Debug, Clone)]
pub struct OperativeAggregator {
    air_entity: String,
    mrt_entity: String,
}

impl OperativeAggregator {
    pub fn new(air_entity: impl Into<String>, mrt_entity: impl Into<String>) -> Self {
        Self {
            air_entity: air_entity.into(),
            mrt_entity: mrt_entity.into(),
        }
    }

    pub fn for_room(room: &RoomConfig) -> Self {
        Self::new(room.air_temp_source.clone(), room.mrt_entity_id())
    }

    /// Entities whose changes should retrigger the aggregate
    pub fn watches(&self, entity_id: &str) -> bool {
        entity_id == self.air_entity || entity_id == self.mrt_entity
    }

    /// None while either input is unresolved
    pub fn aggregate<S: StateReader>(&self, states: &S) -> Option<OperativeReading> {
        let t_air = states.state(&self.air_entity)?.numeric_state()?;
        let mrt = states.state(&self.mrt_entity)?;
        let t_mrt = mrt.numeric_state()?;

        Some(OperativeReading {
            value: operative_temperature(t_air, t_mrt),
            diagnostics: mrt.attributes,
        })
    }
}
