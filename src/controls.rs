//! Per-room override controls
//!
//! Each room owns five number controls (the four profile coefficients and the
//! smoothing alpha) and one select control naming the active profile. They are
//! registered in the [`ControlRegistry`] and seeded into the [`StateStore`]
//! with profile defaults; the estimator reads them fresh on every update.

use serde_json::{json, Value};
use std::ops::RangeInclusive;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};
use thiserror::Error;
use tracing::{debug, info};

use crate::domain::{RoomConfig, RoomProfile};
use crate::host::{Attributes, ControlRegistry, Platform, StateStore};

/// Smoothing alpha used when no override is available
pub const DEFAULT_ALPHA: f64 = 0.3;

/// Unique id suffix of the profile select control
pub const PROFILE_SELECT_SUFFIX: &str = "profile";

#[derive(Debug, Error, PartialEq)]
pub enum ControlError {
    #[error("Unknown control: {0}")]
    UnknownControl(String),
    #[error("Control {0} is not registered")]
    NotRegistered(String),
    #[error("Value {value} for {control} outside [{min}, {max}]")]
    OutOfRange {
        control: NumberControl,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("Unknown profile: {0}")]
    UnknownProfile(String),
}

/// Numeric override controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
pub enum NumberControl {
    #[strum(serialize = "f_out")]
    FOut,
    #[strum(serialize = "f_win")]
    FWin,
    #[strum(serialize = "k_loss")]
    KLoss,
    #[strum(serialize = "k_solar")]
    KSolar,
    #[strum(serialize = "thermal_alpha")]
    ThermalAlpha,
}

impl NumberControl {
    /// The four coefficient controls, excluding alpha
    pub const COEFFICIENTS: [NumberControl; 4] = [
        NumberControl::FOut,
        NumberControl::FWin,
        NumberControl::KLoss,
        NumberControl::KSolar,
    ];

    pub fn range(self) -> RangeInclusive<f64> {
        match self {
            NumberControl::KSolar => 0.0..=3.0,
            _ => 0.0..=1.0,
        }
    }

    pub fn step(self) -> f64 {
        0.01
    }

    /// Value the control is seeded with for a room
    pub fn default_value(self, profile: RoomProfile, alpha: Option<f64>) -> f64 {
        let c = profile.coefficients();
        match self {
            NumberControl::FOut => c.f_out,
            NumberControl::FWin => c.f_win,
            NumberControl::KLoss => c.k_loss,
            NumberControl::KSolar => c.k_solar,
            NumberControl::ThermalAlpha => alpha.unwrap_or(DEFAULT_ALPHA),
        }
    }

    pub fn unique_id(self, room: &RoomConfig) -> String {
        room.control_unique_id(&self.to_string())
    }

    fn attributes(self) -> Attributes {
        let range = self.range();
        let mut attrs = Attributes::new();
        attrs.insert("min".into(), json!(range.start()));
        attrs.insert("max".into(), json!(range.end()));
        attrs.insert("step".into(), json!(self.step()));
        attrs
    }
}

pub fn profile_select_unique_id(room: &RoomConfig) -> String {
    room.control_unique_id(PROFILE_SELECT_SUFFIX)
}

fn select_attributes() -> Attributes {
    let labels: serde_json::Map<String, Value> = RoomProfile::iter()
        .map(|p| (p.to_string(), Value::from(p.label())))
        .collect();

    let mut attrs = Attributes::new();
    attrs.insert(
        "options".into(),
        Value::from(RoomProfile::identifiers()),
    );
    attrs.insert("option_labels".into(), Value::Object(labels));
    attrs
}

/// Register all controls of a room and seed their states.
///
/// Existing states are kept, so re-registering never clobbers user overrides.
pub fn register_room_controls(store: &StateStore, registry: &ControlRegistry, room: &RoomConfig) {
    for control in NumberControl::iter() {
        let entity_id = registry.register(Platform::Number, &control.unique_id(room));
        let value = control.default_value(room.profile, room.thermal_alpha);
        store.set_if_absent(entity_id, value.to_string(), control.attributes());
    }

    let entity_id = registry.register(Platform::Select, &profile_select_unique_id(room));
    store.set_if_absent(entity_id, room.profile.to_string(), select_attributes());

    info!(room = %room.id, "override controls registered");
}

/// Write a numeric override after range checking
pub fn set_number(
    store: &StateStore,
    registry: &ControlRegistry,
    room: &RoomConfig,
    control: NumberControl,
    value: f64,
) -> Result<(), ControlError> {
    let range = control.range();
    if !value.is_finite() || !range.contains(&value) {
        return Err(ControlError::OutOfRange {
            control,
            value,
            min: *range.start(),
            max: *range.end(),
        });
    }

    let unique_id = control.unique_id(room);
    let entity_id = registry
        .entity_id(Platform::Number, &unique_id)
        .ok_or(ControlError::NotRegistered(unique_id))?;
    store.set(entity_id, value.to_string(), control.attributes());
    debug!(room = %room.id, %control, value, "override updated");
    Ok(())
}

/// Select a profile and load its coefficients into the number controls.
///
/// The estimator still takes its fallback defaults from the room's configured
/// profile; only the number controls follow the selection.
///
/// Each coefficient and the select are separate state writes, so the room
/// task recomputes once per changed control and its smoothing filter takes
/// up to five samples for a single selection.
pub fn select_profile(
    store: &StateStore,
    registry: &ControlRegistry,
    room: &RoomConfig,
    option: &str,
) -> Result<RoomProfile, ControlError> {
    let profile: RoomProfile = option
        .parse()
        .map_err(|_| ControlError::UnknownProfile(option.to_string()))?;

    let unique_id = profile_select_unique_id(room);
    let entity_id = registry
        .entity_id(Platform::Select, &unique_id)
        .ok_or(ControlError::NotRegistered(unique_id))?;

    for control in NumberControl::COEFFICIENTS {
        set_number(store, registry, room, control, control.default_value(profile, None))?;
    }
    store.set(entity_id, profile.to_string(), select_attributes());
    info!(room = %room.id, %profile, "profile selected");
    Ok(profile)
}
