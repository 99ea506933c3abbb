//! Input resolution
//!
//! Reads every reference a room depends on from the current state view and
//! turns it into an [`InputSnapshot`] plus the active [`CoefficientSet`].
//! Air and outdoor temperature are required; everything else falls back to a
//! documented default and records where its value came from.

use serde::{Deserialize, Serialize};
use strum::Display;
use thiserror::Error;

use crate::controls::{profile_select_unique_id, NumberControl, DEFAULT_ALPHA};
use crate::domain::{kmh_to_ms, RoomConfig, RoomProfile};
use crate::host::{ControlRegistry, EntityState, Platform, StateReader};

pub const FALLBACK_CLOUD_COVERAGE: f64 = 50.0;
pub const FALLBACK_UV_INDEX: f64 = 0.0;
pub const FALLBACK_WIND_SPEED_MS: f64 = 0.0;
pub const FALLBACK_SUN_ELEVATION_DEG: f64 = 0.0;

/// Multiplier applied to the heuristic irradiance while it rains or snows
pub const RAIN_MULTIPLIER: f64 = 0.4;
const PRECIPITATION_KEYWORDS: [&str; 4] = ["rain", "pour", "snow", "hail"];

/// Where the effective outdoor temperature came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OutdoorSource {
    Temperature,
    ApparentTemperature,
}

/// Whether an optional weather attribute was read or defaulted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum InputSource {
    WeatherEntity,
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RainSource {
    ConditionString,
    Dry,
}

/// Why an update produced no value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SuspendReason {
    #[error("air temperature unresolved")]
    AirTemperatureUnresolved,
    #[error("outdoor temperature unresolved")]
    OutdoorTemperatureUnresolved,
}

/// Coefficients in effect for one update
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoefficientSet {
    pub f_out: f64,
    pub f_win: f64,
    pub k_loss: f64,
    pub k_solar: f64,
    pub alpha: f64,
}

impl CoefficientSet {
    /// Profile defaults with the default smoothing alpha
    pub fn defaults(profile: RoomProfile) -> Self {
        let c = profile.coefficients();
        Self {
            f_out: c.f_out,
            f_win: c.f_win,
            k_loss: c.k_loss,
            k_solar: c.k_solar,
            alpha: DEFAULT_ALPHA,
        }
    }
}

/// Lazily located override controls.
///
/// A handle is looked up on demand and cached once found; it is never
/// forgotten afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControlHandles {
    pub f_out: Option<String>,
    pub f_win: Option<String>,
    pub k_loss: Option<String>,
    pub k_solar: Option<String>,
    pub thermal_alpha: Option<String>,
    pub profile_select: Option<String>,
}

impl ControlHandles {
    fn slot(&mut self, control: NumberControl) -> &mut Option<String> {
        match control {
            NumberControl::FOut => &mut self.f_out,
            NumberControl::FWin => &mut self.f_win,
            NumberControl::KLoss => &mut self.k_loss,
            NumberControl::KSolar => &mut self.k_solar,
            NumberControl::ThermalAlpha => &mut self.thermal_alpha,
        }
    }

    pub fn get(&self, control: NumberControl) -> Option<&str> {
        match control {
            NumberControl::FOut => self.f_out.as_deref(),
            NumberControl::FWin => self.f_win.as_deref(),
            NumberControl::KLoss => self.k_loss.as_deref(),
            NumberControl::KSolar => self.k_solar.as_deref(),
            NumberControl::ThermalAlpha => self.thermal_alpha.as_deref(),
        }
    }

    /// Look up whatever is still missing. Returns true if anything new was found.
    pub fn locate(&mut self, registry: &ControlRegistry, room: &RoomConfig) -> bool {
        let mut found = false;
        for control in [
            NumberControl::FOut,
            NumberControl::FWin,
            NumberControl::KLoss,
            NumberControl::KSolar,
            NumberControl::ThermalAlpha,
        ] {
            let slot = self.slot(control);
            if slot.is_none() {
                *slot = registry.entity_id(Platform::Number, &control.unique_id(room));
                found |= slot.is_some();
            }
        }
        if self.profile_select.is_none() {
            self.profile_select =
                registry.entity_id(Platform::Select, &profile_select_unique_id(room));
            found |= self.profile_select.is_some();
        }
        found
    }

    /// The coefficient numbers and the profile select are required; the
    /// alpha control is optional.
    pub fn is_ready(&self) -> bool {
        self.f_out.is_some()
            && self.f_win.is_some()
            && self.k_loss.is_some()
            && self.k_solar.is_some()
            && self.profile_select.is_some()
    }

    /// Entity ids of every located control
    pub fn entity_ids(&self) -> impl Iterator<Item = &str> {
        [
            &self.f_out,
            &self.f_win,
            &self.k_loss,
            &self.k_solar,
            &self.thermal_alpha,
            &self.profile_select,
        ]
        .into_iter()
        .filter_map(|h| h.as_deref())
    }
}

/// Everything read from the outside world for one update
#[derive(Debug, Clone, PartialEq)]
pub struct InputSnapshot {
    /// Profile named by the select override, or the configured one
    pub active_profile: RoomProfile,
    pub t_air: f64,
    pub t_out: f64,
    pub t_apparent: Option<f64>,
    pub t_out_eff: f64,
    pub t_out_eff_source: OutdoorSource,
    pub wind_ms: f64,
    pub wind_source: InputSource,
    pub cloud_coverage: f64,
    pub cloud_source: InputSource,
    pub uv_index: f64,
    pub uv_source: InputSource,
    pub condition: String,
    pub rain_multiplier: f64,
    pub rain_source: RainSource,
    pub sun_elevation: f64,
    pub daylight_factor: f64,
    /// Direct irradiance reading, W/m²
    pub solar_irradiance: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedInputs {
    pub snapshot: InputSnapshot,
    pub coefficients: CoefficientSet,
}

/// Lower of outdoor and apparent temperature
pub fn effective_outdoor(t_out: f64, t_apparent: Option<f64>) -> (f64, OutdoorSource) {
    match t_apparent {
        Some(app) if app < t_out => (app, OutdoorSource::ApparentTemperature),
        _ => (t_out, OutdoorSource::Temperature),
    }
}

/// Rain multiplier from a weather condition string
pub fn rain_multiplier(condition: &str) -> (f64, RainSource) {
    let condition = condition.to_lowercase();
    if PRECIPITATION_KEYWORDS.iter().any(|k| condition.contains(k)) {
        (RAIN_MULTIPLIER, RainSource::ConditionString)
    } else {
        (1.0, RainSource::Dry)
    }
}

/// Normalized sun elevation: 0 at -6° (civil dusk), 1 from 60° up
pub fn daylight_factor(elevation_deg: f64) -> f64 {
    ((elevation_deg + 6.0) / 66.0).clamp(0.0, 1.0)
}

/// Wind speed in m/s; only an explicit `km/h` unit is converted
pub fn wind_speed_ms(raw: f64, unit: Option<&str>) -> f64 {
    match unit {
        Some("km/h") => kmh_to_ms(raw),
        _ => raw,
    }
}

fn available<S: StateReader>(states: &S, entity_id: &str) -> Option<EntityState> {
    states.state(entity_id).filter(EntityState::is_available)
}

fn read_override<S: StateReader>(states: &S, handle: Option<&str>, default: f64) -> f64 {
    handle
        .and_then(|id| states.state(id))
        .and_then(|s| s.numeric_state())
        .unwrap_or(default)
}

fn optional_attribute(weather: &EntityState, key: &str, fallback: f64) -> (f64, InputSource) {
    match weather.numeric_attribute(key) {
        Some(v) => (v, InputSource::WeatherEntity),
        None => (fallback, InputSource::Fallback),
    }
}

/// Resolve one update's inputs and coefficients.
pub fn resolve_inputs<S: StateReader>(
    room: &RoomConfig,
    handles: &ControlHandles,
    states: &S,
) -> Result<ResolvedInputs, SuspendReason> {
    let active_profile = handles
        .profile_select
        .as_deref()
        .and_then(|id| available(states, id))
        .and_then(|s| s.state.parse::<RoomProfile>().ok())
        .unwrap_or(room.profile);

    let t_air = states
        .state(&room.air_temp_source)
        .and_then(|s| s.numeric_state())
        .ok_or(SuspendReason::AirTemperatureUnresolved)?;

    let weather = available(states, &room.weather_entity)
        .ok_or(SuspendReason::OutdoorTemperatureUnresolved)?;
    let t_out = weather
        .numeric_attribute("temperature")
        .ok_or(SuspendReason::OutdoorTemperatureUnresolved)?;
    let t_apparent = weather.numeric_attribute("apparent_temperature");
    let (t_out_eff, t_out_eff_source) = effective_outdoor(t_out, t_apparent);

    // Defaults always come from the configured profile, not the selected one.
    let defaults = CoefficientSet::defaults(room.profile);
    let coefficients = CoefficientSet {
        f_out: read_override(states, handles.get(NumberControl::FOut), defaults.f_out),
        f_win: read_override(states, handles.get(NumberControl::FWin), defaults.f_win),
        k_loss: read_override(states, handles.get(NumberControl::KLoss), defaults.k_loss),
        k_solar: read_override(states, handles.get(NumberControl::KSolar), defaults.k_solar),
        alpha: read_override(states, handles.get(NumberControl::ThermalAlpha), defaults.alpha),
    };

    let (wind_ms, wind_source) = match weather.numeric_attribute("wind_speed") {
        Some(raw) => (
            wind_speed_ms(raw, weather.str_attribute("wind_speed_unit")),
            InputSource::WeatherEntity,
        ),
        None => (FALLBACK_WIND_SPEED_MS, InputSource::Fallback),
    };

    let (cloud_coverage, cloud_source) =
        optional_attribute(&weather, "cloud_coverage", FALLBACK_CLOUD_COVERAGE);
    let (uv_index, uv_source) = optional_attribute(&weather, "uv_index", FALLBACK_UV_INDEX);

    let condition = weather.state.to_lowercase();
    let (rain_multiplier, rain_source) = rain_multiplier(&condition);

    let sun_elevation = states
        .state(&room.sun_entity)
        .and_then(|s| s.numeric_attribute("elevation"))
        .unwrap_or(FALLBACK_SUN_ELEVATION_DEG);

    let solar_irradiance = room
        .solar_sensor
        .as_deref()
        .and_then(|id| states.state(id))
        .and_then(|s| s.numeric_state());

    Ok(ResolvedInputs {
        snapshot: InputSnapshot {
            active_profile,
            t_air,
            t_out,
            t_apparent,
            t_out_eff,
            t_out_eff_source,
            wind_ms,
            wind_source,
            cloud_coverage,
            cloud_source,
            uv_index,
            uv_source,
            condition,
            rain_multiplier,
            rain_source,
            sun_elevation,
            daylight_factor: daylight_factor(sun_elevation),
            solar_irradiance,
        },
        coefficients,
    })
}
