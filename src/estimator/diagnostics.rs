use serde::{Deserialize, Serialize};

use super::inputs::{CoefficientSet, InputSnapshot, InputSource, OutdoorSource, RainSource};
use super::radiation::{RadiationEstimate, RadiationSource};
use super::thermal::ThermalBalance;
use crate::domain::{ms_to_kmh, round_to, Orientation, RoomProfile};

/// Every intermediate quantity of one MRT update, published next to the value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MrtDiagnostics {
    pub profile: RoomProfile,
    pub orientation: Orientation,
    pub t_air: f64,
    pub t_out_eff: f64,
    pub t_out_eff_source: OutdoorSource,
    pub factor_f_out: f64,
    pub factor_f_win: f64,
    pub factor_k_loss: f64,
    pub factor_k_solar: f64,
    pub thermal_alpha: f64,
    pub wind_ms: f64,
    pub wind_kmh: f64,
    pub wind_source: InputSource,
    pub cloud_coverage: f64,
    pub cloud_source: InputSource,
    pub uv_index: f64,
    pub uv_source: InputSource,
    pub rain_multiplier: f64,
    pub rain_source: RainSource,
    pub daylight_factor: f64,
    pub radiation: f64,
    pub radiation_source: RadiationSource,
    /// Sensor reading above the plausibility limit, published uncapped
    pub radiation_implausible: bool,
    pub loss_term: f64,
    pub solar_term: f64,
    pub mrt_unclamped: f64,
    pub mrt_clamped: f64,
}

impl MrtDiagnostics {
    pub fn assemble(
        orientation: Orientation,
        snapshot: &InputSnapshot,
        coefficients: &CoefficientSet,
        radiation: &RadiationEstimate,
        balance: &ThermalBalance,
    ) -> Self {
        Self {
            profile: snapshot.active_profile,
            orientation,
            t_air: snapshot.t_air,
            t_out_eff: round_to(snapshot.t_out_eff, 2),
            t_out_eff_source: snapshot.t_out_eff_source,
            factor_f_out: coefficients.f_out,
            factor_f_win: coefficients.f_win,
            factor_k_loss: coefficients.k_loss,
            factor_k_solar: coefficients.k_solar,
            thermal_alpha: coefficients.alpha,
            wind_ms: round_to(snapshot.wind_ms, 2),
            wind_kmh: round_to(ms_to_kmh(snapshot.wind_ms), 2),
            wind_source: snapshot.wind_source,
            cloud_coverage: snapshot.cloud_coverage,
            cloud_source: snapshot.cloud_source,
            uv_index: snapshot.uv_index,
            uv_source: snapshot.uv_source,
            rain_multiplier: snapshot.rain_multiplier,
            rain_source: snapshot.rain_source,
            daylight_factor: round_to(snapshot.daylight_factor, 3),
            radiation: round_to(radiation.value_w_m2, 1),
            radiation_source: radiation.source,
            radiation_implausible: radiation.implausible,
            loss_term: round_to(balance.loss_term, 3),
            solar_term: round_to(balance.solar_term, 3),
            mrt_unclamped: round_to(balance.unclamped, 2),
            mrt_clamped: round_to(balance.clamped, 2),
        }
    }

    /// Flattened attribute map, as stored on the output entities
    pub fn to_attributes(&self) -> serde_json::Map<String, serde_json::Value> {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => map,
            _ => serde_json::Map::new(),
        }
    }
}
