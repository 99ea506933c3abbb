//! Radiant balance of a room
//!
//! MRT = T_air - loss + solar, where
//! - loss  = k_loss * (T_air - T_out_eff) * (f_out + 1.5 * f_win) * (1 + 0.02 * wind)
//! - solar = k_solar * (G / 400) * south_factor * f_win
//!
//! The raw estimate is then held inside dynamic bounds derived from the
//! current air and effective outdoor temperature.

use serde::{Deserialize, Serialize};

use super::inputs::{CoefficientSet, InputSnapshot};

const WINDOW_LOSS_WEIGHT: f64 = 1.5;
const WIND_LOSS_PER_MS: f64 = 0.02;
const SOLAR_REFERENCE_W_M2: f64 = 400.0;

const BOUND_ABOVE_OUTDOOR: f64 = 2.0;
const BOUND_BELOW_AIR: f64 = 3.0;
const BOUND_ABOVE_AIR: f64 = 4.0;

/// Conductive/convective loss pulling MRT towards the outdoor temperature
pub fn loss_term(
    k_loss: f64,
    t_air: f64,
    t_out_eff: f64,
    f_out: f64,
    f_win: f64,
    wind_ms: f64,
) -> f64 {
    k_loss
        * (t_air - t_out_eff)
        * (f_out + WINDOW_LOSS_WEIGHT * f_win)
        * (1.0 + WIND_LOSS_PER_MS * wind_ms)
}

/// Solar gain through the windows
pub fn solar_term(k_solar: f64, radiation_w_m2: f64, south_factor: f64, f_win: f64) -> f64 {
    k_solar * (radiation_w_m2 / SOLAR_REFERENCE_W_M2) * south_factor * f_win
}

/// Plausible MRT interval for the current conditions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClampBounds {
    pub lower: f64,
    pub upper: f64,
}

impl ClampBounds {
    pub fn dynamic(t_air: f64, t_out_eff: f64) -> Self {
        Self {
            lower: (t_out_eff + BOUND_ABOVE_OUTDOOR).max(t_air - BOUND_BELOW_AIR),
            upper: t_air + BOUND_ABOVE_AIR,
        }
    }

    /// Clamp into `[lower, upper]`. When outdoors is so warm that the bounds
    /// cross, the lower bound wins.
    pub fn apply(&self, value: f64) -> f64 {
        value.min(self.upper).max(self.lower)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThermalBalance {
    pub loss_term: f64,
    pub solar_term: f64,
    pub unclamped: f64,
    pub bounds: ClampBounds,
    pub clamped: f64,
}

impl ThermalBalance {
    pub fn compute(
        snapshot: &InputSnapshot,
        coefficients: &CoefficientSet,
        radiation_w_m2: f64,
        south_factor: f64,
    ) -> Self {
        let loss = loss_term(
            coefficients.k_loss,
            snapshot.t_air,
            snapshot.t_out_eff,
            coefficients.f_out,
            coefficients.f_win,
            snapshot.wind_ms,
        );
        let solar = solar_term(
            coefficients.k_solar,
            radiation_w_m2,
            south_factor,
            coefficients.f_win,
        );
        let unclamped = snapshot.t_air - loss + solar;
        let bounds = ClampBounds::dynamic(snapshot.t_air, snapshot.t_out_eff);

        Self {
            loss_term: loss,
            solar_term: solar,
            unclamped,
            bounds,
            clamped: bounds.apply(unclamped),
        }
    }
}
