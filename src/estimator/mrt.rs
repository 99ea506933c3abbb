use tracing::debug;

use super::diagnostics::MrtDiagnostics;
use super::inputs::{resolve_inputs, ControlHandles, ResolvedInputs, SuspendReason};
use super::radiation::estimate_radiation;
use super::smoothing::EstimatorState;
use super::thermal::ThermalBalance;
use crate::domain::{round_to, RoomConfig};
use crate::host::{ControlRegistry, StateReader};

/// A published MRT value with its diagnostics
#[derive(Debug, Clone, PartialEq)]
pub struct MrtReading {
    /// Smoothed MRT, °C, rounded to 2 decimals
    pub value: f64,
    pub diagnostics: MrtDiagnostics,
}

/// Result of one MRT update
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    Published(MrtReading),
    /// A required input is unresolved; the previous value stays
    Suspended(SuspendReason),
    /// Override controls are not registered yet; retried on the next trigger
    Deferred,
}

impl UpdateOutcome {
    pub fn reading(&self) -> Option<&MrtReading> {
        match self {
            UpdateOutcome::Published(reading) => Some(reading),
            _ => None,
        }
    }
}

/// MRT pipeline for one room: resolve, estimate radiation, balance, clamp, smooth.
///
/// The filter memory lives in an [`EstimatorState`] owned by the caller and
/// passed into every update.
#[derive(Debug, Clone)]
pub struct MrtEstimator {
    room: RoomConfig,
    handles: ControlHandles,
}

impl MrtEstimator {
    pub fn new(room: RoomConfig) -> Self {
        Self {
            room,
            handles: ControlHandles::default(),
        }
    }

    pub fn room(&self) -> &RoomConfig {
        &self.room
    }

    pub fn handles(&self) -> &ControlHandles {
        &self.handles
    }

    pub fn update<S: StateReader>(
        &mut self,
        registry: &ControlRegistry,
        states: &S,
        state: &mut EstimatorState,
    ) -> UpdateOutcome {
        self.handles.locate(registry, &self.room);
        if !self.handles.is_ready() {
            debug!(room = %self.room.id, "override controls not registered yet, deferring update");
            return UpdateOutcome::Deferred;
        }

        match resolve_inputs(&self.room, &self.handles, states) {
            Ok(inputs) => UpdateOutcome::Published(self.estimate(&inputs, state)),
            Err(reason) => {
                debug!(room = %self.room.id, %reason, "update suspended");
                UpdateOutcome::Suspended(reason)
            }
        }
    }

    /// Run the model on already resolved inputs and advance the filter
    pub fn estimate(&self, inputs: &ResolvedInputs, state: &mut EstimatorState) -> MrtReading {
        let ResolvedInputs {
            snapshot,
            coefficients,
        } = inputs;

        let radiation = estimate_radiation(snapshot);
        let balance = ThermalBalance::compute(
            snapshot,
            coefficients,
            radiation.effective_w_m2(),
            self.room.orientation.south_factor(),
        );
        let smoothed = state.smooth(balance.clamped, coefficients.alpha);

        debug!(
            room = %self.room.id,
            mrt_clamped = balance.clamped,
            mrt = smoothed,
            radiation_w_m2 = radiation.value_w_m2,
            "mrt updated"
        );

        MrtReading {
            value: round_to(smoothed, 2),
            diagnostics: MrtDiagnostics::assemble(
                self.room.orientation,
                snapshot,
                coefficients,
                &radiation,
                &balance,
            ),
        }
    }
}
