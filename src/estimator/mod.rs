//! Mean radiant temperature estimation
//!
//! One update flows through:
//! 1. [`inputs`]: resolve sensor, weather, sun and override control values
//! 2. [`radiation`]: sensor irradiance or heuristic estimate
//! 3. [`thermal`]: loss and solar terms, dynamic clamp
//! 4. [`smoothing`]: exponential filter over the clamped estimate
//!
//! [`operative`] averages the published MRT with air temperature.

pub mod diagnostics;
pub mod inputs;
pub mod mrt;
pub mod operative;
pub mod radiation;
pub mod smoothing;
pub mod thermal;

pub use diagnostics::MrtDiagnostics;
pub use inputs::{
    resolve_inputs, CoefficientSet, ControlHandles, InputSnapshot, InputSource, OutdoorSource,
    RainSource, ResolvedInputs, SuspendReason,
};
pub use mrt::{MrtEstimator, MrtReading, UpdateOutcome};
pub use operative::{operative_temperature, OperativeAggregator, OperativeReading};
pub use radiation::{estimate_radiation, RadiationEstimate, RadiationSource};
pub use smoothing::EstimatorState;
pub use thermal::{ClampBounds, ThermalBalance};
