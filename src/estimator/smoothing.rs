/// Per-room filter memory for the published MRT.
///
/// Single-pole exponential smoothing: `out = (1 - alpha) * prior + alpha * x`.
/// The first sample initializes the prior, so the first published value equals
/// the first clamped estimate. Alpha is supplied per call and may change between
/// updates without resetting the memory.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EstimatorState {
    prior: Option<f64>,
}

impl EstimatorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Previously published (unrounded) value, if any
    pub fn prior(&self) -> Option<f64> {
        self.prior
    }

    pub fn is_initialized(&self) -> bool {
        self.prior.is_some()
    }

    /// Feed one clamped estimate and return the new filtered value
    pub fn smooth(&mut self, clamped: f64, alpha: f64) -> f64 {
        let prior = *self.prior.get_or_insert(clamped);
        let filtered = (1.0 - alpha) * prior + alpha * clamped;
        self.prior = Some(filtered);
        filtered
    }
}
