//! Solar irradiance estimate
//!
//! A configured irradiance sensor wins whenever it reports a number. Without
//! one, a heuristic derives an estimate from UV index (or sun elevation),
//! cloud cover and precipitation.

use serde::{Deserialize, Serialize};
use strum::Display;
use tracing::warn;

use super::inputs::InputSnapshot;

/// Highest plausible horizontal irradiance at ground level, W/m²
pub const MAX_PLAUSIBLE_IRRADIANCE_W_M2: f64 = 1300.0;
/// Cap applied to heuristic estimates only, W/m²
pub const HEURISTIC_CAP_W_M2: f64 = 1000.0;

const W_M2_PER_UV_INDEX: f64 = 90.0;
const W_M2_PER_DAYLIGHT: f64 = 100.0;
const CLOUD_ATTENUATION: f64 = 0.9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RadiationSource {
    Sensor,
    Heuristic,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadiationEstimate {
    /// Estimate as reported; sensor values are never capped
    pub value_w_m2: f64,
    pub source: RadiationSource,
    /// Sensor reading above [`MAX_PLAUSIBLE_IRRADIANCE_W_M2`]
    pub implausible: bool,
}

impl RadiationEstimate {
    /// Value used by the thermal model, never negative
    pub fn effective_w_m2(&self) -> f64 {
        self.value_w_m2.max(0.0)
    }
}

/// Heuristic irradiance in [0, 1000] W/m²
pub fn heuristic_irradiance(
    uv_index: f64,
    cloud_coverage: f64,
    rain_multiplier: f64,
    daylight_factor: f64,
) -> f64 {
    let base = if uv_index > 0.0 {
        W_M2_PER_UV_INDEX * uv_index
    } else {
        W_M2_PER_DAYLIGHT * daylight_factor
    };
    let cloud_factor = (1.0 - CLOUD_ATTENUATION * (cloud_coverage / 100.0)).max(0.0);
    let estimate = base * cloud_factor * rain_multiplier * daylight_factor;
    estimate.min(HEURISTIC_CAP_W_M2).max(0.0)
}

pub fn estimate_radiation(snapshot: &InputSnapshot) -> RadiationEstimate {
    if let Some(reading) = snapshot.solar_irradiance {
        let implausible = reading > MAX_PLAUSIBLE_IRRADIANCE_W_M2;
        if implausible {
            warn!(
                radiation_w_m2 = reading,
                max_w_m2 = MAX_PLAUSIBLE_IRRADIANCE_W_M2,
                "solar sensor value exceeds physical maximum, using reported value"
            );
        }
        return RadiationEstimate {
            value_w_m2: reading,
            source: RadiationSource::Sensor,
            implausible,
        };
    }

    RadiationEstimate {
        value_w_m2: heuristic_irradiance(
            snapshot.uv_index,
            snapshot.cloud_coverage,
            snapshot.rain_multiplier,
            snapshot.daylight_factor,
        ),
        source: RadiationSource::Heuristic,
        implausible: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RoomProfile;
    use crate::estimator::inputs::{InputSource, OutdoorSource, RainSource};
    use proptest::prelude::*;

    fn snapshot(irradiance: Option<f64>) -> InputSnapshot {
        InputSnapshot {
            active_profile: RoomProfile::Attic,
            t_air: 21.0,
            t_out: 5.0,
            t_apparent: None,
            t_out_eff: 5.0,
            t_out_eff_source: OutdoorSource::Temperature,
            wind_ms: 0.0,
            wind_source: InputSource::Fallback,
            cloud_coverage: 0.0,
            cloud_source: InputSource::WeatherEntity,
            uv_index: 2.0,
            uv_source: InputSource::WeatherEntity,
            condition: "sunny".to_string(),
            rain_multiplier: 1.0,
            rain_source: RainSource::Dry,
            sun_elevation: 60.0,
            daylight_factor: 1.0,
            solar_irradiance: irradiance,
        }
    }

    #[test]
    fn test_sensor_wins_over_heuristic() {
        let est = estimate_radiation(&snapshot(Some(640.0)));
        assert_eq!(est.source, RadiationSource::Sensor);
        assert_eq!(est.value_w_m2, 640.0);
        assert!(!est.implausible);

        let est = estimate_radiation(&snapshot(None));
        assert_eq!(est.source, RadiationSource::Heuristic);
        assert!((est.value_w_m2 - 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_implausible_sensor_value_not_capped() {
        let est = estimate_radiation(&snapshot(Some(1450.0)));
        assert_eq!(est.value_w_m2, 1450.0);
        assert!(est.implausible);
        assert_eq!(est.effective_w_m2(), 1450.0);
    }

    #[test]
    fn test_daylight_base_without_uv() {
        let day = 36.0 / 66.0;
        let est = heuristic_irradiance(0.0, 50.0, 1.0, day);
        // 100 * day * 0.55 * day
        assert!((est - 16.3636).abs() < 1e-3);
    }

    #[test]
    fn test_uv_base() {
        let est = heuristic_irradiance(5.0, 0.0, 1.0, 1.0);
        assert!((est - 450.0).abs() < 1e-9);
    }

    #[test]
    fn test_heuristic_cap() {
        let est = heuristic_irradiance(14.0, 0.0, 1.0, 1.0);
        assert_eq!(est, HEURISTIC_CAP_W_M2);
    }

    #[test]
    fn test_rain_reduces_estimate() {
        let dry = heuristic_irradiance(3.0, 20.0, 1.0, 0.8);
        let wet = heuristic_irradiance(3.0, 20.0, 0.4, 0.8);
        assert!(wet < dry);
        assert!((wet - dry * 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_full_overcast_blocks_most() {
        let est = heuristic_irradiance(4.0, 100.0, 1.0, 1.0);
        assert!((est - 36.0).abs() < 1e-9);
        // Coverage above 100% never goes negative
        assert_eq!(heuristic_irradiance(4.0, 150.0, 1.0, 1.0), 0.0);
    }

    #[test]
    fn test_night_is_dark() {
        assert_eq!(heuristic_irradiance(0.0, 0.0, 1.0, 0.0), 0.0);
    }

    #[test]
    fn test_effective_never_negative() {
        let est = RadiationEstimate {
            value_w_m2: -4.0,
            source: RadiationSource::Sensor,
            implausible: false,
        };
        assert_eq!(est.effective_w_m2(), 0.0);
    }

    proptest! {
        #[test]
        fn heuristic_stays_in_range(
            uv in -2.0f64..20.0,
            cloud in -10.0f64..200.0,
            wet in any::<bool>(),
            elevation in -90.0f64..90.0,
        ) {
            let day = ((elevation + 6.0) / 66.0).clamp(0.0, 1.0);
            let rain = if wet { 0.4 } else { 1.0 };
            let est = heuristic_irradiance(uv, cloud, rain, day);
            prop_assert!((0.0..=HEURISTIC_CAP_W_M2).contains(&est));
        }
    }
}
