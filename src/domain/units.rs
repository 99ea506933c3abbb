/// km/h per m/s
pub const KMH_PER_MS: f64 = 3.6;

/// Round half away from zero to `decimals` places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

pub fn kmh_to_ms(kmh: f64) -> f64 {
    kmh / KMH_PER_MS
}

pub fn ms_to_kmh(ms: f64) -> f64 {
    ms * KMH_PER_MS
}
