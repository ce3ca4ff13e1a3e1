/// Gameplay Engine: Arithmetic Primitives
///
/// Gauges, credits and playheads are i64. The only floats are balancing
/// ratios (economy multipliers, live-ops factors), always rounded before
/// they touch an integer field.

/// Upper bound of a fork playhead, in milliseconds (one hour).
pub const PLAYHEAD_MAX_MS: i64 = 3_600_000;

/// Clamp an integer gauge into `[min, max]`.
pub fn clamp(value: i64, min: i64, max: i64) -> i64 {
    value.max(min).min(max)
}

/// Clamp a balancing ratio into `[min, max]`.
pub fn clamp_ratio(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}

/// Round half away from zero to the nearest integer.
pub fn round_to_i64(value: f64) -> i64 {
    value.round() as i64
}

/// Round to a fixed number of decimal places.
pub fn round_places(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Fold a seed source string into the session seed: `(h * 31 + c) % 100_000`.
pub fn hash_seed(source: &str) -> u64 {
    source
        .chars()
        .fold(0u64, |hash, ch| (hash * 31 + ch as u64) % 100_000)
}
