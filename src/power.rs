//! Rowing ergometer power model
//!
//! Concept2 performance monitors derive power from boat speed with a cube law:
//! `watts = 2.80 / (seconds per metre)^3 = 2.80 * (metres per second)^3`.
//! Degenerate inputs yield zero power rather than NaN or infinity.

/// Concept2 drag constant for the cube law
pub const CONCEPT2_CONSTANT: f64 = 2.80;

/// Average power in watts for `distance_m` covered in `time_s`
pub fn watts(distance_m: f64, time_s: f64) -> f64 {
    if distance_m > 0.0 && time_s > 0.0 {
        CONCEPT2_CONSTANT * (distance_m / time_s).powi(3)
    } else {
        0.0
    }
}

/// Seconds per 500m for `distance_m` covered in `time_s`
pub fn pace_per_500m(distance_m: f64, time_s: f64) -> f64 {
    if distance_m > 0.0 && time_s > 0.0 {
        time_s * 500.0 / distance_m
    } else {
        0.0
    }
}

/// Format a duration as `m:ss.s` (or `h:mm:ss.s` past the hour)
pub fn format_duration(seconds: f64) -> String {
    let tenths = (seconds.max(0.0) * 10.0).round() as u64;
    let hours = tenths / 36_000;
    let minutes = (tenths / 600) % 60;
    let secs = (tenths / 10) % 60;
    let frac = tenths % 10;

    if hours > 0 {
        format!("{}:{:02}:{:02}.{}", hours, minutes, secs, frac)
    } else {
        format!("{}:{:02}.{}", minutes, secs, frac)
    }
}
