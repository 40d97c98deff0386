use tracing::warn;

use crate::error::{ErgRsError, Result};
use crate::models::{Interval, WorkoutRecord};
use crate::power;

/// Plausible average heart rate range in bpm
const HEART_RATE_RANGE: std::ops::RangeInclusive<f64> = 25.0..=250.0;
/// Plausible stroke rate range in strokes per minute
const STROKE_RATE_RANGE: std::ops::RangeInclusive<f64> = 5.0..=80.0;

/// Validate and clean imported workout records
pub struct WorkoutValidator;

impl WorkoutValidator {
    /// Validate a record, cleaning what can be cleaned
    ///
    /// Negative or non-finite distance and time are rejected. Implausible
    /// heart rate and stroke rate readings are dropped, missing interval
    /// paces are derived from distance and time, and an empty interval list
    /// becomes `None`.
    pub fn validate_record(record: &mut WorkoutRecord) -> Result<()> {
        Self::validate_amount("total distance", record.total_distance_metres)?;
        Self::validate_amount("total time", record.total_time_seconds)?;

        record.avg_heart_rate =
            Self::clean_reading("heart rate", record.avg_heart_rate, &HEART_RATE_RANGE);
        record.avg_stroke_rate =
            Self::clean_reading("stroke rate", record.avg_stroke_rate, &STROKE_RATE_RANGE);

        if let Some(intervals) = record.intervals.as_mut() {
            for (index, interval) in intervals.iter_mut().enumerate() {
                Self::validate_interval(index, interval)?;
            }
        }

        if record.intervals.as_ref().is_some_and(Vec::is_empty) {
            record.intervals = None;
        }

        Ok(())
    }

    /// Whether a heart rate reading in bpm is physiologically plausible
    pub fn is_plausible_heart_rate(bpm: f64) -> bool {
        HEART_RATE_RANGE.contains(&bpm)
    }

    /// Whether a stroke rate reading in strokes per minute is plausible
    pub fn is_plausible_stroke_rate(spm: f64) -> bool {
        STROKE_RATE_RANGE.contains(&spm)
    }

    fn validate_interval(index: usize, interval: &mut Interval) -> Result<()> {
        let label = format!("interval {}", index + 1);
        Self::validate_amount(&format!("{} distance", label), interval.distance_metres)?;
        Self::validate_amount(&format!("{} time", label), interval.time_seconds)?;

        if !interval.pace_seconds.is_finite() || interval.pace_seconds <= 0.0 {
            interval.pace_seconds =
                power::pace_per_500m(interval.distance_metres, interval.time_seconds);
        }

        interval.avg_heart_rate =
            Self::clean_reading("interval heart rate", interval.avg_heart_rate, &HEART_RATE_RANGE);
        Ok(())
    }

    fn validate_amount(field: &str, value: f64) -> Result<()> {
        if !value.is_finite() || value < 0.0 {
            return Err(ErgRsError::Validation(format!(
                "{} must be a non-negative number, got {}",
                field, value
            )));
        }
        Ok(())
    }

    fn clean_reading(
        field: &str,
        value: Option<f64>,
        range: &std::ops::RangeInclusive<f64>,
    ) -> Option<f64> {
        match value {
            Some(v) if range.contains(&v) => Some(v),
            Some(v) => {
                warn!(field, value = v, "dropping implausible reading");
                None
            }
            None => None,
        }
    }
}
