//! Effort Points scoring
//!
//! Combines four independent estimators into a single 0-100 score:
//!
//! | Component     | Range | Basis                                        |
//! |---------------|-------|----------------------------------------------|
//! | Cardiac load  | 0-40  | %HRR strain, or power as a proxy without HR  |
//! | Work output   | 0-35  | size-adjusted power x log duration           |
//! | Pacing        | 0-15  | split consistency plus negative-split bonus  |
//! | Economy       | 0-10  | watts per stroke banding                     |
//!
//! ## Zones
//! - 0-25: Recovery
//! - 25-50: Building
//! - 50-75: Training
//! - >75: Peak

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use tracing::debug;

use crate::models::{AthleteProfile, Interval, WorkoutRecord};
use crate::power;

pub const CARDIAC_LOAD_MAX: f64 = 40.0;
pub const WORK_OUTPUT_MAX: f64 = 35.0;
pub const PACING_MAX: f64 = 15.0;
pub const ECONOMY_MAX: f64 = 10.0;
pub const EFFORT_POINTS_MAX: f64 = 100.0;

/// Pacing score when there are no splits to compare
const DEFAULT_PACING: f64 = 10.0;
/// Economy score when stroke rate or power is unknown
const DEFAULT_ECONOMY: f64 = 5.0;
const NEGATIVE_SPLIT_BONUS: f64 = 3.0;

/// Effort zone classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffortZone {
    Recovery, // 0-25
    Building, // 25-50
    Training, // 50-75
    Peak,     // >75
}

impl EffortZone {
    /// Classify effort points; each boundary belongs to the lower zone
    pub fn from_points(points: f64) -> Self {
        match points {
            p if p <= 25.0 => EffortZone::Recovery,
            p if p <= 50.0 => EffortZone::Building,
            p if p <= 75.0 => EffortZone::Training,
            _ => EffortZone::Peak,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EffortZone::Recovery => "Recovery",
            EffortZone::Building => "Building",
            EffortZone::Training => "Training",
            EffortZone::Peak => "Peak",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            EffortZone::Recovery => "Light session that supports recovery",
            EffortZone::Building => "Steady work building aerobic fitness",
            EffortZone::Training => "Solid training stimulus",
            EffortZone::Peak => "Maximal effort, plan recovery afterwards",
        }
    }
}

impl std::fmt::Display for EffortZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Per-component contribution to the effort score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffortBreakdown {
    pub cardiac_load: f64,
    pub work_output: f64,
    pub pacing: f64,
    pub economy: f64,
}

impl EffortBreakdown {
    pub fn total(&self) -> f64 {
        self.cardiac_load + self.work_output + self.pacing + self.economy
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffortResult {
    /// 0-100, one decimal
    pub effort_points: f64,
    pub zone: EffortZone,
    pub breakdown: EffortBreakdown,
}

impl EffortResult {
    /// Sum the components, clamp to 0-100, round to one decimal and classify
    pub fn from_breakdown(breakdown: EffortBreakdown) -> Self {
        let clamped = breakdown.total().clamp(0.0, EFFORT_POINTS_MAX);
        let effort_points = (clamped * 10.0).round() / 10.0;

        EffortResult {
            effort_points,
            zone: EffortZone::from_points(effort_points),
            breakdown,
        }
    }
}

/// Effort Points calculator
pub struct EffortCalculator;

impl EffortCalculator {
    /// Full effort score with breakdown
    pub fn calculate(profile: &AthleteProfile, record: &WorkoutRecord) -> EffortResult {
        let watts = power::watts(record.total_distance_metres, record.total_time_seconds);

        let breakdown = EffortBreakdown {
            cardiac_load: Self::cardiac_load(profile, record, watts),
            work_output: Self::work_output(profile, record, watts),
            pacing: Self::pacing(record.interval_slice()),
            economy: Self::economy(record.avg_stroke_rate, watts),
        };

        let result = EffortResult::from_breakdown(breakdown);
        debug!(
            watts,
            cardiac_load = breakdown.cardiac_load,
            work_output = breakdown.work_output,
            pacing = breakdown.pacing,
            economy = breakdown.economy,
            effort_points = result.effort_points,
            "effort calculated"
        );
        result
    }

    /// Effort points alone, for callers that only show the headline number
    pub fn effort_points(profile: &AthleteProfile, record: &WorkoutRecord) -> f64 {
        Self::calculate(profile, record).effort_points
    }

    /// Cardiac strain, 0-40
    ///
    /// With heart rate: `max(0, %HRR)^1.5 * 40`. Without it the average power
    /// relative to a size-scaled 220W threshold stands in, weighted by a
    /// capped log duration and topped out around 28 since it is a weaker
    /// proxy. Both paths scale by an age factor of `1 + (age - 30) * 0.005`
    /// capped at 1.3.
    pub fn cardiac_load(profile: &AthleteProfile, record: &WorkoutRecord, watts: f64) -> f64 {
        let base = match record.avg_heart_rate {
            Some(avg_hr) => {
                let hr_reserve = profile.hr_reserve();
                let intensity = if hr_reserve > 0.0 {
                    (avg_hr - profile.resting_hr) / hr_reserve
                } else {
                    0.0
                };
                intensity.max(0.0).powf(1.5) * CARDIAC_LOAD_MAX
            }
            None if watts > 0.0 => {
                let threshold_watts = 220.0 * profile.body_factor();
                let power_intensity = (watts / threshold_watts).min(1.3);
                let duration_factor = ((record.total_minutes() + 1.0).log10() * 0.6).min(0.85);
                power_intensity.powf(1.2) * duration_factor * 28.0
            }
            None => 0.0,
        };

        let age_factor = (1.0 + (profile.age - 30.0) * 0.005).min(1.3);
        clamp_score(base * age_factor, CARDIAC_LOAD_MAX)
    }

    /// Size-adjusted mechanical work, 0-35
    pub fn work_output(profile: &AthleteProfile, record: &WorkoutRecord, watts: f64) -> f64 {
        let expected_watts = 150.0 * profile.body_factor();
        let relative_power = if expected_watts > 0.0 {
            watts / expected_watts
        } else {
            0.0
        };
        let duration_factor = (record.total_minutes() + 1.0).log10();

        clamp_score(relative_power * duration_factor * 15.0, WORK_OUTPUT_MAX)
    }

    /// Split consistency, 0-15
    ///
    /// `max(0, 1 - 10 * CV) * 12` over the interval paces, plus 3 when the
    /// second half was faster on average than the first.
    pub fn pacing(intervals: &[Interval]) -> f64 {
        if intervals.len() <= 1 {
            return DEFAULT_PACING;
        }

        let paces: Vec<f64> = intervals.iter().map(|i| i.pace_seconds).collect();
        let mean = paces.iter().mean();
        let variance = paces.iter().population_variance();
        let cv = if mean > 0.0 { variance.sqrt() / mean } else { 0.0 };
        let consistency = (1.0 - cv * 10.0).max(0.0);

        let mid = paces.len() / 2;
        let first_half = paces[..mid].iter().mean();
        let second_half = paces[mid..].iter().mean();
        let bonus = if second_half < first_half {
            NEGATIVE_SPLIT_BONUS
        } else {
            0.0
        };

        clamp_score(consistency * 12.0 + bonus, PACING_MAX)
    }

    /// Stroke economy, 0-10
    ///
    /// Lower watts per stroke scores higher: >8 -> 6, >6 -> 8, otherwise 10.
    pub fn economy(avg_stroke_rate: Option<f64>, watts: f64) -> f64 {
        match avg_stroke_rate {
            Some(rate) if rate > 0.0 && watts > 0.0 => {
                let watts_per_stroke = watts / rate;
                if watts_per_stroke > 8.0 {
                    6.0
                } else if watts_per_stroke > 6.0 {
                    8.0
                } else {
                    10.0
                }
            }
            _ => DEFAULT_ECONOMY,
        }
    }
}

/// Clamp to `[0, max]`, mapping NaN to zero
fn clamp_score(value: f64, max: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, max)
    }
}
