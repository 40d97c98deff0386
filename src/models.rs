use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::config::ProfileDefaults;

/// Fully resolved athlete physiology used by every scoring formula
///
/// Constructed once per call at the boundary via [`AthleteDetails::resolve`]
/// so the math never has to deal with missing values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AthleteProfile {
    /// Age in whole years
    pub age: f64,

    /// Body mass in kilograms
    pub weight_kg: f64,

    /// Height in centimetres (carried for completeness, unused by the math)
    pub height_cm: f64,

    /// Maximum heart rate in bpm
    pub max_hr: f64,

    /// Resting heart rate in bpm (Karvonen baseline)
    pub resting_hr: f64,
}

impl Default for AthleteProfile {
    fn default() -> Self {
        ProfileDefaults::default().into()
    }
}

impl From<ProfileDefaults> for AthleteProfile {
    fn from(defaults: ProfileDefaults) -> Self {
        AthleteProfile {
            age: defaults.age,
            weight_kg: defaults.weight_kg,
            height_cm: defaults.height_cm,
            max_hr: defaults.max_hr,
            resting_hr: defaults.resting_hr,
        }
    }
}

impl AthleteProfile {
    /// Heart rate reserve (max - resting)
    pub fn hr_reserve(&self) -> f64 {
        self.max_hr - self.resting_hr
    }

    /// Sub-linear body-size scaling shared by the power based estimators
    pub fn body_factor(&self) -> f64 {
        (self.weight_kg / 75.0).powf(0.222)
    }
}

/// Athlete data as stored, with every physiological field optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AthleteDetails {
    /// Date of birth for age-based calculations
    pub date_of_birth: Option<NaiveDate>,

    /// Weight in kilograms
    pub weight_kg: Option<f64>,

    /// Height in centimetres
    pub height_cm: Option<f64>,

    /// Maximum heart rate
    pub max_hr: Option<f64>,

    /// Resting heart rate
    pub resting_hr: Option<f64>,
}

impl AthleteDetails {
    /// Resolve optional fields against the configured fallbacks
    pub fn resolve(&self, today: NaiveDate, defaults: &ProfileDefaults) -> AthleteProfile {
        AthleteProfile {
            age: self
                .age_on(today)
                .map(f64::from)
                .unwrap_or(defaults.age),
            weight_kg: self.weight_kg.unwrap_or(defaults.weight_kg),
            height_cm: self.height_cm.unwrap_or(defaults.height_cm),
            max_hr: self.max_hr.unwrap_or(defaults.max_hr),
            resting_hr: self.resting_hr.unwrap_or(defaults.resting_hr),
        }
    }

    /// Whole years elapsed between date of birth and `today`
    pub fn age_on(&self, today: NaiveDate) -> Option<u32> {
        let dob = self.date_of_birth?;
        if dob > today {
            return None;
        }
        let mut years = today.year() - dob.year();
        if (today.month(), today.day()) < (dob.month(), dob.day()) {
            years -= 1;
        }
        u32::try_from(years).ok()
    }
}

/// One split of a workout as reported by the performance monitor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub distance_metres: f64,
    pub time_seconds: f64,

    /// Seconds per 500m for this interval
    pub pace_seconds: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_heart_rate: Option<f64>,
}

/// Raw telemetry for a single workout
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkoutRecord {
    pub total_distance_metres: f64,
    pub total_time_seconds: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_heart_rate: Option<f64>,

    /// Strokes per minute
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_stroke_rate: Option<f64>,

    /// Chronological splits; never empty when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intervals: Option<Vec<Interval>>,
}

impl WorkoutRecord {
    pub fn total_minutes(&self) -> f64 {
        self.total_time_seconds / 60.0
    }

    /// Intervals as a slice, empty when the workout has none
    pub fn interval_slice(&self) -> &[Interval] {
        self.intervals.as_deref().unwrap_or(&[])
    }

    /// Intervals that carry their own heart rate, in order
    pub fn hr_tagged_intervals(&self) -> Vec<(&Interval, f64)> {
        self.interval_slice()
            .iter()
            .filter_map(|interval| interval.avg_heart_rate.map(|hr| (interval, hr)))
            .collect()
    }
}

/// A workout record with identity and date, as imported or listed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutEntry {
    pub id: String,
    pub date: NaiveDate,
    #[serde(flatten)]
    pub record: WorkoutRecord,
}
