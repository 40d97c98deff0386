//! Heart rate analysis
//!
//! Produces a report from a workout's average heart rate and, when the
//! splits carry their own heart rate, per-interval detail:
//!
//! - Intensity as %max and %HRR, plus the Karvonen zone of the average
//! - Cardiovascular efficiency (watts per heartbeat above resting)
//! - Cardiac drift between the first and second half (>= 4 tagged splits)
//! - Heart rate trend across the session (>= 3 tagged splits)
//! - Time in each zone over the tagged splits (>= 2 tagged splits)

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use tracing::{debug, warn};

use crate::models::{AthleteProfile, Interval, WorkoutRecord};
use crate::power;
use crate::zones::{HeartRateZones, HrZone, ZoneCalculator};

/// Tagged splits needed before any per-interval analysis is attempted
pub const MIN_DETAILED_INTERVALS: usize = 2;
pub const MIN_DRIFT_INTERVALS: usize = 4;
pub const MIN_TREND_INTERVALS: usize = 3;
pub const MIN_DISTRIBUTION_INTERVALS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HrIntensity {
    /// Average HR as a whole percentage of max HR
    pub percent_max: f64,
    /// Average HR as a whole percentage of heart rate reserve
    pub percent_hrr: f64,
    /// Average HR rounded to whole beats
    pub bpm: f64,
    pub max_hr: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HrZoneSummary {
    pub zone: HrZone,
    pub number: u8,
    pub name: String,
    pub training_effect: String,
}

impl From<HrZone> for HrZoneSummary {
    fn from(zone: HrZone) -> Self {
        HrZoneSummary {
            zone,
            number: zone.number(),
            name: zone.name().to_string(),
            training_effect: zone.training_effect().to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EfficiencyRating {
    Elite,      // >= 3.0 W/beat
    Excellent,  // >= 2.5
    Good,       // >= 2.0
    Developing, // >= 1.5
    Building,
}

impl EfficiencyRating {
    pub fn from_watts_per_beat(watts_per_beat: f64) -> Self {
        match watts_per_beat {
            w if w >= 3.0 => EfficiencyRating::Elite,
            w if w >= 2.5 => EfficiencyRating::Excellent,
            w if w >= 2.0 => EfficiencyRating::Good,
            w if w >= 1.5 => EfficiencyRating::Developing,
            _ => EfficiencyRating::Building,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Efficiency {
    pub watts_per_beat: f64,
    pub rating: EfficiencyRating,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriftRating {
    Excellent,   // < 3%
    Good,        // < 6%
    Moderate,    // < 10%
    PacingIssue, // >= 10% while power fell by > 10%
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CardiacDrift {
    /// Change in HR-per-watt from the first to the second half
    pub drift_percent: f64,
    /// Fall in mean power from the first to the second half
    pub power_drop_percent: f64,
    pub is_pacing_issue: bool,
    pub rating: DriftRating,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendPattern {
    Stable,
    Accelerating,
    Plateaued,
    SteadyClimb,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HrTrend {
    pub pattern: TrendPattern,
    pub early_rise: f64,
    pub late_rise: f64,
    pub total_rise: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneTime {
    pub zone: HrZone,
    pub name: String,
    pub seconds: f64,
    /// Share of the total heart-rate-tagged interval time
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeartRateAnalysis {
    pub intensity: HrIntensity,
    pub zone: HrZoneSummary,
    pub efficiency: Efficiency,
    pub has_detailed_data: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drift: Option<CardiacDrift>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trend: Option<HrTrend>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone_distribution: Option<Vec<ZoneTime>>,
}

/// Heart rate report, skipped entirely when the workout has no average HR
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum HraResult {
    Unavailable,
    Available(HeartRateAnalysis),
}

impl HraResult {
    pub fn is_available(&self) -> bool {
        matches!(self, HraResult::Available(_))
    }

    pub fn analysis(&self) -> Option<&HeartRateAnalysis> {
        match self {
            HraResult::Available(analysis) => Some(analysis),
            HraResult::Unavailable => None,
        }
    }
}

/// Heart rate analyzer
pub struct HeartRateAnalyzer;

impl HeartRateAnalyzer {
    pub fn analyze(profile: &AthleteProfile, record: &WorkoutRecord) -> HraResult {
        let Some(avg_hr) = record.avg_heart_rate else {
            return HraResult::Unavailable;
        };

        let zones = ZoneCalculator::heart_rate_zones(profile);
        let watts = power::watts(record.total_distance_metres, record.total_time_seconds);

        let tagged = record.hr_tagged_intervals();
        let has_detailed_data = tagged.len() >= MIN_DETAILED_INTERVALS;

        let (drift, trend, zone_distribution) = if has_detailed_data {
            let heart_rates: Vec<f64> = tagged.iter().map(|(_, hr)| *hr).collect();
            (
                Self::cardiac_drift(&tagged),
                Self::trend(&heart_rates),
                Self::zone_distribution(&tagged, &zones),
            )
        } else {
            (None, None, None)
        };

        debug!(
            avg_hr,
            tagged_intervals = tagged.len(),
            has_detailed_data,
            "heart rate analysis"
        );

        HraResult::Available(HeartRateAnalysis {
            intensity: Self::intensity(profile, avg_hr),
            zone: zones.zone_for(avg_hr).into(),
            efficiency: Self::efficiency(watts, avg_hr, profile.resting_hr),
            has_detailed_data,
            drift,
            trend,
            zone_distribution,
        })
    }

    pub fn intensity(profile: &AthleteProfile, avg_hr: f64) -> HrIntensity {
        let percent_max = if profile.max_hr > 0.0 {
            (avg_hr / profile.max_hr * 100.0).round()
        } else {
            0.0
        };
        let hr_reserve = profile.hr_reserve();
        let percent_hrr = if hr_reserve > 0.0 {
            ((avg_hr - profile.resting_hr) / hr_reserve * 100.0).round()
        } else {
            0.0
        };

        HrIntensity {
            percent_max,
            percent_hrr,
            bpm: avg_hr.round(),
            max_hr: profile.max_hr,
        }
    }

    /// Watts produced per heartbeat above resting
    pub fn efficiency(watts: f64, avg_hr: f64, resting_hr: f64) -> Efficiency {
        let watts_per_beat = if avg_hr > resting_hr {
            watts / (avg_hr - resting_hr)
        } else {
            0.0
        };

        Efficiency {
            watts_per_beat,
            rating: EfficiencyRating::from_watts_per_beat(watts_per_beat),
        }
    }

    /// Cardiac drift over heart-rate-tagged intervals
    ///
    /// Absent with fewer than four tagged intervals, or when either half
    /// has no usable power so the percentages would not be finite.
    pub fn cardiac_drift(tagged: &[(&Interval, f64)]) -> Option<CardiacDrift> {
        if tagged.len() < MIN_DRIFT_INTERVALS {
            return None;
        }

        let samples: Vec<(f64, f64)> = tagged
            .iter()
            .map(|(interval, hr)| {
                let watts = power::watts(interval.distance_metres, interval.time_seconds);
                (hr / watts, watts)
            })
            .collect();

        let mid = samples.len() / 2;
        let (first, second) = samples.split_at(mid);

        let first_ratio = first.iter().map(|(ratio, _)| *ratio).mean();
        let second_ratio = second.iter().map(|(ratio, _)| *ratio).mean();
        let first_watts = first.iter().map(|(_, watts)| *watts).mean();
        let second_watts = second.iter().map(|(_, watts)| *watts).mean();

        let usable = |value: f64| value.is_finite() && value > 0.0;
        if !(usable(first_ratio) && usable(first_watts)) {
            warn!(
                first_ratio,
                first_watts, "cardiac drift skipped: first half has no usable power"
            );
            return None;
        }

        let drift_percent = (second_ratio - first_ratio) / first_ratio * 100.0;
        let power_drop_percent = (first_watts - second_watts) / first_watts * 100.0;
        if !(drift_percent.is_finite() && power_drop_percent.is_finite()) {
            warn!(
                drift_percent,
                power_drop_percent, "cardiac drift skipped: non-finite result"
            );
            return None;
        }

        let is_pacing_issue = power_drop_percent > 10.0 && drift_percent > 10.0;
        let rating = if drift_percent < 3.0 {
            DriftRating::Excellent
        } else if drift_percent < 6.0 {
            DriftRating::Good
        } else if drift_percent < 10.0 {
            DriftRating::Moderate
        } else if is_pacing_issue {
            DriftRating::PacingIssue
        } else {
            DriftRating::High
        };

        Some(CardiacDrift {
            drift_percent,
            power_drop_percent,
            is_pacing_issue,
            rating,
        })
    }

    /// Classify how heart rate moved across the tagged intervals
    pub fn trend(heart_rates: &[f64]) -> Option<HrTrend> {
        if heart_rates.len() < MIN_TREND_INTERVALS {
            return None;
        }

        let last = heart_rates.len() - 1;
        let early_rise = heart_rates[1] - heart_rates[0];
        let late_rise = heart_rates[last] - heart_rates[last - 1];
        let total_rise = heart_rates[last] - heart_rates[0];

        let pattern = if total_rise <= 0.0 {
            TrendPattern::Stable
        } else if late_rise > early_rise * 1.5 && late_rise > 5.0 {
            TrendPattern::Accelerating
        } else if late_rise.abs() < 3.0 && early_rise > 5.0 {
            TrendPattern::Plateaued
        } else {
            TrendPattern::SteadyClimb
        };

        Some(HrTrend {
            pattern,
            early_rise,
            late_rise,
            total_rise,
        })
    }

    /// Time spent in each zone over the tagged intervals, zones in order
    pub fn zone_distribution(
        tagged: &[(&Interval, f64)],
        zones: &HeartRateZones,
    ) -> Option<Vec<ZoneTime>> {
        if tagged.len() < MIN_DISTRIBUTION_INTERVALS {
            return None;
        }

        let mut seconds = [0.0f64; 5];
        for (interval, hr) in tagged {
            let zone = zones.zone_for(*hr);
            seconds[usize::from(zone.number() - 1)] += interval.time_seconds;
        }

        let total: f64 = seconds.iter().sum();
        if total <= 0.0 {
            return None;
        }

        Some(
            HrZone::ALL
                .iter()
                .zip(seconds)
                .filter(|(_, secs)| *secs > 0.0)
                .map(|(zone, secs)| ZoneTime {
                    zone: *zone,
                    name: zone.name().to_string(),
                    seconds: secs,
                    percent: secs / total * 100.0,
                })
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> AthleteProfile {
        AthleteProfile {
            age: 30.0,
            weight_kg: 75.0,
            height_cm: 180.0,
            max_hr: 190.0,
            resting_hr: 50.0,
        }
    }

    fn split(distance: f64, time: f64, hr: Option<f64>) -> Interval {
        Interval {
            distance_metres: distance,
            time_seconds: time,
            pace_seconds: power::pace_per_500m(distance, time),
            avg_heart_rate: hr,
        }
    }

    fn record_with(intervals: Vec<Interval>) -> WorkoutRecord {
        let distance = intervals.iter().map(|i| i.distance_metres).sum();
        let time = intervals.iter().map(|i| i.time_seconds).sum();
        WorkoutRecord {
            total_distance_metres: distance,
            total_time_seconds: time,
            avg_heart_rate: Some(155.0),
            avg_stroke_rate: Some(24.0),
            intervals: Some(intervals),
        }
    }

    #[test]
    fn test_unavailable_without_average_hr() {
        let record = WorkoutRecord {
            total_distance_metres: 2000.0,
            total_time_seconds: 420.0,
            ..Default::default()
        };
        let result = HeartRateAnalyzer::analyze(&profile(), &record);
        assert_eq!(result, HraResult::Unavailable);
        assert!(!result.is_available());
        assert!(result.analysis().is_none());
    }

    #[test]
    fn test_intensity_and_zone() {
        let record = WorkoutRecord {
            total_distance_metres: 2000.0,
            total_time_seconds: 420.0,
            avg_heart_rate: Some(150.0),
            ..Default::default()
        };
        let result = HeartRateAnalyzer::analyze(&profile(), &record);
        let analysis = result.analysis().unwrap();

        assert_eq!(analysis.intensity.percent_max, 79.0); // 78.9
        assert_eq!(analysis.intensity.percent_hrr, 71.0); // 71.4
        assert_eq!(analysis.intensity.bpm, 150.0);
        assert_eq!(analysis.intensity.max_hr, 190.0);
        assert_eq!(analysis.zone.zone, HrZone::Tempo);
        assert_eq!(analysis.zone.number, 3);
        assert!(!analysis.has_detailed_data);
    }

    #[test]
    fn test_efficiency_boundaries() {
        // 300W over 100 beats above resting
        assert_eq!(
            HeartRateAnalyzer::efficiency(300.0, 150.0, 50.0).rating,
            EfficiencyRating::Elite
        );
        assert_eq!(EfficiencyRating::from_watts_per_beat(3.0), EfficiencyRating::Elite);
        assert_eq!(EfficiencyRating::from_watts_per_beat(2.999), EfficiencyRating::Excellent);
        assert_eq!(EfficiencyRating::from_watts_per_beat(2.0), EfficiencyRating::Good);
        assert_eq!(EfficiencyRating::from_watts_per_beat(1.5), EfficiencyRating::Developing);
        assert_eq!(EfficiencyRating::from_watts_per_beat(1.49), EfficiencyRating::Building);
    }

    #[test]
    fn test_efficiency_requires_hr_above_resting() {
        let efficiency = HeartRateAnalyzer::efficiency(300.0, 50.0, 50.0);
        assert_eq!(efficiency.watts_per_beat, 0.0);
        assert_eq!(efficiency.rating, EfficiencyRating::Building);
    }

    #[test]
    fn test_drift_steady_power() {
        // Same pace throughout, HR creeps up 140 -> 150
        let intervals = vec![
            split(500.0, 110.0, Some(140.0)),
            split(500.0, 110.0, Some(140.0)),
            split(500.0, 110.0, Some(150.0)),
            split(500.0, 110.0, Some(150.0)),
        ];
        let record = record_with(intervals);
        let drift = HeartRateAnalyzer::cardiac_drift(&record.hr_tagged_intervals()).unwrap();

        assert!((drift.drift_percent - 100.0 / 14.0).abs() < 1e-9);
        assert!(drift.power_drop_percent.abs() < 1e-9);
        assert!(!drift.is_pacing_issue);
        assert_eq!(drift.rating, DriftRating::Moderate);
    }

    #[test]
    fn test_drift_pacing_issue() {
        // Power fades while HR keeps climbing
        let intervals = vec![
            split(500.0, 100.0, Some(150.0)),
            split(500.0, 100.0, Some(150.0)),
            split(500.0, 110.0, Some(160.0)),
            split(500.0, 110.0, Some(160.0)),
        ];
        let record = record_with(intervals);
        let drift = HeartRateAnalyzer::cardiac_drift(&record.hr_tagged_intervals()).unwrap();

        assert!(drift.power_drop_percent > 10.0);
        assert!(drift.drift_percent > 10.0);
        assert!(drift.is_pacing_issue);
        assert_eq!(drift.rating, DriftRating::PacingIssue);
    }

    #[test]
    fn test_drift_high_without_power_drop() {
        let intervals = vec![
            split(500.0, 110.0, Some(130.0)),
            split(500.0, 110.0, Some(130.0)),
            split(500.0, 110.0, Some(150.0)),
            split(500.0, 110.0, Some(150.0)),
        ];
        let record = record_with(intervals);
        let drift = HeartRateAnalyzer::cardiac_drift(&record.hr_tagged_intervals()).unwrap();

        assert!(drift.drift_percent >= 10.0);
        assert_eq!(drift.rating, DriftRating::High);
    }

    #[test]
    fn test_drift_absent_when_first_half_has_no_power() {
        let intervals = vec![
            split(0.0, 60.0, Some(120.0)),
            split(0.0, 60.0, Some(125.0)),
            split(500.0, 110.0, Some(150.0)),
            split(500.0, 110.0, Some(150.0)),
        ];
        let record = record_with(intervals);
        assert!(HeartRateAnalyzer::cardiac_drift(&record.hr_tagged_intervals()).is_none());
    }

    #[test]
    fn test_drift_absent_when_second_half_has_no_power() {
        let intervals = vec![
            split(500.0, 110.0, Some(140.0)),
            split(500.0, 110.0, Some(145.0)),
            split(0.0, 60.0, Some(150.0)),
            split(0.0, 60.0, Some(152.0)),
        ];
        let record = record_with(intervals);
        assert!(HeartRateAnalyzer::cardiac_drift(&record.hr_tagged_intervals()).is_none());
    }

    #[test]
    fn test_trend_patterns() {
        let pattern = |hrs: &[f64]| HeartRateAnalyzer::trend(hrs).unwrap().pattern;

        assert_eq!(pattern(&[150.0, 148.0, 150.0]), TrendPattern::Stable);
        assert_eq!(pattern(&[140.0, 142.0, 145.0, 155.0]), TrendPattern::Accelerating);
        assert_eq!(pattern(&[130.0, 145.0, 150.0, 151.0]), TrendPattern::Plateaued);
        assert_eq!(pattern(&[140.0, 144.0, 148.0, 152.0]), TrendPattern::SteadyClimb);
        assert!(HeartRateAnalyzer::trend(&[140.0, 150.0]).is_none());
    }

    #[test]
    fn test_zone_distribution_uses_tagged_time_only() {
        let intervals = vec![
            split(500.0, 120.0, Some(125.0)),  // Z1
            split(500.0, 120.0, None),
            split(1000.0, 240.0, Some(155.0)), // Z3
            split(500.0, 120.0, Some(158.0)),  // Z3
        ];
        let record = record_with(intervals);
        let zones = ZoneCalculator::heart_rate_zones(&profile());
        let distribution =
            HeartRateAnalyzer::zone_distribution(&record.hr_tagged_intervals(), &zones).unwrap();

        assert_eq!(distribution.len(), 2);
        assert_eq!(distribution[0].zone, HrZone::Recovery);
        assert_eq!(distribution[0].seconds, 120.0);
        assert!((distribution[0].percent - 25.0).abs() < 1e-9);
        assert_eq!(distribution[1].zone, HrZone::Tempo);
        assert_eq!(distribution[1].seconds, 360.0);
        assert!((distribution[1].percent - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_detailed_gating() {
        let three = record_with(vec![
            split(500.0, 110.0, Some(140.0)),
            split(500.0, 110.0, Some(145.0)),
            split(500.0, 110.0, Some(150.0)),
        ]);
        let result = HeartRateAnalyzer::analyze(&profile(), &three);
        let analysis = result.analysis().unwrap();
        assert!(analysis.has_detailed_data);
        assert!(analysis.drift.is_none());
        assert!(analysis.trend.is_some());
        assert!(analysis.zone_distribution.is_some());

        let one = record_with(vec![
            split(500.0, 110.0, Some(140.0)),
            split(500.0, 110.0, None),
            split(500.0, 110.0, None),
            split(500.0, 110.0, None),
        ]);
        let result = HeartRateAnalyzer::analyze(&profile(), &one);
        let analysis = result.analysis().unwrap();
        assert!(!analysis.has_detailed_data);
        assert!(analysis.drift.is_none());
        assert!(analysis.trend.is_none());
        assert!(analysis.zone_distribution.is_none());
    }

    #[test]
    fn test_serialization_tags_status() {
        let json = serde_json::to_string(&HraResult::Unavailable).unwrap();
        assert_eq!(json, "{\"status\":\"unavailable\"}");

        let record = WorkoutRecord {
            total_distance_metres: 2000.0,
            total_time_seconds: 420.0,
            avg_heart_rate: Some(150.0),
            ..Default::default()
        };
        let json = serde_json::to_string(&HeartRateAnalyzer::analyze(&profile(), &record)).unwrap();
        assert!(json.contains("\"status\":\"available\""));
        assert!(!json.contains("drift"));
    }
}
