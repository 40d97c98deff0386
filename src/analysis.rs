use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::effort::{EffortCalculator, EffortResult};
use crate::heart_rate::{HeartRateAnalyzer, HraResult};
use crate::models::{AthleteProfile, WorkoutEntry, WorkoutRecord};

/// Both reports for one workout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutAnalysis {
    pub effort: EffortResult,
    pub heart_rate: HraResult,
}

/// A dated workout together with its analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredWorkout {
    pub entry: WorkoutEntry,
    pub analysis: WorkoutAnalysis,
}

/// Runs the effort and heart rate pipelines over the same snapshot
pub struct WorkoutAnalyzer;

impl WorkoutAnalyzer {
    #[instrument(level = "debug", skip_all)]
    pub fn analyze(profile: &AthleteProfile, record: &WorkoutRecord) -> WorkoutAnalysis {
        WorkoutAnalysis {
            effort: EffortCalculator::calculate(profile, record),
            heart_rate: HeartRateAnalyzer::analyze(profile, record),
        }
    }

    pub fn score_entry(profile: &AthleteProfile, entry: WorkoutEntry) -> ScoredWorkout {
        let analysis = Self::analyze(profile, &entry.record);
        ScoredWorkout { entry, analysis }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effort::EffortZone;

    #[test]
    fn test_analyze_combines_both_reports() {
        let profile = AthleteProfile::default();
        let record = WorkoutRecord {
            total_distance_metres: 5000.0,
            total_time_seconds: 1200.0,
            avg_heart_rate: Some(160.0),
            avg_stroke_rate: Some(26.0),
            intervals: None,
        };

        let analysis = WorkoutAnalyzer::analyze(&profile, &record);
        assert!(analysis.heart_rate.is_available());
        assert!(analysis.effort.effort_points > 0.0);
        assert_ne!(analysis.effort.zone, EffortZone::Recovery);
    }

    #[test]
    fn test_analyze_is_deterministic() {
        let profile = AthleteProfile::default();
        let record = WorkoutRecord {
            total_distance_metres: 2000.0,
            total_time_seconds: 431.7,
            avg_heart_rate: Some(171.0),
            avg_stroke_rate: Some(31.0),
            intervals: None,
        };

        let first = WorkoutAnalyzer::analyze(&profile, &record);
        let second = WorkoutAnalyzer::analyze(&profile, &record);
        assert_eq!(
            first.effort.effort_points.to_bits(),
            second.effort.effort_points.to_bits()
        );
        assert_eq!(first, second);
    }
}
