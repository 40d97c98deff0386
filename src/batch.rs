//! Parallel batch scoring using rayon
//!
//! Each workout is validated and scored independently on the pool. Results
//! come back in input order regardless of which worker finished first.

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::analysis::{ScoredWorkout, WorkoutAnalyzer};
use crate::config::BatchSettings;
use crate::error::{ErgRsError, Result};
use crate::import::validation::WorkoutValidator;
use crate::models::{AthleteProfile, WorkoutEntry};

/// Configuration for a batch scoring run
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Worker threads (None uses the rayon default)
    pub num_threads: Option<usize>,
    /// Show progress bar while scoring
    pub show_progress: bool,
    /// Skip invalid workouts instead of aborting the run
    pub continue_on_error: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            num_threads: None,
            show_progress: true,
            continue_on_error: true,
        }
    }
}

impl From<&BatchSettings> for BatchConfig {
    fn from(settings: &BatchSettings) -> Self {
        Self {
            num_threads: settings.num_threads,
            show_progress: settings.show_progress,
            continue_on_error: settings.continue_on_error,
        }
    }
}

/// Summary of a batch scoring run
#[derive(Debug, Clone)]
pub struct BatchSummary {
    pub total: usize,
    pub scored: usize,
    pub failed: usize,
    pub duration_ms: u128,
    /// Workout id and reason for each failure, in input order
    pub errors: Vec<(String, String)>,
}

impl BatchSummary {
    /// Workouts scored per second
    pub fn throughput_per_sec(&self) -> f64 {
        if self.duration_ms == 0 {
            return 0.0;
        }
        (self.scored as f64 / self.duration_ms as f64) * 1000.0
    }

    pub fn avg_time_per_workout_ms(&self) -> f64 {
        if self.scored == 0 {
            return 0.0;
        }
        self.duration_ms as f64 / self.scored as f64
    }

    pub fn is_fully_successful(&self) -> bool {
        self.failed == 0
    }

    pub fn to_string_pretty(&self) -> String {
        format!(
            "Batch Scoring Summary\n  \
             Total Workouts: {}\n  \
             Scored: {}\n  \
             Failed: {}\n  \
             Total Time: {:.2}s\n  \
             Throughput: {:.2} workouts/sec\n  \
             Avg Time/Workout: {:.3}ms",
            self.total,
            self.scored,
            self.failed,
            self.duration_ms as f64 / 1000.0,
            self.throughput_per_sec(),
            self.avg_time_per_workout_ms()
        )
    }
}

/// Scores many workouts for one athlete in parallel
pub struct BatchScorer {
    pub config: BatchConfig,
}

impl BatchScorer {
    pub fn new() -> Self {
        Self::with_config(BatchConfig::default())
    }

    pub fn with_config(config: BatchConfig) -> Self {
        Self { config }
    }

    /// Validate and score every entry
    ///
    /// With `continue_on_error` unset, the first invalid workout (in input
    /// order) aborts the run with a validation error.
    pub fn score(
        &self,
        profile: &AthleteProfile,
        entries: Vec<WorkoutEntry>,
    ) -> Result<(Vec<ScoredWorkout>, BatchSummary)> {
        let start_time = Instant::now();
        let total = entries.len();

        info!(total, threads = ?self.config.num_threads, "Starting batch scoring");

        let progress = if self.config.show_progress {
            let pb = ProgressBar::new(total as u64);
            if let Ok(style) = ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({msg})")
            {
                pb.set_style(style.progress_chars("#>-"));
            }
            pb
        } else {
            ProgressBar::hidden()
        };

        let outcomes = match self.config.num_threads {
            Some(num_threads) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(num_threads)
                    .build()
                    .map_err(|e| {
                        ErgRsError::Internal(format!("Failed to create thread pool: {}", e))
                    })?;
                pool.install(|| Self::score_parallel(profile, entries, &progress))
            }
            None => Self::score_parallel(profile, entries, &progress),
        };

        progress.finish_with_message("Complete");

        let mut scored = Vec::with_capacity(total);
        let mut errors = Vec::new();
        for outcome in outcomes {
            match outcome {
                Ok(workout) => scored.push(workout),
                Err((id, reason)) => {
                    if !self.config.continue_on_error {
                        return Err(ErgRsError::Validation(format!("workout {}: {}", id, reason)));
                    }
                    warn!(workout = %id, %reason, "Skipping invalid workout");
                    errors.push((id, reason));
                }
            }
        }

        let summary = BatchSummary {
            total,
            scored: scored.len(),
            failed: errors.len(),
            duration_ms: start_time.elapsed().as_millis(),
            errors,
        };

        info!(
            scored = summary.scored,
            failed = summary.failed,
            duration_ms = summary.duration_ms as u64,
            "Batch scoring complete"
        );

        Ok((scored, summary))
    }

    fn score_parallel(
        profile: &AthleteProfile,
        entries: Vec<WorkoutEntry>,
        progress: &ProgressBar,
    ) -> Vec<std::result::Result<ScoredWorkout, (String, String)>> {
        entries
            .into_par_iter()
            .map(|mut entry| {
                let outcome = match WorkoutValidator::validate_record(&mut entry.record) {
                    Ok(()) => {
                        debug!(workout = %entry.id, "Scoring workout");
                        Ok(WorkoutAnalyzer::score_entry(profile, entry))
                    }
                    Err(e) => Err((entry.id, e.to_string())),
                };
                progress.inc(1);
                outcome
            })
            .collect()
    }
}

impl Default for BatchScorer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WorkoutRecord;
    use chrono::NaiveDate;

    fn entry(id: &str, distance: f64, time: f64) -> WorkoutEntry {
        WorkoutEntry {
            id: id.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            record: WorkoutRecord {
                total_distance_metres: distance,
                total_time_seconds: time,
                avg_heart_rate: Some(150.0),
                ..Default::default()
            },
        }
    }

    fn quiet(continue_on_error: bool) -> BatchScorer {
        BatchScorer::with_config(BatchConfig {
            num_threads: Some(2),
            show_progress: false,
            continue_on_error,
        })
    }

    #[test]
    fn test_preserves_input_order() {
        let entries: Vec<_> = (0..50)
            .map(|i| entry(&format!("w{}", i), 1000.0 + i as f64 * 100.0, 240.0 + i as f64 * 20.0))
            .collect();

        let (scored, summary) = quiet(true)
            .score(&AthleteProfile::default(), entries)
            .unwrap();

        assert_eq!(summary.total, 50);
        assert_eq!(summary.scored, 50);
        assert!(summary.is_fully_successful());
        for (i, workout) in scored.iter().enumerate() {
            assert_eq!(workout.entry.id, format!("w{}", i));
        }
    }

    #[test]
    fn test_matches_sequential_scoring() {
        let profile = AthleteProfile::default();
        let entries = vec![entry("a", 2000.0, 420.0), entry("b", 6000.0, 1500.0)];

        let (scored, _) = quiet(true).score(&profile, entries.clone()).unwrap();
        for (workout, original) in scored.iter().zip(&entries) {
            let expected = WorkoutAnalyzer::analyze(&profile, &original.record);
            assert_eq!(workout.analysis, expected);
        }
    }

    #[test]
    fn test_collects_errors_when_continuing() {
        let entries = vec![entry("good", 2000.0, 420.0), entry("bad", -1.0, 420.0)];

        let (scored, summary) = quiet(true)
            .score(&AthleteProfile::default(), entries)
            .unwrap();

        assert_eq!(scored.len(), 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.errors[0].0, "bad");
    }

    #[test]
    fn test_aborts_when_not_continuing() {
        let entries = vec![entry("bad", 2000.0, f64::NAN), entry("good", 2000.0, 420.0)];

        let result = quiet(false).score(&AthleteProfile::default(), entries);
        assert!(matches!(result, Err(ErgRsError::Validation(ref msg)) if msg.contains("bad")));
    }

    #[test]
    fn test_summary_helpers() {
        let summary = BatchSummary {
            total: 10,
            scored: 8,
            failed: 2,
            duration_ms: 2000,
            errors: vec![],
        };
        assert_eq!(summary.throughput_per_sec(), 4.0);
        assert_eq!(summary.avg_time_per_workout_ms(), 250.0);
        assert!(!summary.is_fully_successful());
        assert!(summary.to_string_pretty().contains("Failed: 2"));
    }
}
