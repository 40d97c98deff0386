use serde::Serialize;
use std::path::Path;

use crate::analysis::ScoredWorkout;
use crate::calendar::DailyEffort;
use crate::error::{ImportExportError, Result};
use crate::power;

/// One CSV row per scored workout
#[derive(Debug, Serialize)]
struct WorkoutRow<'a> {
    id: &'a str,
    date: String,
    distance_m: f64,
    time_s: f64,
    pace_500m: String,
    avg_watts: f64,
    avg_hr: Option<f64>,
    avg_stroke_rate: Option<f64>,
    effort_points: f64,
    effort_zone: &'a str,
    cardiac_load: f64,
    work_output: f64,
    pacing: f64,
    economy: f64,
    hr_zone: Option<u8>,
    percent_hrr: Option<f64>,
    watts_per_beat: Option<f64>,
}

impl<'a> WorkoutRow<'a> {
    fn from_scored(workout: &'a ScoredWorkout) -> Self {
        let record = &workout.entry.record;
        let effort = &workout.analysis.effort;
        let hra = workout.analysis.heart_rate.analysis();

        WorkoutRow {
            id: &workout.entry.id,
            date: workout.entry.date.format("%Y-%m-%d").to_string(),
            distance_m: record.total_distance_metres,
            time_s: record.total_time_seconds,
            pace_500m: power::format_duration(power::pace_per_500m(
                record.total_distance_metres,
                record.total_time_seconds,
            )),
            avg_watts: round1(power::watts(
                record.total_distance_metres,
                record.total_time_seconds,
            )),
            avg_hr: record.avg_heart_rate,
            avg_stroke_rate: record.avg_stroke_rate,
            effort_points: effort.effort_points,
            effort_zone: effort.zone.label(),
            cardiac_load: round1(effort.breakdown.cardiac_load),
            work_output: round1(effort.breakdown.work_output),
            pacing: round1(effort.breakdown.pacing),
            economy: round1(effort.breakdown.economy),
            hr_zone: hra.map(|a| a.zone.number),
            percent_hrr: hra.map(|a| a.intensity.percent_hrr),
            watts_per_beat: hra.map(|a| a.efficiency.watts_per_beat),
        }
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn export_failed(path: &Path, e: ::csv::Error) -> ImportExportError {
    ImportExportError::ExportFailed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    }
}

/// Export scored workouts, one row each
pub fn export_scored_workouts<P: AsRef<Path>>(
    workouts: &[ScoredWorkout],
    output_path: P,
) -> Result<()> {
    let output_path = output_path.as_ref();
    let mut writer =
        ::csv::Writer::from_path(output_path).map_err(|e| export_failed(output_path, e))?;

    for workout in workouts {
        writer
            .serialize(WorkoutRow::from_scored(workout))
            .map_err(|e| export_failed(output_path, e))?;
    }

    writer.flush()?;
    Ok(())
}

/// Export daily effort totals (rest days included when present)
pub fn export_daily_effort<P: AsRef<Path>>(days: &[DailyEffort], output_path: P) -> Result<()> {
    let output_path = output_path.as_ref();
    let mut writer =
        ::csv::Writer::from_path(output_path).map_err(|e| export_failed(output_path, e))?;

    writer
        .write_record(["date", "workout_count", "total_points", "average_points", "zone"])
        .map_err(|e| export_failed(output_path, e))?;

    for day in days {
        writer
            .write_record([
                day.date.format("%Y-%m-%d").to_string(),
                day.workout_count.to_string(),
                day.total_points.to_string(),
                day.average_points.to_string(),
                day.zone.map(|z| z.label().to_string()).unwrap_or_default(),
            ])
            .map_err(|e| export_failed(output_path, e))?;
    }

    writer.flush()?;
    Ok(())
}
