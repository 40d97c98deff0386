use chrono::{NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::analysis::ScoredWorkout;
use crate::calendar::{EffortCalendar, WeeklyEffort};
use crate::effort::EffortZone;
use crate::error::{ImportExportError, Result};

pub mod csv;
pub mod json;
pub mod text;

/// Export format types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportFormat {
    Json,
    Csv,
    Text,
}

impl std::str::FromStr for ExportFormat {
    type Err = ImportExportError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            "text" | "txt" => Ok(ExportFormat::Text),
            _ => Err(ImportExportError::UnsupportedFormat {
                format: s.to_string(),
            }),
        }
    }
}

/// Date range filter for exports
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        DateRange { start, end }
    }

    /// Check if a date falls within this range
    pub fn contains(&self, date: &NaiveDate) -> bool {
        let after_start = self.start.map_or(true, |start| date >= &start);
        let before_end = self.end.map_or(true, |end| date <= &end);
        after_start && before_end
    }

    pub fn filter_workouts<'a>(&self, workouts: &'a [ScoredWorkout]) -> Vec<&'a ScoredWorkout> {
        workouts
            .iter()
            .filter(|w| self.contains(&w.entry.date))
            .collect()
    }
}

/// Headline numbers for a set of scored workouts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total_workouts: usize,
    pub total_distance_metres: f64,
    pub total_time_seconds: f64,
    pub total_points: Decimal,
    pub average_points: Decimal,
    /// Number of workouts per effort zone label
    pub zone_counts: BTreeMap<String, usize>,
    /// Workouts that carried heart rate
    pub heart_rate_workouts: usize,
}

/// Effort report over a date range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffortReport {
    pub generated_at: chrono::DateTime<Utc>,
    pub date_range: DateRange,
    pub summary: ReportSummary,
    pub weekly: Vec<WeeklyEffort>,
    pub workouts: Vec<ScoredWorkout>,
}

impl EffortReport {
    /// Build a report from the workouts that fall within `date_range`
    pub fn build(workouts: &[ScoredWorkout], date_range: DateRange) -> Self {
        let workouts: Vec<ScoredWorkout> = date_range
            .filter_workouts(workouts)
            .into_iter()
            .cloned()
            .collect();

        let days = EffortCalendar::aggregate(&workouts);
        let total_points: Decimal = days.values().map(|day| day.total_points).sum();
        let average_points = if workouts.is_empty() {
            Decimal::ZERO
        } else {
            (total_points / Decimal::from(workouts.len()))
                .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
        };

        let mut zone_counts = BTreeMap::new();
        for zone in [
            EffortZone::Recovery,
            EffortZone::Building,
            EffortZone::Training,
            EffortZone::Peak,
        ] {
            let count = workouts
                .iter()
                .filter(|w| w.analysis.effort.zone == zone)
                .count();
            zone_counts.insert(zone.label().to_string(), count);
        }

        let summary = ReportSummary {
            total_workouts: workouts.len(),
            total_distance_metres: workouts
                .iter()
                .map(|w| w.entry.record.total_distance_metres)
                .sum(),
            total_time_seconds: workouts
                .iter()
                .map(|w| w.entry.record.total_time_seconds)
                .sum(),
            total_points,
            average_points,
            zone_counts,
            heart_rate_workouts: workouts
                .iter()
                .filter(|w| w.analysis.heart_rate.is_available())
                .count(),
        };

        EffortReport {
            generated_at: Utc::now(),
            date_range,
            summary,
            weekly: EffortCalendar::weekly_totals(&days).into_values().collect(),
            workouts,
        }
    }
}

/// Write a report in the requested format
pub fn export_report<P: AsRef<Path>>(
    report: &EffortReport,
    format: ExportFormat,
    output_path: P,
) -> Result<()> {
    match format {
        ExportFormat::Json => json::export_json(report, output_path),
        ExportFormat::Csv => csv::export_scored_workouts(&report.workouts, output_path),
        ExportFormat::Text => text::export_report(report, output_path),
    }
}
