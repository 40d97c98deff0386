use chrono::NaiveDate;
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::path::Path;

use crate::error::{ErgRsError, ImportExportError, Result};
use crate::import::{validation::WorkoutValidator, ImportFormat};
use crate::models::{Interval, WorkoutEntry, WorkoutRecord};

/// CSV importer for monitor interval exports
///
/// Each row is one split; the file as a whole is one workout. The workout
/// date comes from a `date` column or a `YYYY-MM-DD` prefix on the file name.
pub struct CsvImporter {
    column_mapping: HashMap<String, String>,
}

/// One parsed row before totals are rolled up
struct IntervalRow {
    distance: f64,
    time: f64,
    pace: Option<f64>,
    heart_rate: Option<f64>,
    stroke_rate: Option<f64>,
}

impl CsvImporter {
    pub fn new() -> Self {
        let mut column_mapping = HashMap::new();

        Self::add_mapping(
            &mut column_mapping,
            "distance",
            &["distance", "dist", "metres", "meters", "distance_metres"],
        );
        Self::add_mapping(
            &mut column_mapping,
            "time",
            &["time", "seconds", "duration", "time_seconds"],
        );
        Self::add_mapping(
            &mut column_mapping,
            "pace",
            &["pace", "split", "pace_seconds", "pace_500m"],
        );
        Self::add_mapping(
            &mut column_mapping,
            "heart_rate",
            &["heart_rate", "hr", "heartrate", "bpm", "avg_heart_rate"],
        );
        Self::add_mapping(
            &mut column_mapping,
            "stroke_rate",
            &["stroke_rate", "spm", "rate", "strokes_per_minute"],
        );
        Self::add_mapping(&mut column_mapping, "date", &["date", "workout_date"]);

        Self { column_mapping }
    }

    fn add_mapping(mapping: &mut HashMap<String, String>, standard: &str, variations: &[&str]) {
        for variation in variations {
            mapping.insert(variation.to_lowercase(), standard.to_string());
        }
    }

    fn normalize_column_name(&self, name: &str) -> String {
        let normalized = name.trim().to_lowercase().replace([' ', '-'], "_");

        self.column_mapping
            .get(&normalized)
            .cloned()
            .unwrap_or(normalized)
    }

    /// Parse CSV content into a single workout entry identified by `stem`
    pub fn parse_str(&self, content: &str, stem: &str) -> Result<WorkoutEntry> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(content.as_bytes());

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| parse_error(e.to_string()))?
            .iter()
            .map(|h| self.normalize_column_name(h))
            .collect();

        let column = |name: &str| headers.iter().position(|h| h == name);
        let distance_col = column("distance").ok_or_else(|| missing("distance"))?;
        let time_col = column("time").ok_or_else(|| missing("time"))?;
        let pace_col = column("pace");
        let hr_col = column("heart_rate");
        let rate_col = column("stroke_rate");
        let date_col = column("date");

        let mut rows = Vec::new();
        let mut row_date = None;

        for (index, record) in reader.records().enumerate() {
            let record = record.map_err(|e| parse_error(e.to_string()))?;
            let line = index + 2;

            let field = |col: Option<usize>| {
                col.and_then(|c| record.get(c))
                    .map(str::trim)
                    .filter(|value| !value.is_empty())
            };

            if row_date.is_none() {
                if let Some(value) = field(date_col) {
                    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
                        parse_error(format!("line {}: invalid date '{}'", line, value))
                    })?;
                    row_date = Some(date);
                }
            }

            let number = |col: Option<usize>, name: &str| -> Result<Option<f64>> {
                field(col)
                    .map(|value| {
                        value.parse::<f64>().map_err(|_| {
                            parse_error(format!("line {}: invalid {} '{}'", line, name, value))
                        })
                    })
                    .transpose()
            };

            let distance = number(Some(distance_col), "distance")?;
            let time = number(Some(time_col), "time")?;
            let (distance, time) = match (distance, time) {
                (Some(d), Some(t)) => (d, t),
                // Summary or blank rows carry no split
                _ => continue,
            };

            rows.push(IntervalRow {
                distance,
                time,
                pace: number(pace_col, "pace")?,
                heart_rate: number(hr_col, "heart_rate")?,
                stroke_rate: number(rate_col, "stroke_rate")?,
            });
        }

        if rows.is_empty() {
            return Err(ImportExportError::InvalidStructure {
                reason: "no interval rows found".to_string(),
            }
            .into());
        }

        let date = row_date
            .or_else(|| date_from_stem(stem))
            .ok_or_else(|| missing("date"))?;

        let mut record = Self::build_record(&rows);
        WorkoutValidator::validate_record(&mut record)?;

        Ok(WorkoutEntry {
            id: stem.to_string(),
            date,
            record,
        })
    }

    /// Roll interval rows up into a workout record
    fn build_record(rows: &[IntervalRow]) -> WorkoutRecord {
        let total_distance: f64 = rows.iter().map(|r| r.distance).sum();
        let total_time: f64 = rows.iter().map(|r| r.time).sum();

        let intervals = rows
            .iter()
            .map(|row| Interval {
                distance_metres: row.distance,
                time_seconds: row.time,
                pace_seconds: row.pace.unwrap_or(0.0),
                avg_heart_rate: row.heart_rate,
            })
            .collect();

        WorkoutRecord {
            total_distance_metres: total_distance,
            total_time_seconds: total_time,
            avg_heart_rate: time_weighted(rows, |r| {
                r.heart_rate
                    .filter(|&bpm| WorkoutValidator::is_plausible_heart_rate(bpm))
            }),
            avg_stroke_rate: time_weighted(rows, |r| {
                r.stroke_rate
                    .filter(|&spm| WorkoutValidator::is_plausible_stroke_rate(spm))
            }),
            intervals: Some(intervals),
        }
    }
}

/// Time-weighted mean over the rows carrying a value
fn time_weighted(
    rows: &[IntervalRow],
    value: impl Fn(&IntervalRow) -> Option<f64>,
) -> Option<f64> {
    let (weighted, seconds) = rows
        .iter()
        .filter_map(|row| value(row).map(|v| (v * row.time, row.time)))
        .fold((0.0, 0.0), |(sum, total), (v, t)| (sum + v, total + t));

    if seconds > 0.0 {
        Some(weighted / seconds)
    } else {
        None
    }
}

fn date_from_stem(stem: &str) -> Option<NaiveDate> {
    let prefix = stem.get(..10)?;
    NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()
}

fn parse_error(reason: String) -> ErgRsError {
    ImportExportError::ParseError {
        format: "CSV".to_string(),
        reason,
    }
    .into()
}

fn missing(field: &str) -> ErgRsError {
    ImportExportError::MissingData {
        field: field.to_string(),
    }
    .into()
}

impl Default for CsvImporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ImportFormat for CsvImporter {
    fn can_import(&self, file_path: &Path) -> bool {
        file_path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
    }

    fn import_file(&self, file_path: &Path) -> Result<Vec<WorkoutEntry>> {
        let content = std::fs::read_to_string(file_path)?;
        let stem = file_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("workout");

        Ok(vec![self.parse_str(&content, stem)?])
    }

    fn get_format_name(&self) -> &'static str {
        "CSV"
    }
}
