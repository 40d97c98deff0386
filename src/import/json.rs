use serde::Deserialize;
use std::path::Path;

use crate::error::{ImportExportError, Result};
use crate::import::{validation::WorkoutValidator, ImportFormat};
use crate::models::WorkoutEntry;

/// A JSON workout file holds either one entry or a list of them
#[derive(Deserialize)]
#[serde(untagged)]
enum JsonPayload {
    Many(Vec<WorkoutEntry>),
    One(Box<WorkoutEntry>),
}

/// JSON workout importer
pub struct JsonImporter;

impl JsonImporter {
    pub fn new() -> Self {
        Self
    }

    /// Parse and validate entries from a JSON string
    pub fn parse_str(content: &str) -> Result<Vec<WorkoutEntry>> {
        let payload: JsonPayload =
            serde_json::from_str(content).map_err(|e| ImportExportError::ParseError {
                format: "JSON".to_string(),
                reason: e.to_string(),
            })?;

        let mut entries = match payload {
            JsonPayload::Many(entries) => entries,
            JsonPayload::One(entry) => vec![*entry],
        };

        for entry in &mut entries {
            WorkoutValidator::validate_record(&mut entry.record)?;
        }

        Ok(entries)
    }
}

impl Default for JsonImporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ImportFormat for JsonImporter {
    fn can_import(&self, file_path: &Path) -> bool {
        file_path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
    }

    fn import_file(&self, file_path: &Path) -> Result<Vec<WorkoutEntry>> {
        let content = std::fs::read_to_string(file_path)?;
        Self::parse_str(&content)
    }

    fn get_format_name(&self) -> &'static str {
        "JSON"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErgRsError;

    #[test]
    fn test_parse_single_entry() {
        let json = r#"{
            "id": "morning-2k",
            "date": "2024-03-02",
            "total_distance_metres": 2000,
            "total_time_seconds": 425.3,
            "avg_heart_rate": 172
        }"#;

        let entries = JsonImporter::parse_str(json).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, "morning-2k");
        assert_eq!(entries[0].record.avg_heart_rate, Some(172.0));
        assert!(entries[0].record.intervals.is_none());
    }

    #[test]
    fn test_parse_list_with_intervals() {
        let json = r#"[
            {
                "id": "a",
                "date": "2024-03-02",
                "total_distance_metres": 1000,
                "total_time_seconds": 220,
                "intervals": [
                    {
                        "distance_metres": 500,
                        "time_seconds": 112,
                        "pace_seconds": 112,
                        "avg_heart_rate": 150
                    },
                    {"distance_metres": 500, "time_seconds": 108, "pace_seconds": 108}
                ]
            },
            {
                "id": "b",
                "date": "2024-03-03",
                "total_distance_metres": 5000,
                "total_time_seconds": 1260
            }
        ]"#;

        let entries = JsonImporter::parse_str(json).unwrap();
        assert_eq!(entries.len(), 2);
        let intervals = entries[0].record.intervals.as_ref().unwrap();
        assert_eq!(intervals.len(), 2);
        assert_eq!(intervals[1].avg_heart_rate, None);
    }

    #[test]
    fn test_rejects_malformed_and_invalid() {
        assert!(matches!(
            JsonImporter::parse_str("{not json"),
            Err(ErgRsError::ImportExport(ImportExportError::ParseError { .. }))
        ));

        let json = r#"{
            "id": "x",
            "date": "2024-03-02",
            "total_distance_metres": -5,
            "total_time_seconds": 100
        }"#;
        assert!(matches!(
            JsonImporter::parse_str(json),
            Err(ErgRsError::Validation(_))
        ));
    }

    #[test]
    fn test_can_import_by_extension() {
        let importer = JsonImporter::new();
        assert!(importer.can_import(Path::new("workouts.JSON")));
        assert!(!importer.can_import(Path::new("workouts.csv")));
    }
}
