use chrono::NaiveDate;
use ergrs::batch::{BatchConfig, BatchScorer};
use ergrs::calendar::EffortCalendar;
use ergrs::config::{AppConfig, AthleteConfig};
use ergrs::export::{self, DateRange, EffortReport, ExportFormat};
use ergrs::import::ImportManager;
use ergrs::models::AthleteDetails;
use std::fs;
use tempfile::tempdir;

const JSON_WORKOUTS: &str = r#"[
    {
        "id": "2k-test",
        "date": "2024-03-04",
        "total_distance_metres": 2000,
        "total_time_seconds": 425.0,
        "avg_heart_rate": 176,
        "avg_stroke_rate": 32
    },
    {
        "id": "steady",
        "date": "2024-03-05",
        "total_distance_metres": 10000,
        "total_time_seconds": 2580,
        "avg_stroke_rate": 20
    }
]"#;

const CSV_INTERVALS: &str = "distance,time,hr,spm\n\
1000,232,150,22\n\
1000,230,158,22\n\
1000,229,164,23\n\
1000,226,171,24\n";

fn write_fixture_dir() -> tempfile::TempDir {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("week.json"), JSON_WORKOUTS).unwrap();
    fs::write(dir.path().join("2024-03-04-4x1k.csv"), CSV_INTERVALS).unwrap();
    fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
    dir
}

#[test]
fn import_directory_reads_json_and_csv() {
    let dir = write_fixture_dir();
    let entries = ImportManager::new().import_directory(dir.path(), false).unwrap();

    assert_eq!(entries.len(), 3);

    // Files are read in name order, so the CSV comes first
    let csv_entry = &entries[0];
    assert_eq!(csv_entry.id, "2024-03-04-4x1k");
    assert_eq!(csv_entry.record.total_distance_metres, 4000.0);
    assert_eq!(csv_entry.record.total_time_seconds, 917.0);
    assert_eq!(csv_entry.record.interval_slice().len(), 4);
    assert_eq!(csv_entry.record.hr_tagged_intervals().len(), 4);

    assert_eq!(entries[1].id, "2k-test");
    assert_eq!(entries[2].record.avg_heart_rate, None);
}

#[test]
fn batch_score_then_calendar() {
    let dir = write_fixture_dir();
    let entries = ImportManager::new().import_directory(dir.path(), false).unwrap();

    let scorer = BatchScorer::with_config(BatchConfig {
        num_threads: Some(2),
        show_progress: false,
        continue_on_error: true,
    });
    let (scored, summary) = scorer.score(&Default::default(), entries).unwrap();
    assert_eq!(summary.scored, 3);

    // The interval session has drift detail; the steady row has no heart rate
    let intervals = &scored[0];
    let hra = intervals.analysis.heart_rate.analysis().unwrap();
    assert!(hra.has_detailed_data);
    assert!(hra.drift.is_some());
    assert!(!scored[2].analysis.heart_rate.is_available());

    let days = EffortCalendar::aggregate(&scored);
    let monday = &days[&NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()];
    assert_eq!(monday.workout_count, 2);

    let range = EffortCalendar::range(
        &days,
        NaiveDate::from_ymd_opt(2024, 3, 3).unwrap(),
        NaiveDate::from_ymd_opt(2024, 3, 6).unwrap(),
    )
    .unwrap();
    let counts: Vec<u32> = range.iter().map(|d| d.workout_count).collect();
    assert_eq!(counts, vec![0, 2, 1, 0]);
}

#[test]
fn export_report_in_every_format() {
    let dir = write_fixture_dir();
    let entries = ImportManager::new().import_directory(dir.path(), false).unwrap();
    let (scored, _) = BatchScorer::with_config(BatchConfig {
        num_threads: None,
        show_progress: false,
        continue_on_error: true,
    })
    .score(&Default::default(), entries)
    .unwrap();

    let report = EffortReport::build(&scored, DateRange::default());
    let out = tempdir().unwrap();

    let json_path = out.path().join("report.json");
    export::export_report(&report, ExportFormat::Json, &json_path).unwrap();
    let parsed: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(parsed["summary"]["total_workouts"], 3);
    assert_eq!(parsed["workouts"][2]["analysis"]["heart_rate"]["status"], "unavailable");

    let csv_path = out.path().join("report.csv");
    export::export_report(&report, ExportFormat::Csv, &csv_path).unwrap();
    let csv = fs::read_to_string(&csv_path).unwrap();
    assert_eq!(csv.lines().count(), 4);

    let text_path = out.path().join("report.txt");
    export::export_report(&report, ExportFormat::Text, &text_path).unwrap();
    let text = fs::read_to_string(&text_path).unwrap();
    assert!(text.contains("Workouts: 3"));
    assert!(text.contains("2k-test") || text.contains("2024-03-04"));
}

#[test]
fn scored_workouts_round_trip_through_json() {
    let dir = write_fixture_dir();
    let entries = ImportManager::new()
        .import_file(&dir.path().join("week.json"))
        .unwrap();
    let (scored, _) = BatchScorer::with_config(BatchConfig {
        num_threads: Some(1),
        show_progress: false,
        continue_on_error: false,
    })
    .score(&Default::default(), entries)
    .unwrap();

    let json = serde_json::to_string(&scored).unwrap();
    let back: Vec<ergrs::ScoredWorkout> = serde_json::from_str(&json).unwrap();
    assert_eq!(back.len(), scored.len());
    for (restored, original) in back.iter().zip(&scored) {
        assert_eq!(restored.entry.id, original.entry.id);
        assert_eq!(restored.entry.date, original.entry.date);
        assert_eq!(restored.analysis.effort.zone, original.analysis.effort.zone);
        let delta =
            restored.analysis.effort.effort_points - original.analysis.effort.effort_points;
        assert!(delta.abs() < 1e-9);
        assert_eq!(
            restored.analysis.heart_rate.is_available(),
            original.analysis.heart_rate.is_available()
        );
    }
}

#[test]
fn configured_athlete_changes_the_score() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.toml");
    let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();

    let mut config = AppConfig::default();
    let athlete = AthleteConfig::new("Masters Rower".to_string(), Some("masters".to_string()))
        .with_details(AthleteDetails {
            date_of_birth: NaiveDate::from_ymd_opt(1964, 1, 1),
            weight_kg: Some(90.0),
            height_cm: Some(188.0),
            max_hr: Some(170.0),
            resting_hr: Some(55.0),
        });
    config.add_athlete(athlete);
    config.save_to_file(&config_path).unwrap();

    let loaded = AppConfig::load_from_file(&config_path).unwrap();
    let masters = loaded.resolve_profile(None, today).unwrap();
    assert_eq!(masters.age, 60.0);
    assert_eq!(masters.max_hr, 170.0);

    let defaults = loaded.resolve_profile(Some("missing"), today);
    assert!(defaults.is_err());

    let entries = ImportManager::new()
        .import_file(&write_fixture_dir().path().join("week.json"))
        .unwrap();
    let record = &entries[0].record;
    let masters_points = ergrs::EffortCalculator::effort_points(&masters, record);
    let default_points = ergrs::EffortCalculator::effort_points(&Default::default(), record);
    assert!(masters_points > default_points);
}
