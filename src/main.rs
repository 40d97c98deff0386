use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use colored::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};

use ergrs::batch::{BatchConfig, BatchScorer};
use ergrs::calendar::{DailyEffort, EffortCalendar};
use ergrs::config::{AppConfig, AthleteConfig, CONFIG_KEYS};
use ergrs::effort::EffortZone;
use ergrs::export::{self, DateRange, EffortReport, ExportFormat};
use ergrs::heart_rate::HraResult;
use ergrs::import::ImportManager;
use ergrs::logging::{init_logging, LogLevel};
use ergrs::models::{AthleteDetails, AthleteProfile, WorkoutEntry};
use ergrs::{power, share_text, ScoredWorkout, WorkoutAnalyzer, ZoneCalculator};

/// ergrs - Rowing effort and heart rate analysis CLI
///
/// Scores indoor rowing workouts with Effort Points (0-100) and analyzes
/// heart rate against Karvonen training zones.
#[derive(Parser)]
#[command(name = "ergrs")]
#[command(version)]
#[command(about = "Rowing effort and heart rate analysis CLI", long_about = None)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase verbosity of output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score workouts from a JSON or CSV file
    Score {
        /// Input file (JSON or CSV)
        #[arg(short, long)]
        file: PathBuf,

        /// Athlete ID (defaults to the active athlete)
        #[arg(short, long)]
        athlete: Option<String>,

        /// Print the full analysis as JSON
        #[arg(long)]
        json: bool,

        /// Print a one-line share text per workout
        #[arg(long)]
        share: bool,
    },

    /// Score every workout in a file or directory in parallel
    Batch {
        /// Input file or directory
        #[arg(short, long)]
        input: PathBuf,

        /// Athlete ID (defaults to the active athlete)
        #[arg(short, long)]
        athlete: Option<String>,

        /// Write a report to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Report format (json, csv, text)
        #[arg(short = 'f', long, default_value = "json")]
        format: String,

        /// Worker threads (defaults to the configured value)
        #[arg(short, long)]
        threads: Option<usize>,

        /// Hide the progress bar
        #[arg(long)]
        no_progress: bool,
    },

    /// Show daily effort totals over a date range
    Calendar {
        /// Input file or directory
        #[arg(short, long)]
        input: PathBuf,

        /// Athlete ID (defaults to the active athlete)
        #[arg(short, long)]
        athlete: Option<String>,

        /// Date range start (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// Date range end (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,

        /// Show ISO week totals instead of days
        #[arg(short, long)]
        weekly: bool,

        /// Write the daily totals as CSV
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show Karvonen heart rate zones
    Zones {
        /// Athlete ID (defaults to the active athlete)
        #[arg(short, long)]
        athlete: Option<String>,

        /// Override maximum heart rate
        #[arg(long)]
        max_hr: Option<f64>,

        /// Override resting heart rate
        #[arg(long)]
        resting_hr: Option<f64>,
    },

    /// Configure application settings
    Config {
        /// List all configuration options
        #[arg(short, long)]
        list: bool,

        /// Set a configuration value (key=value)
        #[arg(short, long)]
        set: Option<String>,

        /// Get a configuration value
        #[arg(short, long)]
        get: Option<String>,

        /// Add an athlete by name
        #[arg(long, value_name = "NAME")]
        add_athlete: Option<String>,

        /// Date of birth for the new athlete (YYYY-MM-DD)
        #[arg(long, requires = "add_athlete")]
        dob: Option<String>,

        /// Weight in kg for the new athlete
        #[arg(long, requires = "add_athlete")]
        weight: Option<f64>,

        /// Maximum heart rate for the new athlete
        #[arg(long, requires = "add_athlete")]
        max_hr: Option<f64>,

        /// Resting heart rate for the new athlete
        #[arg(long, requires = "add_athlete")]
        resting_hr: Option<f64>,
    },
}

#[derive(Tabled)]
struct ScoreRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Workout")]
    id: String,
    #[tabled(rename = "Distance")]
    distance: String,
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Pace/500m")]
    pace: String,
    #[tabled(rename = "EP")]
    points: String,
    #[tabled(rename = "Zone")]
    zone: String,
    #[tabled(rename = "Cardiac")]
    cardiac: String,
    #[tabled(rename = "Work")]
    work: String,
    #[tabled(rename = "Pacing")]
    pacing: String,
    #[tabled(rename = "Economy")]
    economy: String,
}

impl From<&ScoredWorkout> for ScoreRow {
    fn from(workout: &ScoredWorkout) -> Self {
        let record = &workout.entry.record;
        let effort = &workout.analysis.effort;
        ScoreRow {
            date: workout.entry.date.to_string(),
            id: workout.entry.id.clone(),
            distance: format!("{:.0}m", record.total_distance_metres),
            time: power::format_duration(record.total_time_seconds),
            pace: power::format_duration(power::pace_per_500m(
                record.total_distance_metres,
                record.total_time_seconds,
            )),
            points: format!("{:.1}", effort.effort_points),
            zone: effort.zone.label().to_string(),
            cardiac: format!("{:.1}", effort.breakdown.cardiac_load),
            work: format!("{:.1}", effort.breakdown.work_output),
            pacing: format!("{:.1}", effort.breakdown.pacing),
            economy: format!("{:.1}", effort.breakdown.economy),
        }
    }
}

#[derive(Tabled)]
struct ZoneRow {
    #[tabled(rename = "Zone")]
    zone: String,
    #[tabled(rename = "Min bpm")]
    min: String,
    #[tabled(rename = "Max bpm")]
    max: String,
    #[tabled(rename = "Effect")]
    effect: String,
}

#[derive(Tabled)]
struct DayRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Workouts")]
    count: u32,
    #[tabled(rename = "Total EP")]
    total: String,
    #[tabled(rename = "Avg EP")]
    average: String,
    #[tabled(rename = "Zone")]
    zone: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_or_default(cli.config.as_deref());

    let mut log_config = config.logging.clone();
    if cli.verbose > 0 {
        log_config.level = LogLevel::from_verbosity(cli.verbose);
    }
    init_logging(&log_config)?;

    let today = chrono::Local::now().date_naive();

    match cli.command {
        Commands::Score {
            file,
            athlete,
            json,
            share,
        } => {
            let profile = config.resolve_profile(athlete.as_deref(), today)?;
            let entries = import_entries(&file, false)?;
            let scored: Vec<ScoredWorkout> = entries
                .into_iter()
                .map(|entry| WorkoutAnalyzer::score_entry(&profile, entry))
                .collect();

            if json {
                println!("{}", serde_json::to_string_pretty(&scored)?);
            } else if share {
                for workout in &scored {
                    println!("{}", share_text(&workout.entry, &workout.analysis.effort));
                }
            } else {
                print_scores(&scored);
                for workout in &scored {
                    print_heart_rate(workout);
                }
            }
        }

        Commands::Batch {
            input,
            athlete,
            output,
            format,
            threads,
            no_progress,
        } => {
            let profile = config.resolve_profile(athlete.as_deref(), today)?;
            let format: ExportFormat = format.parse()?;

            let mut batch_config = BatchConfig::from(&config.batch);
            if threads.is_some() {
                batch_config.num_threads = threads;
            }
            if no_progress {
                batch_config.show_progress = false;
            }

            let entries = import_entries(&input, batch_config.show_progress)?;
            let (scored, summary) =
                BatchScorer::with_config(batch_config).score(&profile, entries)?;

            println!("{}", summary.to_string_pretty());
            for (id, reason) in &summary.errors {
                println!("  {} {}: {}", "✗".red(), id, reason);
            }

            match output {
                Some(path) => {
                    let report = EffortReport::build(&scored, DateRange::default());
                    export::export_report(&report, format, &path)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    println!("{} {}", "✓ Report written to".green(), path.display());
                }
                None => print_scores(&scored),
            }
        }

        Commands::Calendar {
            input,
            athlete,
            from,
            to,
            weekly,
            output,
        } => {
            let profile = config.resolve_profile(athlete.as_deref(), today)?;
            let scored: Vec<ScoredWorkout> = import_entries(&input, false)?
                .into_iter()
                .map(|entry| WorkoutAnalyzer::score_entry(&profile, entry))
                .collect();

            let days = EffortCalendar::aggregate(&scored);
            let start = match from {
                Some(s) => parse_date(&s)?,
                None => days.keys().next().copied().unwrap_or(today),
            };
            let end = match to {
                Some(s) => parse_date(&s)?,
                None => days.keys().next_back().copied().unwrap_or(today),
            };
            let range = EffortCalendar::range(&days, start, end)?;

            if weekly {
                let in_range: BTreeMap<NaiveDate, DailyEffort> = days
                    .range(start..=end)
                    .map(|(date, day)| (*date, day.clone()))
                    .collect();
                for week in EffortCalendar::weekly_totals(&in_range).values() {
                    println!(
                        "{}-W{:02}  {} workouts on {} days  {} EP",
                        week.iso_year,
                        week.week,
                        week.workout_count,
                        week.active_days,
                        week.total_points.to_string().bold()
                    );
                }
            } else {
                let rows: Vec<DayRow> = range
                    .iter()
                    .map(|day| DayRow {
                        date: day.date.format("%a %Y-%m-%d").to_string(),
                        count: day.workout_count,
                        total: day.total_points.to_string(),
                        average: day.average_points.to_string(),
                        zone: day
                            .zone
                            .map(|z| z.label().to_string())
                            .unwrap_or_else(|| "rest".to_string()),
                    })
                    .collect();
                println!("{}", Table::new(rows).with(Style::rounded()));
            }

            if let Some(path) = output {
                export::csv::export_daily_effort(&range, &path)?;
                println!("{} {}", "✓ Daily totals written to".green(), path.display());
            }
        }

        Commands::Zones {
            athlete,
            max_hr,
            resting_hr,
        } => {
            let mut profile = config.resolve_profile(athlete.as_deref(), today)?;
            if let Some(max_hr) = max_hr {
                profile.max_hr = max_hr;
            }
            if let Some(resting_hr) = resting_hr {
                profile.resting_hr = resting_hr;
            }
            print_zones(&profile);
        }

        Commands::Config {
            list,
            set,
            get,
            add_athlete,
            dob,
            weight,
            max_hr,
            resting_hr,
        } => {
            let config_path = cli.config.clone().unwrap_or_else(AppConfig::default_config_path);

            if list {
                println!("{}", format!("Configuration ({})", config_path.display()).bold());
                for key in CONFIG_KEYS {
                    println!("  {} = {}", key.cyan(), config.get_value(key)?);
                }
                for athlete in config.athletes.values() {
                    let is_default =
                        config.default_athlete_id.as_deref() == Some(athlete.id.as_str());
                    let marker = if is_default { "*" } else { " " };
                    println!("  {} athlete {} ({})", marker, athlete.name, athlete.id.dimmed());
                }
            } else if let Some(key_value) = set {
                let (key, value) = key_value
                    .split_once('=')
                    .ok_or_else(|| anyhow!("Expected key=value, got {}", key_value))?;
                config.set_value(key.trim(), value.trim())?;
                config.save_to_file(&config_path)?;
                println!("{} {} = {}", "✓ Set".green(), key.trim(), value.trim());
            } else if let Some(key) = get {
                println!("{}", config.get_value(&key)?);
            } else if let Some(name) = add_athlete {
                let details = AthleteDetails {
                    date_of_birth: dob.as_deref().map(parse_date).transpose()?,
                    weight_kg: weight,
                    height_cm: None,
                    max_hr,
                    resting_hr,
                };
                let athlete = AthleteConfig::new(name, None).with_details(details);
                let id = athlete.id.clone();
                config.add_athlete(athlete);
                config.save_to_file(&config_path)?;
                println!("{} {}", "✓ Added athlete".green(), id);
            } else {
                println!("Nothing to do. Try --list, --get, --set or --add-athlete.");
            }
        }
    }

    Ok(())
}

fn import_entries(path: &Path, show_progress: bool) -> Result<Vec<WorkoutEntry>> {
    let entries = ImportManager::new()
        .import_path(path, show_progress)
        .map_err(|e| anyhow!(e.user_message()))
        .with_context(|| format!("Failed to import {}", path.display()))?;

    if entries.is_empty() {
        return Err(anyhow!("No workouts found in {}", path.display()));
    }
    Ok(entries)
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .with_context(|| format!("Invalid date (expected YYYY-MM-DD): {}", value))
}

fn colored_zone(zone: EffortZone) -> ColoredString {
    match zone {
        EffortZone::Recovery => zone.label().blue(),
        EffortZone::Building => zone.label().green(),
        EffortZone::Training => zone.label().yellow(),
        EffortZone::Peak => zone.label().red().bold(),
    }
}

fn print_scores(scored: &[ScoredWorkout]) {
    if scored.is_empty() {
        println!("{}", "No workouts scored".yellow());
        return;
    }

    let rows: Vec<ScoreRow> = scored.iter().map(ScoreRow::from).collect();
    println!("{}", Table::new(rows).with(Style::rounded()));

    for workout in scored {
        let effort = &workout.analysis.effort;
        println!(
            "{} {:.1} EP, {}: {}",
            workout.entry.id.bold(),
            effort.effort_points,
            colored_zone(effort.zone),
            effort.zone.description()
        );
    }
}

fn print_heart_rate(workout: &ScoredWorkout) {
    let HraResult::Available(hra) = &workout.analysis.heart_rate else {
        println!("{} no heart rate data", workout.entry.id.dimmed());
        return;
    };

    println!("\n{}", format!("Heart rate: {}", workout.entry.id).cyan().bold());
    println!(
        "  {} bpm, {}% of max, {}% HRR",
        hra.intensity.bpm, hra.intensity.percent_max, hra.intensity.percent_hrr
    );
    println!("  Z{} {}: {}", hra.zone.number, hra.zone.name, hra.zone.training_effect);
    println!(
        "  Efficiency {:.2} W/beat ({:?})",
        hra.efficiency.watts_per_beat, hra.efficiency.rating
    );

    if let Some(drift) = &hra.drift {
        println!(
            "  Cardiac drift {:+.1}% (power {:+.1}%), {:?}",
            drift.drift_percent, -drift.power_drop_percent, drift.rating
        );
    }
    if let Some(trend) = &hra.trend {
        println!(
            "  Trend {:?}: +{:.0} early, +{:.0} late, +{:.0} total",
            trend.pattern, trend.early_rise, trend.late_rise, trend.total_rise
        );
    }
    if let Some(distribution) = &hra.zone_distribution {
        for zone_time in distribution {
            println!(
                "  {:<10} {:>8} {:>5.1}%",
                zone_time.name,
                power::format_duration(zone_time.seconds),
                zone_time.percent
            );
        }
    }
}

fn print_zones(profile: &AthleteProfile) {
    let zones = ZoneCalculator::heart_rate_zones(profile);
    println!(
        "{}",
        format!(
            "Karvonen zones (max {:.0}, resting {:.0})",
            profile.max_hr, profile.resting_hr
        )
        .bold()
    );

    let rows: Vec<ZoneRow> = zones
        .ranges
        .iter()
        .map(|range| ZoneRow {
            zone: range.zone.to_string(),
            min: format!("{:.0}", range.min_hr),
            max: format!("{:.0}", range.max_hr),
            effect: range.zone.training_effect().to_string(),
        })
        .collect();
    println!("{}", Table::new(rows).with(Style::rounded()));
}
