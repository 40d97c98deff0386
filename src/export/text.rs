use std::io::Write;
use std::path::Path;

use super::EffortReport;
use crate::error::Result;
use crate::heart_rate::HraResult;
use crate::power;

/// Write an effort report as plain text
pub fn write_report<W: Write>(report: &EffortReport, out: &mut W) -> std::io::Result<()> {
    let summary = &report.summary;

    writeln!(out, "{}", "=".repeat(60))?;
    writeln!(out, "EFFORT REPORT")?;
    writeln!(out, "{}", "=".repeat(60))?;
    writeln!(out, "Generated: {}", report.generated_at.format("%Y-%m-%d %H:%M:%S UTC"))?;

    match (report.date_range.start, report.date_range.end) {
        (Some(start), Some(end)) => {
            writeln!(out, "Period: {} to {}", start, end)?;
        }
        (Some(start), None) => {
            writeln!(out, "Period: From {}", start)?;
        }
        (None, Some(end)) => {
            writeln!(out, "Period: Up to {}", end)?;
        }
        (None, None) => {}
    }
    writeln!(out)?;

    writeln!(out, "SUMMARY")?;
    writeln!(out, "{}", "-".repeat(60))?;
    writeln!(out, "Workouts: {}", summary.total_workouts)?;
    writeln!(out, "Distance: {:.0}m", summary.total_distance_metres)?;
    writeln!(out, "Time: {}", power::format_duration(summary.total_time_seconds))?;
    writeln!(out, "Total Effort Points: {}", summary.total_points)?;
    writeln!(out, "Average Effort Points: {}", summary.average_points)?;
    for (zone, count) in &summary.zone_counts {
        writeln!(out, "  {:<10} {}", zone, count)?;
    }
    writeln!(out)?;

    if !report.weekly.is_empty() {
        writeln!(out, "WEEKLY TOTALS")?;
        writeln!(out, "{}", "-".repeat(60))?;
        for week in &report.weekly {
            writeln!(
                out,
                "{}-W{:02}: {} workouts on {} days, {} EP",
                week.iso_year, week.week, week.workout_count, week.active_days, week.total_points
            )?;
        }
        writeln!(out)?;
    }

    if !report.workouts.is_empty() {
        writeln!(out, "WORKOUTS")?;
        writeln!(out, "{}", "-".repeat(60))?;
        for workout in &report.workouts {
            let record = &workout.entry.record;
            let effort = &workout.analysis.effort;
            writeln!(
                out,
                "{} {:>6.0}m {:>9} {:>5.1} EP  {}",
                workout.entry.date,
                record.total_distance_metres,
                power::format_duration(record.total_time_seconds),
                effort.effort_points,
                effort.zone
            )?;

            if let HraResult::Available(hra) = &workout.analysis.heart_rate {
                writeln!(
                    out,
                    "           HR {} bpm ({}% HRR), {}, {:.2} W/beat",
                    hra.intensity.bpm,
                    hra.intensity.percent_hrr,
                    hra.zone.name,
                    hra.efficiency.watts_per_beat
                )?;
            }
        }
    }

    Ok(())
}

/// Render an effort report to a string
pub fn render_report(report: &EffortReport) -> String {
    let mut buffer = Vec::new();
    // Writing into a Vec cannot fail
    let _ = write_report(report, &mut buffer);
    String::from_utf8_lossy(&buffer).into_owned()
}

/// Export an effort report as plain text
pub fn export_report<P: AsRef<Path>>(report: &EffortReport, output_path: P) -> Result<()> {
    let mut file = std::io::BufWriter::new(std::fs::File::create(output_path)?);
    write_report(report, &mut file)?;
    file.flush()?;
    Ok(())
}
