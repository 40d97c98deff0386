use crate::effort::EffortResult;
use crate::models::WorkoutEntry;
use crate::power;

/// One-line summary suitable for posting
///
/// `5,000m in 20:00.0 (2:00.0/500m) · 61.3 EP · Training · avg 158 bpm`
pub fn share_text(entry: &WorkoutEntry, effort: &EffortResult) -> String {
    let record = &entry.record;
    let pace = power::pace_per_500m(record.total_distance_metres, record.total_time_seconds);

    let mut text = format!(
        "{}m in {} ({}/500m) · {:.1} EP · {}",
        thousands(record.total_distance_metres.round() as u64),
        power::format_duration(record.total_time_seconds),
        power::format_duration(pace),
        effort.effort_points,
        effort.zone.label()
    );

    if let Some(hr) = record.avg_heart_rate {
        text.push_str(&format!(" · avg {} bpm", hr.round() as u64));
    }

    text
}

fn thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
