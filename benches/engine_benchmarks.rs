use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ergrs::batch::{BatchConfig, BatchScorer};
use ergrs::calendar::EffortCalendar;
use ergrs::models::{AthleteProfile, Interval, WorkoutEntry, WorkoutRecord};
use ergrs::{power, EffortCalculator, HeartRateAnalyzer, WorkoutAnalyzer};

/// Performance benchmarks for the scoring engine
///
/// Scoring is O(n) in intervals; these check that stays true and that batch
/// scoring scales across threads.

fn create_record(intervals: usize) -> WorkoutRecord {
    let splits: Vec<Interval> = (0..intervals)
        .map(|i| {
            let time = 118.0 + (i % 5) as f64;
            Interval {
                distance_metres: 500.0,
                time_seconds: time,
                pace_seconds: time,
                avg_heart_rate: Some(140.0 + (i % 30) as f64),
            }
        })
        .collect();

    let total_time: f64 = splits.iter().map(|s| s.time_seconds).sum();
    WorkoutRecord {
        total_distance_metres: 500.0 * intervals as f64,
        total_time_seconds: total_time,
        avg_heart_rate: Some(155.0),
        avg_stroke_rate: Some(24.0),
        intervals: Some(splits),
    }
}

fn create_entries(count: usize) -> Vec<WorkoutEntry> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    (0..count)
        .map(|i| WorkoutEntry {
            id: format!("bench-{}", i),
            date: start + chrono::Days::new((i % 365) as u64),
            record: create_record(8 + i % 16),
        })
        .collect()
}

fn bench_effort_score(c: &mut Criterion) {
    let athlete = AthleteProfile::default();
    let mut group = c.benchmark_group("Effort Score");

    for &intervals in &[0, 8, 64, 512] {
        let record = create_record(intervals.max(1));
        group.throughput(Throughput::Elements(intervals as u64));
        group.bench_with_input(BenchmarkId::new("calculate", intervals), &record, |b, record| {
            b.iter(|| EffortCalculator::calculate(black_box(&athlete), black_box(record)));
        });
    }

    group.finish();
}

fn bench_heart_rate_analysis(c: &mut Criterion) {
    let athlete = AthleteProfile::default();
    let mut group = c.benchmark_group("Heart Rate Analysis");

    for &intervals in &[4, 32, 256] {
        let record = create_record(intervals);
        group.bench_with_input(BenchmarkId::new("analyze", intervals), &record, |b, record| {
            b.iter(|| HeartRateAnalyzer::analyze(black_box(&athlete), black_box(record)));
        });
    }

    group.finish();
}

fn bench_power(c: &mut Criterion) {
    c.bench_function("watts", |b| {
        b.iter(|| power::watts(black_box(2000.0), black_box(420.0)))
    });
}

fn bench_batch_and_calendar(c: &mut Criterion) {
    let athlete = AthleteProfile::default();
    let mut group = c.benchmark_group("Batch Scoring");
    group.sample_size(20);

    for &count in &[100, 1000] {
        let entries = create_entries(count);
        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(BenchmarkId::new("sequential", count), &entries, |b, entries| {
            b.iter(|| {
                entries
                    .iter()
                    .map(|e| WorkoutAnalyzer::analyze(&athlete, &e.record))
                    .count()
            });
        });

        let scorer = BatchScorer::with_config(BatchConfig {
            num_threads: None,
            show_progress: false,
            continue_on_error: true,
        });
        group.bench_with_input(BenchmarkId::new("parallel", count), &entries, |b, entries| {
            b.iter(|| scorer.score(&athlete, entries.clone()));
        });

        let scored: Vec<_> = entries
            .iter()
            .cloned()
            .map(|e| WorkoutAnalyzer::score_entry(&athlete, e))
            .collect();
        group.bench_with_input(BenchmarkId::new("calendar", count), &scored, |b, scored| {
            b.iter(|| EffortCalendar::aggregate(black_box(scored)));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_effort_score,
    bench_heart_rate_analysis,
    bench_power,
    bench_batch_and_calendar
);
criterion_main!(benches);
