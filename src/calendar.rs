use chrono::{Datelike, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::analysis::ScoredWorkout;
use crate::effort::EffortZone;
use crate::error::{ErgRsError, Result};

/// Effort totals for one calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyEffort {
    pub date: NaiveDate,
    pub workout_count: u32,
    pub total_points: Decimal,
    /// Mean effort points per workout, one decimal
    pub average_points: Decimal,
    /// Classified from the average; None on rest days
    pub zone: Option<EffortZone>,
}

impl DailyEffort {
    pub fn rest_day(date: NaiveDate) -> Self {
        DailyEffort {
            date,
            workout_count: 0,
            total_points: Decimal::ZERO,
            average_points: Decimal::ZERO,
            zone: None,
        }
    }

    pub fn is_rest_day(&self) -> bool {
        self.workout_count == 0
    }
}

/// Effort totals for one ISO week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyEffort {
    pub iso_year: i32,
    pub week: u32,
    pub workout_count: u32,
    pub total_points: Decimal,
    pub active_days: u32,
}

/// Calendar view over scored workouts
pub struct EffortCalendar;

impl EffortCalendar {
    /// Group scored workouts by date
    pub fn aggregate(workouts: &[ScoredWorkout]) -> BTreeMap<NaiveDate, DailyEffort> {
        let mut days: BTreeMap<NaiveDate, DailyEffort> = BTreeMap::new();

        for workout in workouts {
            let points = Self::points(workout.analysis.effort.effort_points);
            let date = workout.entry.date;

            days.entry(date)
                .and_modify(|day| {
                    day.total_points += points;
                    day.workout_count += 1;
                })
                .or_insert(DailyEffort {
                    date,
                    workout_count: 1,
                    total_points: points,
                    average_points: Decimal::ZERO,
                    zone: None,
                });
        }

        for day in days.values_mut() {
            day.average_points = (day.total_points / Decimal::from(day.workout_count))
                .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
            let average = day.average_points.to_f64().unwrap_or(0.0);
            day.zone = Some(EffortZone::from_points(average));
        }

        days
    }

    /// Every day from `start` to `end` inclusive, with rest days filled in
    pub fn range(
        days: &BTreeMap<NaiveDate, DailyEffort>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyEffort>> {
        if start > end {
            return Err(ErgRsError::Validation(format!(
                "calendar start {} is after end {}",
                start, end
            )));
        }

        Ok(start
            .iter_days()
            .take_while(|date| *date <= end)
            .map(|date| {
                days.get(&date)
                    .cloned()
                    .unwrap_or_else(|| DailyEffort::rest_day(date))
            })
            .collect())
    }

    /// Roll days up into ISO weeks
    pub fn weekly_totals(
        days: &BTreeMap<NaiveDate, DailyEffort>,
    ) -> BTreeMap<(i32, u32), WeeklyEffort> {
        let mut weeks: BTreeMap<(i32, u32), WeeklyEffort> = BTreeMap::new();

        for day in days.values().filter(|day| !day.is_rest_day()) {
            let iso = day.date.iso_week();
            let week = weeks.entry((iso.year(), iso.week())).or_insert(WeeklyEffort {
                iso_year: iso.year(),
                week: iso.week(),
                workout_count: 0,
                total_points: Decimal::ZERO,
                active_days: 0,
            });

            week.workout_count += day.workout_count;
            week.total_points += day.total_points;
            week.active_days += 1;
        }

        weeks
    }

    /// Effort points are already rounded to one decimal
    fn points(effort_points: f64) -> Decimal {
        Decimal::new((effort_points * 10.0).round() as i64, 1)
    }
}
