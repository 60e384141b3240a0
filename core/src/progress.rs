//! Reconciles the meal ledger against the daily goal.

use anyhow::{Context, Result, bail};
use chrono::{Days, NaiveDate};
use serde::Serialize;

use crate::ledger::{MealLedger, sum_calories};
use crate::models::{MealCategory, MealEntry};

/// Display ceiling for the progress percentage.
pub const PERCENT_CEILING: f64 = 100.0;

pub const WEEK_DAYS: u32 = 7;

/// Longest window `consumption_series` will build, about ten years.
pub const MAX_SERIES_DAYS: u32 = 3660;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyProgress {
    pub date: NaiveDate,
    pub consumed: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub over_by: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent: Option<f64>,
    pub over_limit: bool,
}

impl DailyProgress {
    #[must_use]
    pub fn goal_defined(&self) -> bool {
        self.goal.is_some()
    }
}

#[must_use]
pub fn daily_progress(date: NaiveDate, ledger: &MealLedger, goal: Option<u32>) -> DailyProgress {
    let consumed = ledger.total_calories_on(date);
    let Some(goal) = goal.filter(|&g| g > 0) else {
        return DailyProgress {
            date,
            consumed,
            goal: None,
            remaining: None,
            over_by: None,
            percent: None,
            over_limit: false,
        };
    };

    let percent = (f64::from(consumed) / f64::from(goal) * 100.0).min(PERCENT_CEILING);
    let over_limit = consumed > goal;
    DailyProgress {
        date,
        consumed,
        goal: Some(goal),
        remaining: (!over_limit).then(|| goal - consumed),
        over_by: over_limit.then(|| consumed - goal),
        percent: Some(percent),
        over_limit,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub consumed: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal: Option<u32>,
}

/// One point per calendar day for the `days` days ending at `end` inclusive,
/// oldest first. Days without entries report zero.
///
/// Windows longer than [`MAX_SERIES_DAYS`], or reaching before the earliest
/// representable date, are rejected.
pub fn consumption_series(
    end: NaiveDate,
    days: u32,
    ledger: &MealLedger,
    goal: Option<u32>,
) -> Result<Vec<SeriesPoint>> {
    if days > MAX_SERIES_DAYS {
        bail!("History is limited to {MAX_SERIES_DAYS} days (got {days})");
    }
    (0..days)
        .rev()
        .map(|offset| {
            let date = end
                .checked_sub_days(Days::new(u64::from(offset)))
                .with_context(|| format!("A {days}-day window ending {end} is out of range"))?;
            Ok(SeriesPoint {
                date,
                consumed: ledger.total_calories_on(date),
                goal,
            })
        })
        .collect()
}

pub fn weekly_series(
    end: NaiveDate,
    ledger: &MealLedger,
    goal: Option<u32>,
) -> Result<Vec<SeriesPoint>> {
    consumption_series(end, WEEK_DAYS, ledger, goal)
}

#[derive(Debug, Clone, Serialize)]
pub struct MealGroup {
    pub category: MealCategory,
    pub entries: Vec<MealEntry>,
    pub subtotal_calories: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub meals: Vec<MealGroup>,
    pub total_calories: u32,
    pub progress: DailyProgress,
}

#[must_use]
pub fn day_summary(date: NaiveDate, ledger: &MealLedger, goal: Option<u32>) -> DaySummary {
    let mut meals = Vec::new();
    for category in MealCategory::ALL {
        let entries: Vec<MealEntry> = ledger
            .entries_on(date)
            .filter(|e| e.category == category)
            .cloned()
            .collect();
        if entries.is_empty() {
            continue;
        }
        let subtotal_calories = sum_calories(&entries);
        meals.push(MealGroup {
            category,
            entries,
            subtotal_calories,
        });
    }

    let total_calories = meals
        .iter()
        .fold(0_u32, |acc, m| acc.saturating_add(m.subtotal_calories));
    DaySummary {
        date,
        meals,
        total_calories,
        progress: daily_progress(date, ledger, goal),
    }
}

/// Consecutive logged days ending today, or ending yesterday when nothing has
/// been logged today yet.
#[must_use]
pub fn logging_streak(ledger: &MealLedger, today: NaiveDate) -> u32 {
    let dates = ledger.dates_logged();
    let yesterday = today.pred_opt();

    let start = match dates.iter().find(|&&d| d <= today) {
        Some(&d) if d == today || Some(d) == yesterday => d,
        _ => return 0,
    };

    let mut streak = 0;
    let mut expected = Some(start);
    for date in dates.into_iter().filter(|&d| d <= start) {
        if Some(date) != expected {
            break;
        }
        streak += 1;
        expected = date.pred_opt();
    }
    streak
}

/// Mean daily total over the logged days in the `days`-day window ending at
/// `end`. Days without entries are skipped; returns 0 when none were logged.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn calorie_average(ledger: &MealLedger, end: NaiveDate, days: u32) -> f64 {
    if days == 0 {
        return 0.0;
    }
    let start = end
        .checked_sub_days(Days::new(u64::from(days - 1)))
        .unwrap_or(NaiveDate::MIN);
    let totals: Vec<u32> = ledger
        .dates_logged()
        .into_iter()
        .filter(|d| (start..=end).contains(d))
        .map(|d| ledger.total_calories_on(d))
        .filter(|&c| c > 0)
        .collect();
    if totals.is_empty() {
        return 0.0;
    }
    let sum: u64 = totals.iter().map(|&c| u64::from(c)).sum();
    sum as f64 / totals.len() as f64
}
