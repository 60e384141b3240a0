use anyhow::Result;
use chrono::Local;
use serde::Serialize;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use personalfit_core::progress::{DailyProgress, SeriesPoint};
use personalfit_core::service::TrackerService;

use super::helpers::{exit_not_found, parse_date};

/// One-line reading of a day's progress against the goal.
pub(crate) fn status_line(progress: &DailyProgress) -> String {
    let consumed = progress.consumed;
    let Some(goal) = progress.goal else {
        return format!("{consumed} kcal eaten. Set up your profile to get a daily goal.");
    };
    if consumed == 0 {
        return format!("No meals logged yet: {goal} kcal to go.");
    }
    if let Some(over) = progress.over_by {
        return format!("{consumed} / {goal} kcal: {over} kcal over your goal.");
    }
    let left = progress.remaining.unwrap_or_default();
    let percent = progress.percent.unwrap_or_default();
    format!("{consumed} / {goal} kcal ({percent:.0}%): {left} kcal left.")
}

pub(crate) fn cmd_summary(svc: &TrackerService, date: Option<String>, json: bool) -> Result<()> {
    let date = parse_date(date)?;
    let summary = svc.day_summary(date)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    if summary.meals.is_empty() {
        eprintln!("{}", status_line(&summary.progress));
        exit_not_found(&format!("No entries for {date}"), false);
    }

    println!("=== {date} ===\n");

    for meal in &summary.meals {
        let meal_label = meal.category.as_str().to_uppercase();
        let sub_cal = meal.subtotal_calories;
        println!("  {meal_label} ({sub_cal} kcal)");
        for e in &meal.entries {
            let id = &e.id;
            let name = &e.description;
            let cal = e.calories;
            println!("    [{id}] {name}: {cal} kcal");
        }
        println!();
    }

    let total = summary.total_calories;
    println!("  TOTAL: {total} kcal");
    if let Some(goal) = summary.progress.goal {
        println!("  GOAL:  {goal} kcal");
    }
    println!("\n{}", status_line(&summary.progress));

    Ok(())
}

#[derive(Tabled)]
struct HistoryRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Calories")]
    calories: u32,
    #[tabled(rename = "Goal")]
    goal: String,
    #[tabled(rename = "Diff")]
    diff: String,
}

/// One row per day, zero days included.
fn history_rows(series: &[SeriesPoint]) -> Vec<HistoryRow> {
    series
        .iter()
        .map(|p| HistoryRow {
            date: p.date.to_string(),
            calories: p.consumed,
            goal: p.goal.map_or("-".into(), |g| g.to_string()),
            diff: p.goal.map_or("-".into(), |g| {
                let diff = i64::from(p.consumed) - i64::from(g);
                format!("{diff:+}")
            }),
        })
        .collect()
}

pub(crate) fn cmd_history(
    svc: &TrackerService,
    days: u32,
    end: Option<String>,
    json: bool,
) -> Result<()> {
    #[derive(Serialize)]
    struct History {
        series: Vec<SeriesPoint>,
        streak: u32,
        average_calories: f64,
    }

    let end = parse_date(end)?;
    let series = svc.history(end, days)?;
    let streak = svc.logging_streak(Local::now().date_naive())?;
    let average = svc.calorie_average(end, days)?;

    if json {
        let history = History {
            series,
            streak,
            average_calories: average,
        };
        println!("{}", serde_json::to_string_pretty(&history)?);
        return Ok(());
    }

    let table = Table::new(history_rows(&series))
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..)).with(Alignment::right()))
        .to_string();
    println!("{table}");
    if series.iter().all(|p| p.consumed == 0) {
        println!("  No meals logged in the {days} days ending {end}");
    } else {
        println!("  Average on logged days: {average:.0} kcal");
    }
    println!("  Logging streak: {streak} day(s)");

    Ok(())
}
