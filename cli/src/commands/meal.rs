use anyhow::{Result, bail};
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use personalfit_core::models::{
    MealUpdate, NewMealEntry, parse_calories, validate_meal_category,
};
use personalfit_core::service::TrackerService;

use super::helpers::{exit_not_found, parse_date, truncate};
use super::summary::status_line;

pub(crate) fn cmd_log(
    svc: &TrackerService,
    description: &str,
    calories: &str,
    category: &str,
    date: Option<String>,
    json: bool,
) -> Result<()> {
    let entry = NewMealEntry {
        description: description.to_string(),
        calories: parse_calories(calories)?,
        category: validate_meal_category(category)?,
        date: parse_date(date)?,
    };
    let entry = svc.log_meal(entry)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entry)?);
        return Ok(());
    }

    let name = &entry.description;
    let cal = entry.calories;
    let category = entry.category;
    let id = &entry.id;
    println!("Logged {name} for {category}: {cal} kcal [{id}]");
    let progress = svc.daily_progress(entry.date)?;
    println!("{}", status_line(&progress));
    Ok(())
}

pub(crate) fn cmd_update(
    svc: &TrackerService,
    entry_id: &str,
    description: Option<String>,
    calories: Option<&str>,
    category: Option<&str>,
    date: Option<String>,
    json: bool,
) -> Result<()> {
    if description.is_none() && calories.is_none() && category.is_none() && date.is_none() {
        bail!(
            "Nothing to update. Provide at least one of --description, --calories, --category, or --date"
        );
    }

    let calories = calories.map(parse_calories).transpose()?;
    let category = category.map(validate_meal_category).transpose()?;
    let date = date.map(Some).map(parse_date).transpose()?;

    let not_found = format!("Entry {entry_id} not found");
    let Some(existing) = svc.get_meal(entry_id)? else {
        exit_not_found(&not_found, json);
    };

    let mut update = MealUpdate::from_entry(&existing);
    if let Some(description) = description {
        update.description = description;
    }
    if let Some(calories) = calories {
        update.calories = calories;
    }
    if let Some(category) = category {
        update.category = category;
    }
    if let Some(date) = date {
        update.date = date;
    }

    let Some(entry) = svc.update_meal(entry_id, update)? else {
        exit_not_found(&not_found, json);
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&entry)?);
    } else {
        let name = &entry.description;
        let cal = entry.calories;
        let category = entry.category;
        let date = entry.date;
        println!("Updated entry {entry_id}: {name} for {category} on {date}: {cal} kcal");
    }
    Ok(())
}

pub(crate) fn cmd_delete(svc: &TrackerService, entry_id: &str, json: bool) -> Result<()> {
    if !svc.delete_meal(entry_id)? {
        exit_not_found(&format!("Entry {entry_id} not found"), json);
    }

    if json {
        println!("{}", serde_json::json!({ "deleted": entry_id }));
    } else {
        println!("Deleted entry {entry_id}");
    }
    Ok(())
}

pub(crate) fn cmd_list(svc: &TrackerService, date: Option<String>, json: bool) -> Result<()> {
    #[derive(Tabled)]
    struct MealRow {
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "Meal")]
        category: String,
        #[tabled(rename = "Description")]
        description: String,
        #[tabled(rename = "Calories")]
        calories: u32,
    }

    let date = parse_date(date)?;
    let entries = svc.meals_on(date)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        exit_not_found(&format!("No entries for {date}"), false);
    }

    let rows: Vec<MealRow> = entries
        .iter()
        .map(|e| MealRow {
            id: e.id.clone(),
            category: e.category.to_string(),
            description: truncate(&e.description, 40),
            calories: e.calories,
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(3..)).with(Alignment::right()))
        .to_string();
    println!("{table}");
    Ok(())
}
