use anyhow::{Context, Result, bail};
use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
    #[serde(rename = "unspecified")]
    Unspecified,
}

impl Sex {
    /// Parse form input. Anything other than a recognized male/female token
    /// becomes `Unspecified` rather than an error.
    #[must_use]
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "m" | "male" => Sex::Male,
            "f" | "female" => Sex::Female,
            _ => Sex::Unspecified,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    Intense,
}

impl ActivityLevel {
    pub const ALL: [ActivityLevel; 4] = [
        ActivityLevel::Sedentary,
        ActivityLevel::Light,
        ActivityLevel::Moderate,
        ActivityLevel::Intense,
    ];

    /// Multiplier applied to the basal rate to get maintenance calories.
    #[must_use]
    pub fn factor(self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::Intense => 1.725,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "sedentary",
            ActivityLevel::Light => "light",
            ActivityLevel::Moderate => "moderate",
            ActivityLevel::Intense => "intense",
        }
    }

    /// Unrecognized levels fall back to sedentary.
    #[must_use]
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "sedentary" => ActivityLevel::Sedentary,
            "light" | "lightly_active" => ActivityLevel::Light,
            "moderate" | "moderately_active" => ActivityLevel::Moderate,
            "intense" | "active" | "very_active" => ActivityLevel::Intense,
            other => {
                tracing::warn!(level = other, "unknown activity level, using sedentary");
                ActivityLevel::Sedentary
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealCategory {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealCategory {
    /// Display order used when grouping a day's entries.
    pub const ALL: [MealCategory; 4] = [
        MealCategory::Breakfast,
        MealCategory::Lunch,
        MealCategory::Dinner,
        MealCategory::Snack,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            MealCategory::Breakfast => "breakfast",
            MealCategory::Lunch => "lunch",
            MealCategory::Dinner => "dinner",
            MealCategory::Snack => "snack",
        }
    }
}

impl std::fmt::Display for MealCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn validate_meal_category(category: &str) -> Result<MealCategory> {
    let lower = category.trim().to_lowercase();
    MealCategory::ALL
        .into_iter()
        .find(|c| c.as_str() == lower)
        .with_context(|| {
            let names: Vec<&str> = MealCategory::ALL.iter().map(|c| c.as_str()).collect();
            format!(
                "Invalid meal category '{category}'. Must be one of: {}",
                names.join(", ")
            )
        })
}

/// The five physiological inputs of the goal calculator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicalStats {
    pub sex: Sex,
    pub age: u32,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub activity_level: ActivityLevel,
}

pub fn validate_stats(stats: &PhysicalStats) -> Result<()> {
    if !(1..=150).contains(&stats.age) {
        bail!("Age must be between 1 and 150 years (got {})", stats.age);
    }
    if !stats.weight_kg.is_finite() || stats.weight_kg <= 0.0 || stats.weight_kg >= 1000.0 {
        bail!("Weight must be greater than 0 and below 1000 kg");
    }
    if !stats.height_cm.is_finite() || stats.height_cm <= 0.0 || stats.height_cm >= 300.0 {
        bail!("Height must be greater than 0 and below 300 cm");
    }
    Ok(())
}

/// Daily energy figures derived from a profile, in whole kcal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    pub basal: i64,
    pub maintenance: i64,
    pub target: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealEntry {
    pub id: String,
    pub description: String,
    pub calories: u32,
    pub category: MealCategory,
    pub date: NaiveDate,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

#[derive(Debug, Clone)]
pub struct NewMealEntry {
    pub description: String,
    pub calories: u32,
    pub category: MealCategory,
    pub date: NaiveDate,
}

/// Full replacement of an entry's mutable fields.
#[derive(Debug, Clone)]
pub struct MealUpdate {
    pub description: String,
    pub calories: u32,
    pub category: MealCategory,
    pub date: NaiveDate,
}

impl MealUpdate {
    /// Start from the current values of `entry`, so callers can override only
    /// what changed and still submit a full replacement.
    #[must_use]
    pub fn from_entry(entry: &MealEntry) -> Self {
        Self {
            description: entry.description.clone(),
            calories: entry.calories,
            category: entry.category,
            date: entry.date,
        }
    }
}

/// Largest calorie count a single entry may carry.
pub const MAX_MEAL_KCAL: u32 = 100_000;

pub fn validate_calories(calories: u32) -> Result<u32> {
    if calories > MAX_MEAL_KCAL {
        bail!("Calories must be at most {MAX_MEAL_KCAL} per entry (got {calories})");
    }
    Ok(calories)
}

pub fn validate_description(description: &str) -> Result<String> {
    let trimmed = description.trim();
    if trimmed.is_empty() {
        bail!("Meal description must not be empty");
    }
    Ok(trimmed.to_string())
}

/// Coerce free-form calorie input to a non-negative whole number.
/// Fractional values are rounded to the nearest kcal.
#[allow(clippy::cast_sign_loss)]
pub fn parse_calories(s: &str) -> Result<u32> {
    let trimmed = s.trim().trim_end_matches("kcal").trim();
    let value: f64 = trimmed
        .parse()
        .with_context(|| format!("Invalid calories: '{s}'. Use a number like '350'"))?;
    if !value.is_finite() {
        bail!("Calories must be a finite number");
    }
    if value < 0.0 {
        bail!("Calories must not be negative");
    }
    let rounded = value.round();
    if rounded > f64::from(MAX_MEAL_KCAL) {
        bail!("Calories must be at most {MAX_MEAL_KCAL} per entry");
    }
    Ok(rounded as u32)
}

/// Normalize a meal date to its calendar day.
///
/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp; timestamps are converted to
/// the local day they fall on before the time is discarded.
pub fn parse_meal_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date);
    }
    let ts = DateTime::parse_from_rfc3339(s).with_context(|| {
        format!("Invalid date '{s}'. Use YYYY-MM-DD or an RFC 3339 timestamp")
    })?;
    Ok(ts.with_timezone(&Local).date_naive())
}
