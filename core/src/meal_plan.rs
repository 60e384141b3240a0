//! Meal-plan suggestions: an offline template plan, the prompt for a remote
//! text generator, and the retry contract that generator is called under.

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::models::{Goal, MealCategory};

#[derive(Debug, Clone, Serialize)]
pub struct PlanItem {
    pub category: MealCategory,
    pub calories: u32,
    pub suggestion: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MealPlan {
    pub target: u32,
    pub title: String,
    pub items: Vec<PlanItem>,
}

fn item(category: MealCategory, calories: u32, suggestion: &str) -> PlanItem {
    PlanItem {
        category,
        calories,
        suggestion: suggestion.to_string(),
    }
}

/// Template plan picked by target tier (> 2000, > 1500, otherwise).
#[must_use]
pub fn offline_plan(target: u32) -> MealPlan {
    use MealCategory::{Breakfast, Dinner, Lunch, Snack};

    let items = if target > 2000 {
        vec![
            item(
                Breakfast,
                500,
                "Whole-grain bread, scrambled eggs, fruit and unsweetened coffee",
            ),
            item(
                Lunch,
                800,
                "Grilled chicken breast (150g), brown rice (1 cup), salad with olive oil",
            ),
            item(Snack, 300, "Plain yogurt with granola and honey"),
            item(Dinner, 700, "Baked salmon with sweet potato and steamed vegetables"),
        ]
    } else if target > 1500 {
        vec![
            item(Breakfast, 400, "Two-egg omelette with cheese and fresh juice"),
            item(Lunch, 600, "Chicken salad with greens and croutons"),
            item(Snack, 200, "An apple and a handful of nuts"),
            item(Dinner, 500, "Vegetable soup with whole-grain bread"),
        ]
    } else {
        vec![
            item(Breakfast, 300, "Yogurt with chia seeds and strawberries"),
            item(Lunch, 500, "Full salad with tuna or a boiled egg"),
            item(Dinner, 400, "Whole-wheat wrap with turkey and ricotta"),
        ]
    };

    MealPlan {
        target,
        title: format!("Suggested meal plan ({target} kcal)"),
        items,
    }
}

#[must_use]
pub fn build_prompt(goal: &Goal) -> String {
    let target = goal.target;
    let maintenance = goal.maintenance;
    format!(
        "Suggest a one-day meal plan totalling about {target} kcal \
         (maintenance is {maintenance} kcal). List breakfast, lunch, dinner and \
         an optional snack, each with an approximate calorie count."
    )
}

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("text generation service unreachable: {0}")]
    Transient(String),
    #[error("text generation service returned status {status}")]
    Rejected { status: u16 },
    #[error("could not generate a meal plan: the service returned an empty response")]
    Unusable,
}

impl GenerateError {
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, GenerateError::Transient(_))
    }

    /// Classify an HTTP status: 429 and 5xx are transient, the rest are not.
    #[must_use]
    pub fn from_status(status: u16) -> Self {
        if status == 429 || (500..600).contains(&status) {
            GenerateError::Transient(format!("HTTP {status}"))
        } else {
            GenerateError::Rejected { status }
        }
    }
}

/// Trim a generated body, rejecting one with nothing in it.
pub fn accept_generated(text: &str) -> Result<String, GenerateError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        Err(GenerateError::Unusable)
    } else {
        Ok(trimmed.to_string())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Delay to wait after failed attempt number `attempt` (1-based).
    #[must_use]
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay * 2_u32.saturating_pow(attempt.saturating_sub(1))
    }
}
