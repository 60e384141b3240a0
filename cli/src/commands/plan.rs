use anyhow::Result;
use serde::Serialize;

use personalfit_core::meal_plan::{MealPlan, RetryPolicy, build_prompt};
use personalfit_core::service::TrackerService;

use super::helpers::exit_not_found;
use crate::textgen::TextGenClient;

#[derive(Serialize)]
#[serde(tag = "source", rename_all = "lowercase")]
enum PlanOutput {
    Generated { target: u32, text: String },
    Offline(MealPlan),
}

pub(crate) async fn cmd_plan(
    svc: &TrackerService,
    textgen: Option<&TextGenClient>,
    json: bool,
) -> Result<()> {
    let no_goal = "No calorie goal yet. Set up your profile with `personalfit profile set`";
    let Some(goal) = svc.current_goal()? else {
        exit_not_found(no_goal, json);
    };

    let generated = match textgen {
        Some(client) => match client
            .generate(&build_prompt(&goal), &RetryPolicy::default())
            .await
        {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::warn!(error = %e, "meal plan generation failed");
                eprintln!("Could not generate a meal plan ({e}). Showing the offline plan instead.");
                None
            }
        },
        None => None,
    };

    let output = if let Some(text) = generated {
        PlanOutput::Generated {
            target: goal.target,
            text,
        }
    } else {
        let Some(plan) = svc.suggest_offline_plan()? else {
            exit_not_found(no_goal, json);
        };
        PlanOutput::Offline(plan)
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    match output {
        PlanOutput::Generated { target, text } => {
            println!("=== Meal plan ({target} kcal) ===\n");
            println!("{text}");
        }
        PlanOutput::Offline(plan) => {
            let title = &plan.title;
            println!("=== {title} ===\n");
            for item in &plan.items {
                let label = item.category.as_str().to_uppercase();
                let cal = item.calories;
                let suggestion = &item.suggestion;
                println!("  {label} ({cal} kcal)");
                println!("    {suggestion}\n");
            }
        }
    }
    Ok(())
}
