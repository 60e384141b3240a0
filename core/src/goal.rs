//! Basal rate and daily calorie goal.
//!
//! Mifflin-St Jeor is the only formula used anywhere in the crate; every
//! caller goes through [`calculate_goal`].

use crate::models::{ActivityLevel, Goal, PhysicalStats, Sex};

/// Fixed daily deficit subtracted from maintenance.
pub const DEFICIT_KCAL: f64 = 500.0;

/// The target never drops below this.
pub const MIN_TARGET_KCAL: u32 = 1000;

/// Mifflin-St Jeor basal metabolic rate in kcal/day.
///
/// Returns `None` when sex is unspecified.
#[must_use]
pub fn basal_rate(sex: Sex, weight_kg: f64, height_cm: f64, age: u32) -> Option<f64> {
    let base = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * f64::from(age);
    match sex {
        Sex::Male => Some(base + 5.0),
        Sex::Female => Some(base - 161.0),
        Sex::Unspecified => None,
    }
}

/// Turn an unrounded basal rate into a [`Goal`].
///
/// Rounding happens here and nowhere earlier.
#[must_use]
#[allow(clippy::cast_sign_loss)]
pub fn goal_from_basal(basal: f64, activity: ActivityLevel) -> Goal {
    let maintenance = basal * activity.factor();
    let target = (maintenance - DEFICIT_KCAL)
        .round()
        .max(f64::from(MIN_TARGET_KCAL));
    Goal {
        basal: basal.round() as i64,
        maintenance: maintenance.round() as i64,
        target: target as u32,
    }
}

#[must_use]
pub fn calculate_goal(stats: &PhysicalStats) -> Option<Goal> {
    let basal = basal_rate(stats.sex, stats.weight_kg, stats.height_cm, stats.age)?;
    Some(goal_from_basal(basal, stats.activity_level))
}
