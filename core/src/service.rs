use std::path::Path;

use anyhow::Result;
use chrono::NaiveDate;

use crate::db::{Database, MEALS_KEY, PROFILE_KEY};
use crate::ledger::MealLedger;
use crate::meal_plan::{MealPlan, offline_plan};
use crate::models::{
    Goal, MealEntry, MealUpdate, NewMealEntry, PhysicalStats, validate_stats,
};
use crate::profile::Profile;
use crate::progress::{
    self, DailyProgress, DaySummary, SeriesPoint, consumption_series, day_summary, weekly_series,
};

/// Owns the store and is the only way profile and ledger state changes.
///
/// Nothing is cached between calls: every operation reads the current value
/// from storage, and every mutation writes the whole value back under its key.
pub struct TrackerService {
    db: Database,
}

impl TrackerService {
    pub fn new(db_path: &Path) -> Result<Self> {
        let db = Database::open(db_path)?;
        Ok(Self { db })
    }

    pub fn new_in_memory() -> Result<Self> {
        let db = Database::open_in_memory()?;
        Ok(Self { db })
    }

    #[must_use]
    pub fn from_database(db: Database) -> Self {
        Self { db }
    }

    // --- Profile ---

    /// A stored profile with out-of-range stats counts as corrupt and is
    /// treated as absent.
    pub fn load_profile(&self) -> Result<Option<Profile>> {
        let profile: Option<Profile> = self.db.load(PROFILE_KEY, None)?;
        let Some(mut profile) = profile else {
            return Ok(None);
        };
        if let Err(e) = validate_stats(profile.stats()) {
            tracing::warn!(key = PROFILE_KEY, error = %e, "discarding invalid stored profile");
            return Ok(None);
        }
        if profile.refresh_goal() {
            tracing::debug!("stored goal was stale, recomputed from profile");
        }
        Ok(Some(profile))
    }

    /// Validate, recompute the goal, and persist profile and goal together.
    pub fn save_profile(&self, stats: PhysicalStats) -> Result<Profile> {
        let profile = match self.load_profile()? {
            Some(mut existing) => {
                existing.update_stats(stats)?;
                existing
            }
            None => Profile::from_stats(stats)?,
        };
        self.db.save(PROFILE_KEY, &profile)?;
        tracing::info!(daily_target = ?profile.goal().map(|g| g.target), "profile saved");
        Ok(profile)
    }

    pub fn current_goal(&self) -> Result<Option<Goal>> {
        Ok(self.load_profile()?.and_then(|p| p.goal()))
    }

    fn target(&self) -> Result<Option<u32>> {
        Ok(self.current_goal()?.map(|g| g.target))
    }

    // --- Ledger ---

    pub fn load_ledger(&self) -> Result<MealLedger> {
        self.db.load(MEALS_KEY, MealLedger::new())
    }

    pub fn log_meal(&self, entry: NewMealEntry) -> Result<MealEntry> {
        let mut ledger = self.load_ledger()?;
        let created = ledger.add(entry)?;
        self.db.save(MEALS_KEY, &ledger)?;
        tracing::debug!(id = %created.id, calories = created.calories, "meal logged");
        Ok(created)
    }

    /// `Ok(None)` when no entry has `id`; nothing is written in that case.
    pub fn update_meal(&self, id: &str, update: MealUpdate) -> Result<Option<MealEntry>> {
        let mut ledger = self.load_ledger()?;
        let Some(updated) = ledger.update(id, update)? else {
            return Ok(None);
        };
        self.db.save(MEALS_KEY, &ledger)?;
        Ok(Some(updated))
    }

    pub fn delete_meal(&self, id: &str) -> Result<bool> {
        let mut ledger = self.load_ledger()?;
        if !ledger.remove(id) {
            return Ok(false);
        }
        self.db.save(MEALS_KEY, &ledger)?;
        Ok(true)
    }

    pub fn get_meal(&self, id: &str) -> Result<Option<MealEntry>> {
        Ok(self.load_ledger()?.get(id).cloned())
    }

    pub fn meals_on(&self, date: NaiveDate) -> Result<Vec<MealEntry>> {
        Ok(self.load_ledger()?.entries_on(date).cloned().collect())
    }

    pub fn total_calories_on(&self, date: NaiveDate) -> Result<u32> {
        Ok(self.load_ledger()?.total_calories_on(date))
    }

    // --- Derived views ---

    pub fn daily_progress(&self, date: NaiveDate) -> Result<DailyProgress> {
        let ledger = self.load_ledger()?;
        Ok(progress::daily_progress(date, &ledger, self.target()?))
    }

    pub fn day_summary(&self, date: NaiveDate) -> Result<DaySummary> {
        let ledger = self.load_ledger()?;
        Ok(day_summary(date, &ledger, self.target()?))
    }

    pub fn weekly_series(&self, end: NaiveDate) -> Result<Vec<SeriesPoint>> {
        let ledger = self.load_ledger()?;
        weekly_series(end, &ledger, self.target()?)
    }

    pub fn history(&self, end: NaiveDate, days: u32) -> Result<Vec<SeriesPoint>> {
        let ledger = self.load_ledger()?;
        consumption_series(end, days, &ledger, self.target()?)
    }

    pub fn logging_streak(&self, today: NaiveDate) -> Result<u32> {
        Ok(progress::logging_streak(&self.load_ledger()?, today))
    }

    pub fn calorie_average(&self, end: NaiveDate, days: u32) -> Result<f64> {
        Ok(progress::calorie_average(&self.load_ledger()?, end, days))
    }

    /// Template plan for the current target, or `None` without a goal.
    pub fn suggest_offline_plan(&self) -> Result<Option<MealPlan>> {
        Ok(self.target()?.map(offline_plan))
    }

    // --- Reset ---

    /// Remove the profile and every logged meal.
    pub fn reset(&self) -> Result<bool> {
        let profile = self.db.remove(PROFILE_KEY)?;
        let meals = self.db.remove(MEALS_KEY)?;
        Ok(profile || meals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ActivityLevel, MealCategory, Sex};

    fn stats() -> PhysicalStats {
        PhysicalStats {
            sex: Sex::Male,
            age: 30,
            weight_kg: 70.0,
            height_cm: 175.0,
            activity_level: ActivityLevel::Sedentary,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn meal(description: &str, calories: u32, date: NaiveDate) -> NewMealEntry {
        NewMealEntry {
            description: description.to_string(),
            calories,
            category: MealCategory::Lunch,
            date,
        }
    }

    #[test]
    fn test_save_and_load_profile() {
        let svc = TrackerService::new_in_memory().unwrap();
        assert!(svc.load_profile().unwrap().is_none());
        assert!(svc.current_goal().unwrap().is_none());

        let saved = svc.save_profile(stats()).unwrap();
        let loaded = svc.load_profile().unwrap().unwrap();
        assert_eq!(saved, loaded);
        assert_eq!(svc.current_goal().unwrap().unwrap().target, 1629);
    }

    #[test]
    fn test_profile_edit_updates_goal_immediately() {
        let svc = TrackerService::new_in_memory().unwrap();
        svc.save_profile(stats()).unwrap();
        svc.save_profile(PhysicalStats {
            activity_level: ActivityLevel::Intense,
            ..stats()
        })
        .unwrap();
        assert_eq!(svc.current_goal().unwrap().unwrap().target, 2560);
        assert_eq!(svc.daily_progress(today()).unwrap().goal, Some(2560));
    }

    #[test]
    fn test_invalid_profile_leaves_stored_profile() {
        let svc = TrackerService::new_in_memory().unwrap();
        svc.save_profile(stats()).unwrap();
        assert!(
            svc.save_profile(PhysicalStats {
                weight_kg: -3.0,
                ..stats()
            })
            .is_err()
        );
        let loaded = svc.load_profile().unwrap().unwrap();
        assert!((loaded.stats().weight_kg - 70.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_stale_stored_goal_is_repaired() {
        let db = Database::open_in_memory().unwrap();
        db.save_raw(
            PROFILE_KEY,
            r#"{"sex":"M","age":30,"weight_kg":70.0,"height_cm":175.0,
                "activity_level":"sedentary",
                "cached_goal":{"basal":0,"maintenance":0,"target":0}}"#,
        )
        .unwrap();
        let svc = TrackerService::from_database(db);
        assert_eq!(svc.current_goal().unwrap().unwrap().target, 1629);
    }

    #[test]
    fn test_corrupt_profile_treated_as_absent() {
        let db = Database::open_in_memory().unwrap();
        db.save_raw(PROFILE_KEY, "][").unwrap();
        let svc = TrackerService::from_database(db);
        assert!(svc.load_profile().unwrap().is_none());
        // a new save replaces the corrupt value
        svc.save_profile(stats()).unwrap();
        assert!(svc.load_profile().unwrap().is_some());
    }

    #[test]
    fn test_out_of_range_stored_profile_treated_as_absent() {
        let db = Database::open_in_memory().unwrap();
        db.save_raw(
            PROFILE_KEY,
            r#"{"sex":"M","age":0,"weight_kg":70.0,"height_cm":175.0,
                "activity_level":"sedentary"}"#,
        )
        .unwrap();
        let svc = TrackerService::from_database(db);
        assert!(svc.load_profile().unwrap().is_none());
        assert!(svc.current_goal().unwrap().is_none());
        assert!(!svc.daily_progress(today()).unwrap().goal_defined());

        svc.save_profile(stats()).unwrap();
        assert_eq!(svc.current_goal().unwrap().unwrap().target, 1629);
    }

    #[test]
    fn test_history_rejects_oversized_window() {
        let svc = TrackerService::new_in_memory().unwrap();
        assert!(svc.history(today(), 200_000_000).is_err());
        assert!(svc.history(NaiveDate::MIN, 7).is_err());
        assert_eq!(svc.history(today(), 30).unwrap().len(), 30);
    }

    #[test]
    fn test_corrupt_meals_treated_as_empty() {
        let db = Database::open_in_memory().unwrap();
        db.save_raw(MEALS_KEY, "not json").unwrap();
        let svc = TrackerService::from_database(db);
        assert_eq!(svc.total_calories_on(today()).unwrap(), 0);
        svc.log_meal(meal("Soup", 250, today())).unwrap();
        assert_eq!(svc.total_calories_on(today()).unwrap(), 250);
    }

    #[test]
    fn test_log_update_delete_roundtrip() {
        let svc = TrackerService::new_in_memory().unwrap();
        let entry = svc.log_meal(meal("Toast", 300, today())).unwrap();
        assert_eq!(svc.meals_on(today()).unwrap(), vec![entry.clone()]);

        let mut update = MealUpdate::from_entry(&entry);
        update.calories = 350;
        let updated = svc.update_meal(&entry.id, update).unwrap().unwrap();
        assert_eq!(updated.id, entry.id);
        assert_eq!(svc.get_meal(&entry.id).unwrap().unwrap().calories, 350);

        assert!(svc.delete_meal(&entry.id).unwrap());
        assert!(!svc.delete_meal(&entry.id).unwrap());
        assert!(svc.meals_on(today()).unwrap().is_empty());
    }

    #[test]
    fn test_update_missing_meal_reports_not_found() {
        let svc = TrackerService::new_in_memory().unwrap();
        let entry = svc.log_meal(meal("Toast", 300, today())).unwrap();
        svc.delete_meal(&entry.id).unwrap();
        let result = svc
            .update_meal(&entry.id, MealUpdate::from_entry(&entry))
            .unwrap();
        assert!(result.is_none());
        assert!(svc.load_ledger().unwrap().is_empty());
    }

    #[test]
    fn test_rejected_meal_leaves_ledger_untouched() {
        let svc = TrackerService::new_in_memory().unwrap();
        svc.log_meal(meal("Toast", 300, today())).unwrap();
        let before = svc.load_ledger().unwrap();
        assert!(svc.log_meal(meal("", 100, today())).is_err());
        assert_eq!(svc.load_ledger().unwrap(), before);
    }

    #[test]
    fn test_progress_and_series_use_stored_goal() {
        let svc = TrackerService::new_in_memory().unwrap();
        svc.save_profile(stats()).unwrap();
        svc.log_meal(meal("Feast", 2000, today())).unwrap();

        let progress = svc.daily_progress(today()).unwrap();
        assert_eq!(progress.over_by, Some(371));
        assert!(progress.over_limit);

        let series = svc.weekly_series(today()).unwrap();
        assert_eq!(series.len(), 7);
        assert_eq!(series[6].consumed, 2000);
        assert!(series.iter().all(|p| p.goal == Some(1629)));

        let summary = svc.day_summary(today()).unwrap();
        assert_eq!(summary.total_calories, 2000);
        assert_eq!(svc.history(today(), 14).unwrap().len(), 14);
    }

    #[test]
    fn test_progress_without_profile_is_undefined() {
        let svc = TrackerService::new_in_memory().unwrap();
        svc.log_meal(meal("Toast", 300, today())).unwrap();
        let progress = svc.daily_progress(today()).unwrap();
        assert_eq!(progress.consumed, 300);
        assert!(!progress.goal_defined());
        assert!(svc.suggest_offline_plan().unwrap().is_none());
    }

    #[test]
    fn test_suggest_offline_plan_uses_target() {
        let svc = TrackerService::new_in_memory().unwrap();
        svc.save_profile(stats()).unwrap();
        let plan = svc.suggest_offline_plan().unwrap().unwrap();
        assert_eq!(plan.target, 1629);
        assert_eq!(plan.items.len(), 4);
    }

    #[test]
    fn test_reset_clears_everything() {
        let svc = TrackerService::new_in_memory().unwrap();
        assert!(!svc.reset().unwrap());
        svc.save_profile(stats()).unwrap();
        svc.log_meal(meal("Toast", 300, today())).unwrap();
        assert!(svc.reset().unwrap());
        assert!(svc.load_profile().unwrap().is_none());
        assert!(svc.load_ledger().unwrap().is_empty());
    }

    #[test]
    fn test_state_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("personalfit.db");
        let id = {
            let svc = TrackerService::new(&path).unwrap();
            svc.save_profile(stats()).unwrap();
            svc.log_meal(meal("Toast", 300, today())).unwrap().id
        };
        let svc = TrackerService::new(&path).unwrap();
        assert_eq!(svc.current_goal().unwrap().unwrap().target, 1629);
        assert_eq!(svc.get_meal(&id).unwrap().unwrap().calories, 300);
        assert_eq!(svc.logging_streak(today()).unwrap(), 1);
        assert!((svc.calorie_average(today(), 7).unwrap() - 300.0).abs() < 0.01);
    }
}
