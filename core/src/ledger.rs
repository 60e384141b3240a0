use anyhow::Result;
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{
    MealEntry, MealUpdate, NewMealEntry, validate_calories, validate_description,
};

/// All logged meals, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MealLedger {
    entries: Vec<MealEntry>,
}

impl MealLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn entries(&self) -> &[MealEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&MealEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    fn fresh_id(&self) -> String {
        loop {
            let id = Uuid::new_v4().to_string();
            if self.get(&id).is_none() {
                return id;
            }
        }
    }

    pub fn add(&mut self, entry: NewMealEntry) -> Result<MealEntry> {
        let description = validate_description(&entry.description)?;
        let calories = validate_calories(entry.calories)?;
        let now = Local::now().to_rfc3339();
        let created = MealEntry {
            id: self.fresh_id(),
            description,
            calories,
            category: entry.category,
            date: entry.date,
            created_at: now.clone(),
            updated_at: now,
        };
        self.entries.push(created.clone());
        Ok(created)
    }

    /// Replace every mutable field of the entry with `id`.
    ///
    /// `Ok(None)` means no such entry exists.
    pub fn update(&mut self, id: &str, update: MealUpdate) -> Result<Option<MealEntry>> {
        let description = validate_description(&update.description)?;
        let calories = validate_calories(update.calories)?;
        let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) else {
            return Ok(None);
        };
        entry.description = description;
        entry.calories = calories;
        entry.category = update.category;
        entry.date = update.date;
        entry.updated_at = Local::now().to_rfc3339();
        Ok(Some(entry.clone()))
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    pub fn entries_on(&self, date: NaiveDate) -> impl Iterator<Item = &MealEntry> + Clone {
        self.entries.iter().filter(move |e| e.date == date)
    }

    /// Saturates at `u32::MAX`; stored entries are not re-validated on load.
    #[must_use]
    pub fn total_calories_on(&self, date: NaiveDate) -> u32 {
        sum_calories(self.entries_on(date))
    }

    /// Distinct dates with at least one entry, most recent first.
    #[must_use]
    pub fn dates_logged(&self) -> Vec<NaiveDate> {
        let mut dates: Vec<NaiveDate> = self.entries.iter().map(|e| e.date).collect();
        dates.sort_unstable_by(|a, b| b.cmp(a));
        dates.dedup();
        dates
    }
}

/// Saturating calorie total of `entries`.
#[must_use]
pub fn sum_calories<'a>(entries: impl IntoIterator<Item = &'a MealEntry>) -> u32 {
    entries
        .into_iter()
        .fold(0_u32, |acc, e| acc.saturating_add(e.calories))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MealCategory;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
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
    fn test_add_then_entries_on() {
        let mut ledger = MealLedger::new();
        let entry = ledger.add(meal("Rice and beans", 450, day(15))).unwrap();
        assert!(!entry.id.is_empty());

        let found: Vec<&MealEntry> = ledger.entries_on(day(15)).collect();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0], &entry);
        assert_eq!(found[0].description, "Rice and beans");
        assert_eq!(found[0].calories, 450);
        assert_eq!(found[0].category, MealCategory::Lunch);
    }

    #[test]
    fn test_add_assigns_unique_ids() {
        let mut ledger = MealLedger::new();
        let a = ledger.add(meal("A", 100, day(15))).unwrap();
        let b = ledger.add(meal("A", 100, day(15))).unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn test_add_rejects_empty_description() {
        let mut ledger = MealLedger::new();
        assert!(ledger.add(meal("  ", 100, day(15))).is_err());
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_total_calories_on() {
        let mut ledger = MealLedger::new();
        ledger.add(meal("Toast", 300, day(15))).unwrap();
        ledger.add(meal("Pasta", 450, day(15))).unwrap();
        ledger.add(meal("Apple", 120, day(15))).unwrap();
        ledger.add(meal("Pizza", 900, day(14))).unwrap();
        ledger.add(meal("Cake", 500, day(16))).unwrap();

        assert_eq!(ledger.total_calories_on(day(15)), 870);
        assert_eq!(ledger.total_calories_on(day(14)), 900);
        assert_eq!(ledger.total_calories_on(day(1)), 0);
    }

    #[test]
    fn test_add_rejects_oversized_calories() {
        let mut ledger = MealLedger::new();
        assert!(ledger.add(meal("Everything", 3_000_000_000, day(15))).is_err());
        let entry = ledger.add(meal("Toast", 300, day(15))).unwrap();
        let mut update = MealUpdate::from_entry(&entry);
        update.calories = 3_000_000_000;
        assert!(ledger.update(&entry.id, update).is_err());
        assert_eq!(ledger.total_calories_on(day(15)), 300);
    }

    #[test]
    fn test_total_saturates_on_stored_near_limit_entries() {
        let json = r#"[
            {"id":"a","description":"Big","calories":3000000000,"category":"lunch","date":"2024-06-15"},
            {"id":"b","description":"Bigger","calories":3000000000,"category":"dinner","date":"2024-06-15"}
        ]"#;
        let ledger: MealLedger = serde_json::from_str(json).unwrap();
        assert_eq!(ledger.total_calories_on(day(15)), u32::MAX);
    }

    #[test]
    fn test_entries_on_is_restartable() {
        let mut ledger = MealLedger::new();
        ledger.add(meal("Toast", 300, day(15))).unwrap();
        ledger.add(meal("Pasta", 450, day(15))).unwrap();

        let iter = ledger.entries_on(day(15));
        assert_eq!(iter.clone().count(), 2);
        assert_eq!(iter.map(|e| e.calories).sum::<u32>(), 750);
        assert!(ledger.entries_on(day(15)).all(|e| e.date == day(15)));
    }

    #[test]
    fn test_update_preserves_identity() {
        let mut ledger = MealLedger::new();
        let entry = ledger.add(meal("Toast", 300, day(15))).unwrap();

        let updated = ledger
            .update(
                &entry.id,
                MealUpdate {
                    description: "Buttered toast".to_string(),
                    calories: 380,
                    category: MealCategory::Breakfast,
                    date: day(15),
                },
            )
            .unwrap()
            .unwrap();

        assert_eq!(updated.id, entry.id);
        assert_eq!(updated.created_at, entry.created_at);
        let found: Vec<&MealEntry> = ledger.entries_on(day(15)).collect();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, entry.id);
        assert_eq!(found[0].calories, 380);
        assert_eq!(found[0].category, MealCategory::Breakfast);
    }

    #[test]
    fn test_update_can_move_date() {
        let mut ledger = MealLedger::new();
        let entry = ledger.add(meal("Toast", 300, day(15))).unwrap();
        let mut update = MealUpdate::from_entry(&entry);
        update.date = day(14);
        ledger.update(&entry.id, update).unwrap().unwrap();

        assert_eq!(ledger.total_calories_on(day(15)), 0);
        assert_eq!(ledger.total_calories_on(day(14)), 300);
    }

    #[test]
    fn test_update_not_found() {
        let mut ledger = MealLedger::new();
        let entry = ledger.add(meal("Toast", 300, day(15))).unwrap();
        let result = ledger
            .update("missing", MealUpdate::from_entry(&entry))
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_update_invalid_leaves_entry_untouched() {
        let mut ledger = MealLedger::new();
        let entry = ledger.add(meal("Toast", 300, day(15))).unwrap();
        let mut update = MealUpdate::from_entry(&entry);
        update.description = String::new();
        update.calories = 999;
        assert!(ledger.update(&entry.id, update).is_err());
        assert_eq!(ledger.get(&entry.id), Some(&entry));
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut ledger = MealLedger::new();
        let keep = ledger.add(meal("Toast", 300, day(15))).unwrap();
        let gone = ledger.add(meal("Pasta", 450, day(15))).unwrap();

        assert!(ledger.remove(&gone.id));
        let after_first = ledger.clone();
        assert!(!ledger.remove(&gone.id));
        assert_eq!(ledger, after_first);
        assert_eq!(ledger.entries(), std::slice::from_ref(&keep));
    }

    #[test]
    fn test_dates_logged() {
        let mut ledger = MealLedger::new();
        ledger.add(meal("A", 1, day(14))).unwrap();
        ledger.add(meal("B", 1, day(16))).unwrap();
        ledger.add(meal("C", 1, day(14))).unwrap();
        assert_eq!(ledger.dates_logged(), vec![day(16), day(14)]);
    }

    #[test]
    fn test_serializes_as_plain_sequence() {
        let mut ledger = MealLedger::new();
        ledger.add(meal("Toast", 300, day(15))).unwrap();
        let json = serde_json::to_value(&ledger).unwrap();
        assert!(json.is_array());
        let back: MealLedger = serde_json::from_value(json).unwrap();
        assert_eq!(back, ledger);
    }
}
