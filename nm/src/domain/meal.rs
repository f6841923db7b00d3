//! Recommendations, planned meals and the pending schedule selection

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::{ParseLabelError, TimeOfDay, parse_label};

/// A single suggested meal; ephemeral, superseded by the next request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recommendation {
    pub name: String,
    pub reason: String,
    /// Backend meal id when the service returned one
    pub meal_id: Option<i64>,
}

/// Meal slot of a plan entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MealSlot {
    Breakfast,
    Lunch,
    Dinner,
}

impl MealSlot {
    pub const ALL: [MealSlot; 3] = [MealSlot::Breakfast, MealSlot::Lunch, MealSlot::Dinner];

    pub fn as_str(self) -> &'static str {
        match self {
            MealSlot::Breakfast => "Breakfast",
            MealSlot::Lunch => "Lunch",
            MealSlot::Dinner => "Dinner",
        }
    }

    /// Slot to preselect when scheduling a suggestion made for `time`
    ///
    /// Snacks have no slot of their own and land on lunch.
    pub fn for_time_of_day(time: TimeOfDay) -> Self {
        match time {
            TimeOfDay::Breakfast => MealSlot::Breakfast,
            TimeOfDay::Lunch | TimeOfDay::Snacking => MealSlot::Lunch,
            TimeOfDay::Dinner => MealSlot::Dinner,
        }
    }
}

impl fmt::Display for MealSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MealSlot {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_label("meal slot", s, &MealSlot::ALL, MealSlot::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MealReference {
    pub name: String,
    pub category: String,
}

/// A committed plan entry as returned by the backend; immutable once fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedMeal {
    pub id: i64,
    pub date: NaiveDateTime,
    pub meal_type: MealSlot,
    pub meal: MealReference,
}

/// Ordered, read-only view of the backend plan (backend order, never resorted)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Plan {
    entries: Vec<PlannedMeal>,
}

impl Plan {
    pub fn new(entries: Vec<PlannedMeal>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[PlannedMeal] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PlannedMeal> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries planned for a calendar day
    pub fn on(&self, day: NaiveDate) -> impl Iterator<Item = &PlannedMeal> {
        self.entries.iter().filter(move |m| m.date.date() == day)
    }
}

impl<'a> IntoIterator for &'a Plan {
    type Item = &'a PlannedMeal;
    type IntoIter = std::slice::Iter<'a, PlannedMeal>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Date and slot the user is about to commit a recommendation to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingSchedule {
    pub date: NaiveDate,
    pub slot: MealSlot,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: i64, day: u32, slot: MealSlot) -> PlannedMeal {
        PlannedMeal {
            id,
            date: NaiveDate::from_ymd_opt(2026, 10, day)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
            meal_type: slot,
            meal: MealReference {
                name: format!("meal-{}", id),
                category: "Veg".to_string(),
            },
        }
    }

    #[test]
    fn test_slot_for_time_of_day() {
        assert_eq!(MealSlot::for_time_of_day(TimeOfDay::Breakfast), MealSlot::Breakfast);
        assert_eq!(MealSlot::for_time_of_day(TimeOfDay::Dinner), MealSlot::Dinner);
        assert_eq!(MealSlot::for_time_of_day(TimeOfDay::Snacking), MealSlot::Lunch);
    }

    #[test]
    fn test_plan_keeps_backend_order() {
        let plan = Plan::new(vec![entry(3, 20, MealSlot::Dinner), entry(1, 18, MealSlot::Lunch)]);
        let ids: Vec<i64> = plan.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![3, 1]);
    }

    #[test]
    fn test_plan_entries_on_day() {
        let plan = Plan::new(vec![
            entry(1, 18, MealSlot::Lunch),
            entry(2, 20, MealSlot::Dinner),
            entry(3, 18, MealSlot::Dinner),
        ]);
        let day = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let ids: Vec<i64> = plan.on(day).map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }
}
