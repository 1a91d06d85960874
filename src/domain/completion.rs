/// Completion records and schedule rows used by the statistics engine
///
/// A completion is one `(habit, date)` pair from the completion log, joined
/// with the habit's display name and category so it can be grouped without
/// further lookups.

use serde::{Deserialize, Serialize};
use chrono::NaiveDate;
use crate::domain::{HabitId, Schedule};

/// A habit marked done on a specific calendar day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRecord {
    /// Which habit was completed
    pub habit_id: HabitId,
    /// The habit's current name
    pub habit_name: String,
    /// The habit's category name, if it has one
    pub category: Option<String>,
    /// Which day the completion counts for
    pub date: NaiveDate,
}

impl CompletionRecord {
    pub fn new(habit_id: HabitId, habit_name: &str, category: Option<&str>, date: NaiveDate) -> Self {
        Self {
            habit_id,
            habit_name: habit_name.to_string(),
            category: category.map(str::to_string),
            date,
        }
    }
}

/// A habit together with its weekday schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledHabit {
    pub habit_id: HabitId,
    pub name: String,
    pub category: Option<String>,
    pub schedule: Schedule,
    /// Calendar day the habit was created
    pub created_on: NaiveDate,
}

/// Completion dates of one habit, sorted ascending without duplicates
pub fn dates_for_habit(records: &[CompletionRecord], habit_id: HabitId) -> Vec<NaiveDate> {
    let mut dates: Vec<NaiveDate> = records
        .iter()
        .filter(|r| r.habit_id == habit_id)
        .map(|r| r.date)
        .collect();
    dates.sort();
    dates.dedup();
    dates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dates_for_habit_filters_and_sorts() {
        let d = |day| NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
        let records = vec![
            CompletionRecord::new(HabitId(1), "Run", None, d(3)),
            CompletionRecord::new(HabitId(2), "Read", None, d(1)),
            CompletionRecord::new(HabitId(1), "Run", None, d(1)),
            CompletionRecord::new(HabitId(1), "Run", None, d(3)),
        ];

        assert_eq!(dates_for_habit(&records, HabitId(1)), vec![d(1), d(3)]);
        assert!(dates_for_habit(&records, HabitId(9)).is_empty());
    }
}
