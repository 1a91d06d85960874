/// Habit entity and related functionality
///
/// This module defines the core Habit struct that represents a user's habit
/// they want to track, together with the validated inputs used to create
/// and modify habits and the read models handed to the presentation layer.

use serde::{Deserialize, Serialize};
use chrono::{Local, NaiveDateTime, SubsecRound};
use crate::domain::{CategoryId, DomainError, HabitId, Schedule};

const MAX_NAME_LEN: usize = 100;
const MAX_DESCRIPTION_LEN: usize = 500;

/// A habit represents something the user wants to do on certain weekdays
///
/// `done` is today's cached status. It mirrors whether today's date is in
/// the completion log and is cleared once per day by the daily reset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    /// Unique identifier for this habit
    pub id: HabitId,
    /// Display name (e.g., "Morning Run", "Read for 30min")
    pub name: String,
    /// Optional detailed description
    pub description: Option<String>,
    /// Category this habit belongs to, if any
    pub category_id: Option<CategoryId>,
    /// Whether the habit has been marked done today
    pub done: bool,
    /// When this habit was created (local time, second precision)
    pub created_at: NaiveDateTime,
}

impl Habit {
    /// Create a habit from existing data (used when loading from database)
    pub fn from_existing(
        id: HabitId,
        name: String,
        description: Option<String>,
        category_id: Option<CategoryId>,
        done: bool,
        created_at: NaiveDateTime,
    ) -> Self {
        Self {
            id,
            name,
            description,
            category_id,
            done,
            created_at,
        }
    }
}

/// Validated input for creating a habit
///
/// The name is stored trimmed. `created_at` is stamped at construction time.
#[derive(Debug, Clone, PartialEq)]
pub struct NewHabit {
    pub name: String,
    pub description: Option<String>,
    pub category_id: Option<CategoryId>,
    pub schedule: Schedule,
    pub created_at: NaiveDateTime,
}

impl NewHabit {
    /// Create a new habit input with validation
    pub fn new(
        name: &str,
        description: Option<String>,
        category_id: Option<CategoryId>,
        schedule: Schedule,
    ) -> Result<Self, DomainError> {
        let name = validate_name(name)?;
        let description = normalize_description(description)?;

        Ok(Self {
            name,
            description,
            category_id,
            schedule,
            created_at: Local::now().naive_local().trunc_subsecs(0),
        })
    }
}

/// Requested changes to an existing habit
///
/// Every field is optional. A name that is blank after trimming and an empty
/// day list are treated as "leave unchanged", matching how the habit form
/// submits untouched fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HabitUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<CategoryId>,
    pub schedule: Option<Schedule>,
}

impl HabitUpdate {
    /// Build an update, validating any name that will actually be applied
    pub fn new(
        name: Option<String>,
        description: Option<String>,
        category_id: Option<CategoryId>,
        schedule: Option<Schedule>,
    ) -> Result<Self, DomainError> {
        let name = match name {
            Some(n) if !n.trim().is_empty() => Some(validate_name(&n)?),
            _ => None,
        };
        let description = normalize_description(description)?;
        let schedule = schedule.filter(|s| !s.is_empty());

        Ok(Self {
            name,
            description,
            category_id,
            schedule,
        })
    }

    /// True when applying this update would not change anything
    pub fn is_noop(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.category_id.is_none()
            && self.schedule.is_none()
    }
}

/// One row of "today's habits": the habits scheduled on today's weekday
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodayHabit {
    pub name: String,
    pub id: HabitId,
    pub done: bool,
}

/// One row of the full habit table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitOverview {
    pub id: HabitId,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub schedule: Schedule,
    pub created_at: NaiveDateTime,
}

/// Snapshot of a habit taken when it was deleted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchivedHabit {
    pub habit_id: HabitId,
    pub name: String,
    pub created_at: NaiveDateTime,
}

/// Validate habit name according to business rules, returning it trimmed
fn validate_name(name: &str) -> Result<String, DomainError> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Err(DomainError::InvalidHabitName(
            "Habit name cannot be empty".to_string()
        ));
    }

    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(DomainError::InvalidHabitName(
            format!("Habit name cannot be longer than {} characters", MAX_NAME_LEN)
        ));
    }

    Ok(trimmed.to_string())
}

/// Blank descriptions become `None`; overly long ones are rejected
fn normalize_description(description: Option<String>) -> Result<Option<String>, DomainError> {
    match description {
        Some(desc) if desc.trim().is_empty() => Ok(None),
        Some(desc) if desc.chars().count() > MAX_DESCRIPTION_LEN => Err(DomainError::Validation {
            message: format!("Description cannot be longer than {} characters", MAX_DESCRIPTION_LEN)
        }),
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    #[test]
    fn test_create_valid_habit() {
        let habit = NewHabit::new(
            "  Morning Run ",
            Some("30-minute jog around the neighborhood".to_string()),
            Some(CategoryId(1)),
            Schedule::new([Weekday::Mon, Weekday::Thu]),
        );

        assert!(habit.is_ok());
        let habit = habit.unwrap();
        assert_eq!(habit.name, "Morning Run");
        assert_eq!(habit.category_id, Some(CategoryId(1)));
        assert_eq!(habit.schedule.days(), &[Weekday::Mon, Weekday::Thu]);
    }

    #[test]
    fn test_invalid_habit_name() {
        let result = NewHabit::new("   ", None, None, Schedule::daily());
        assert!(result.is_err());

        let long_name = "x".repeat(101);
        let result = NewHabit::new(&long_name, None, None, Schedule::daily());
        assert!(result.is_err());
    }

    #[test]
    fn test_blank_description_is_dropped() {
        let habit = NewHabit::new("Read", Some("  ".to_string()), None, Schedule::daily()).unwrap();
        assert_eq!(habit.description, None);
    }

    #[test]
    fn test_update_ignores_blank_name_and_empty_days() {
        let update = HabitUpdate::new(
            Some("   ".to_string()),
            None,
            None,
            Some(Schedule::default()),
        ).unwrap();

        assert_eq!(update.name, None);
        assert_eq!(update.schedule, None);
        assert!(update.is_noop());
    }

    #[test]
    fn test_update_trims_name() {
        let update = HabitUpdate::new(Some(" Stretch ".to_string()), None, None, None).unwrap();
        assert_eq!(update.name.as_deref(), Some("Stretch"));
        assert!(!update.is_noop());
    }
}
