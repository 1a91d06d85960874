/// Tool for creating new habits
///
/// This module implements the habit_create MCP tool.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use crate::domain::{CategoryId, HabitId, NewHabit, Schedule};
use crate::storage::{HabitStorage, StorageError};

/// Parameters for creating a new habit
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateHabitParams {
    /// Name of the habit
    pub name: String,
    /// Optional longer description
    pub description: Option<String>,
    /// ID of the category to file the habit under (optional)
    pub category_id: Option<CategoryId>,
    /// Weekdays the habit is due, e.g. ["Monday", "Thursday"]
    #[serde(default)]
    pub days: Vec<String>,
}

/// Response from creating a habit
#[derive(Debug, Serialize)]
pub struct CreateHabitResponse {
    pub success: bool,
    pub habit_id: HabitId,
    pub schedule: Schedule,
    pub message: String,
}

/// Create a new habit using the provided storage
pub fn create_habit<S: HabitStorage>(
    storage: &S,
    params: CreateHabitParams,
) -> Result<CreateHabitResponse, StorageError> {
    let schedule = Schedule::parse(&params.days)?;
    let new_habit = NewHabit::new(&params.name, params.description, params.category_id, schedule)?;

    let habit = storage.add_habit(&new_habit)?;

    let message = if new_habit.schedule.is_empty() {
        format!(
            "✅ Created habit '{}'. It has no scheduled days yet, add some with habit_update.",
            habit.name
        )
    } else {
        format!(
            "✅ Created habit '{}' for {}! Ready to start your streak!",
            habit.name, new_habit.schedule
        )
    };

    Ok(CreateHabitResponse {
        success: true,
        habit_id: habit.id,
        schedule: new_habit.schedule,
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CategoryDraft;
    use crate::storage::sqlite::SqliteStorage;
    use chrono::Weekday;
    use tempfile::tempdir;

    fn params(name: &str, days: &[&str]) -> CreateHabitParams {
        CreateHabitParams {
            name: name.to_string(),
            description: None,
            category_id: None,
            days: days.iter().map(|d| d.to_string()).collect(),
        }
    }

    #[test]
    fn test_create_habit() {
        let temp_dir = tempdir().unwrap();
        let storage = SqliteStorage::new(temp_dir.path().join("test.db")).unwrap();
        let health = storage.add_category(&CategoryDraft::new("Health", None).unwrap()).unwrap();

        let mut create = params("Morning Run", &["Monday", "thu"]);
        create.category_id = Some(health.id);

        let response = create_habit(&storage, create).unwrap();
        assert!(response.success);
        assert!(response.message.contains("Monday, Thursday"));

        let habit = storage.get_habit(response.habit_id).unwrap();
        assert_eq!(habit.category_id, Some(health.id));
        assert_eq!(
            storage.get_schedule(response.habit_id).unwrap().days(),
            &[Weekday::Mon, Weekday::Thu]
        );
    }

    #[test]
    fn test_create_habit_without_days() {
        let temp_dir = tempdir().unwrap();
        let storage = SqliteStorage::new(temp_dir.path().join("test.db")).unwrap();

        let response = create_habit(&storage, params("Read", &[])).unwrap();
        assert!(response.schedule.is_empty());
        assert!(response.message.contains("no scheduled days"));
    }

    #[test]
    fn test_create_habit_rejects_bad_input() {
        let temp_dir = tempdir().unwrap();
        let storage = SqliteStorage::new(temp_dir.path().join("test.db")).unwrap();

        assert!(matches!(
            create_habit(&storage, params("  ", &["Monday"])),
            Err(StorageError::Validation(_))
        ));
        assert!(matches!(
            create_habit(&storage, params("Run", &["Someday"])),
            Err(StorageError::Validation(_))
        ));
        assert!(storage.list_habits().unwrap().is_empty());
    }
}
