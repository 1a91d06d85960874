/// Tools for updating and deleting existing habits
///
/// This module implements the habit_update and habit_delete MCP tools.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use crate::domain::{ArchivedHabit, CategoryId, HabitId, HabitUpdate, Schedule};
use crate::storage::{HabitStorage, StorageError};

/// Parameters for updating an existing habit
///
/// Omitted fields are left unchanged. A blank name or an empty day list is
/// also treated as "no change".
#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateHabitParams {
    /// ID of the habit to update
    pub habit_id: HabitId,
    /// New name
    pub name: Option<String>,
    /// New description
    pub description: Option<String>,
    /// Move the habit to this category
    pub category_id: Option<CategoryId>,
    /// Replace the schedule with these weekdays
    pub days: Option<Vec<String>>,
}

/// Response from updating a habit
#[derive(Debug, Serialize)]
pub struct UpdateHabitResponse {
    pub success: bool,
    pub habit_id: HabitId,
    pub name: String,
    pub schedule: Schedule,
    pub message: String,
}

/// Update an existing habit using the provided storage
pub fn update_habit<S: HabitStorage>(
    storage: &S,
    params: UpdateHabitParams,
) -> Result<UpdateHabitResponse, StorageError> {
    let schedule = params
        .days
        .as_deref()
        .map(Schedule::parse)
        .transpose()?;

    let update = HabitUpdate::new(params.name, params.description, params.category_id, schedule)?;

    let (habit, message) = if update.is_noop() {
        let habit = storage.get_habit(params.habit_id)?;
        let message = format!("Nothing to change for habit '{}'", habit.name);
        (habit, message)
    } else {
        let habit = storage.modify_habit(params.habit_id, &update)?;
        let message = format!("✅ Updated habit '{}'", habit.name);
        (habit, message)
    };

    Ok(UpdateHabitResponse {
        success: true,
        habit_id: habit.id,
        schedule: storage.get_schedule(habit.id)?,
        name: habit.name,
        message,
    })
}

/// Parameters for deleting a habit
#[derive(Debug, Deserialize, JsonSchema)]
pub struct DeleteHabitParams {
    /// ID of the habit to delete
    pub habit_id: HabitId,
}

/// Response from deleting a habit
#[derive(Debug, Serialize)]
pub struct DeleteHabitResponse {
    pub success: bool,
    pub archived: ArchivedHabit,
    pub message: String,
}

/// Delete a habit; its completions stay in the log and it moves to the history
pub fn delete_habit<S: HabitStorage>(
    storage: &S,
    params: DeleteHabitParams,
) -> Result<DeleteHabitResponse, StorageError> {
    let archived = storage.delete_habit(params.habit_id)?;

    Ok(DeleteHabitResponse {
        success: true,
        message: format!(
            "🗑️ Deleted habit '{}'. Its past completions still count towards your day streak.",
            archived.name
        ),
        archived,
    })
}
