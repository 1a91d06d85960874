/// Tools for browsing habits
///
/// This module implements the habit_list, habit_agenda and habit_history
/// MCP tools.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::analytics::AnalyticsEngine;
use crate::domain::{
    dates_for_habit, parse_weekday, weekday_name, ArchivedHabit, HabitId, Schedule, Streak, WEEKDAYS,
};
use crate::storage::{HabitStorage, StorageError};
use crate::tools::{plural_days, NoParams};

/// Parameters for listing habits
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ListHabitsParams {
    /// Only list habits in this category (by name, case-insensitive)
    pub category: Option<String>,
}

/// Information about a habit in the list
#[derive(Debug, Serialize)]
pub struct HabitSummary {
    pub habit_id: HabitId,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub schedule: Schedule,
    pub created_at: NaiveDateTime,
    pub current_streak: u32,
    pub completion_rate: f64,
    pub total_completions: u32,
}

/// Summary statistics for all listed habits
#[derive(Debug, Serialize)]
pub struct HabitListSummary {
    pub total_habits: u32,
    pub avg_completion_rate: f64,
}

/// Response from listing habits
#[derive(Debug, Serialize)]
pub struct ListHabitsResponse {
    pub habits: Vec<HabitSummary>,
    pub summary: HabitListSummary,
    pub message: String,
}

/// List habits with their schedules and streaks
pub fn list_habits<S: HabitStorage>(
    storage: &S,
    params: ListHabitsParams,
    today: NaiveDate,
) -> Result<ListHabitsResponse, StorageError> {
    let records = storage.completions()?;
    let wanted = params.category.as_deref().map(str::trim).map(str::to_lowercase);

    let habits: Vec<HabitSummary> = storage
        .list_habits()?
        .into_iter()
        .filter(|h| match &wanted {
            Some(name) => h.category.as_deref().map(str::to_lowercase).as_ref() == Some(name),
            None => true,
        })
        .map(|h| {
            let dates = dates_for_habit(&records, h.id);
            let streak = Streak::calculate(h.id, &dates, &h.schedule, h.created_at.date(), today);
            HabitSummary {
                habit_id: h.id,
                name: h.name,
                description: h.description,
                category: h.category,
                schedule: h.schedule,
                created_at: h.created_at,
                current_streak: streak.current_streak,
                completion_rate: streak.completion_rate,
                total_completions: streak.total_completions,
            }
        })
        .collect();

    let total_habits = habits.len() as u32;
    let avg_completion_rate = if habits.is_empty() {
        0.0
    } else {
        habits.iter().map(|h| h.completion_rate).sum::<f64>() / habits.len() as f64
    };

    let message = if habits.is_empty() {
        "No habits found. Create your first habit to get started!".to_string()
    } else {
        let lines = habits
            .iter()
            .map(|h| {
                format!(
                    "🎯 **{}** (#{}{})\n   📅 {} | 🔥 Streak: {} | 📊 Rate: {:.1}% | ✅ Total: {}",
                    h.name,
                    h.habit_id,
                    h.category.as_deref().map(|c| format!(", {}", c)).unwrap_or_default(),
                    h.schedule,
                    plural_days(h.current_streak),
                    h.completion_rate * 100.0,
                    h.total_completions
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n");
        format!(
            "📋 **Habit Summary** ({} habits)\n\n{}\n\n📊 Average completion rate: {:.1}%",
            total_habits,
            lines,
            avg_completion_rate * 100.0
        )
    };

    Ok(ListHabitsResponse {
        habits,
        summary: HabitListSummary {
            total_habits,
            avg_completion_rate,
        },
        message,
    })
}

/// Parameters for the weekly agenda
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct AgendaParams {
    /// Show only this weekday (e.g. "Monday"); the whole week if omitted
    pub weekday: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AgendaEntry {
    pub habit_id: HabitId,
    pub name: String,
    pub category: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AgendaDay {
    pub weekday: &'static str,
    pub is_today: bool,
    pub habits: Vec<AgendaEntry>,
}

#[derive(Debug, Serialize)]
pub struct AgendaResponse {
    pub days: Vec<AgendaDay>,
    pub message: String,
}

/// Which habits are due on each weekday
pub fn habit_agenda<S: HabitStorage>(
    storage: &S,
    params: AgendaParams,
    today: NaiveDate,
) -> Result<AgendaResponse, StorageError> {
    let weekdays: Vec<Weekday> = match params.weekday.as_deref() {
        Some(name) => vec![parse_weekday(name)?],
        None => WEEKDAYS.to_vec(),
    };

    let analytics = AnalyticsEngine::new();
    let scheduled = storage.scheduled_habits()?;

    let days: Vec<AgendaDay> = weekdays
        .into_iter()
        .map(|weekday| AgendaDay {
            weekday: weekday_name(weekday),
            is_today: weekday == today.weekday(),
            habits: analytics
                .agenda_for(&scheduled, weekday)
                .into_iter()
                .map(|h| AgendaEntry {
                    habit_id: h.habit_id,
                    name: h.name.clone(),
                    category: h.category.clone(),
                })
                .collect(),
        })
        .collect();

    let message = days
        .iter()
        .map(|day| {
            let names = if day.habits.is_empty() {
                "-".to_string()
            } else {
                day.habits.iter().map(|h| h.name.as_str()).collect::<Vec<_>>().join(", ")
            };
            format!("{}{}: {}", day.weekday, if day.is_today { " (today)" } else { "" }, names)
        })
        .collect::<Vec<_>>()
        .join("\n");

    Ok(AgendaResponse { days, message })
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub deleted: Vec<ArchivedHabit>,
    pub message: String,
}

/// Habits that were deleted, most recent first
pub fn habit_history<S: HabitStorage>(
    storage: &S,
    _params: NoParams,
) -> Result<HistoryResponse, StorageError> {
    let deleted = storage.habit_history()?;

    let message = if deleted.is_empty() {
        "No deleted habits.".to_string()
    } else {
        deleted
            .iter()
            .map(|h| format!("🗄️ {} (#{}), created {}", h.name, h.habit_id, h.created_at))
            .collect::<Vec<_>>()
            .join("\n")
    };

    Ok(HistoryResponse { deleted, message })
}
