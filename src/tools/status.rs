/// Tool for checking habit status and streaks
///
/// This module implements the habit_status MCP tool.

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::analytics::{AnalyticsEngine, Reward};
use crate::domain::{current_streak, longest_streak, HabitId, ScheduledHabit};
use crate::storage::{HabitStorage, StorageError};
use crate::tools::plural_days;

/// Parameters for checking habit status
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct StatusParams {
    /// ID of a specific habit; all habits if omitted
    pub habit_id: Option<HabitId>,
}

/// Information about a single habit's status
#[derive(Debug, Serialize)]
pub struct HabitStatus {
    pub habit_id: HabitId,
    pub name: String,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub completion_rate: f64,
    pub last_completed: Option<NaiveDate>,
    /// "new", "on_track" or "missed"
    pub status: String,
}

/// Response from checking habit status
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub habits: Vec<HabitStatus>,
    /// Consecutive days with at least one completed habit
    pub day_streak: u32,
    pub longest_day_streak: u32,
    pub done_today: u32,
    pub last_reset: Option<NaiveDate>,
    pub rewards: Vec<Reward>,
    pub summary: String,
    pub message: String,
}

/// Get status for habits using the provided storage
pub fn habit_status<S: HabitStorage>(
    storage: &S,
    params: StatusParams,
    today: NaiveDate,
) -> Result<StatusResponse, StorageError> {
    let analytics = AnalyticsEngine::new();
    let records = storage.completions()?;

    let selected: Vec<ScheduledHabit> = match params.habit_id {
        Some(habit_id) => {
            // Fails with HabitNotFound for unknown ids
            storage.get_habit(habit_id)?;
            storage
                .scheduled_habits()?
                .into_iter()
                .filter(|h| h.habit_id == habit_id)
                .collect()
        }
        None => storage.scheduled_habits()?,
    };

    let habits: Vec<HabitStatus> = selected
        .iter()
        .map(|habit| {
            let streak = analytics.calculate_habit_streak(habit, &records, today);
            let status = if streak.total_completions == 0 {
                "new"
            } else if streak.is_on_track(&habit.schedule, today) {
                "on_track"
            } else {
                "missed"
            };
            HabitStatus {
                habit_id: habit.habit_id,
                name: habit.name.clone(),
                current_streak: streak.current_streak,
                longest_streak: streak.longest_streak,
                completion_rate: streak.completion_rate,
                last_completed: streak.last_completed,
                status: status.to_string(),
            }
        })
        .collect();

    let dates = storage.completion_dates()?;
    let day_streak = current_streak(&dates, today);
    let longest_day_streak = longest_streak(&dates);
    let done_today = storage.count_done_today()?;

    let summary = if habits.is_empty() {
        "No habits found. Create your first habit to get started!".to_string()
    } else {
        let on_track = habits.iter().filter(|h| h.status == "on_track").count();
        format!(
            "📊 Status: {} of {} habits on track, {} done today. Day streak: {} (best {})",
            on_track,
            habits.len(),
            done_today,
            plural_days(day_streak),
            plural_days(longest_day_streak)
        )
    };

    let details = habits
        .iter()
        .map(|h| {
            format!(
                "🎯 {} (#{})\n   Current streak: {} | Best: {} | Rate: {:.1}%{}",
                h.name,
                h.habit_id,
                plural_days(h.current_streak),
                plural_days(h.longest_streak),
                h.completion_rate * 100.0,
                match h.last_completed {
                    Some(last) => format!("\n   Last completed: {}", last),
                    None => String::new(),
                }
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    let message = if details.is_empty() {
        summary.clone()
    } else {
        format!("{}\n\n{}", summary, details)
    };

    Ok(StatusResponse {
        habits,
        day_streak,
        longest_day_streak,
        done_today,
        last_reset: storage.last_reset()?,
        rewards: analytics.rewards(longest_day_streak),
        summary,
        message,
    })
}
