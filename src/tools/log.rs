/// Tools for today's checklist and for marking habits done
///
/// This module implements the habit_today, habit_mark_done and
/// habit_unmark_done MCP tools.

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::analytics::{AnalyticsEngine, DailyProgress};
use crate::domain::{current_streak, dates_for_habit, motivational_message, HabitId, Streak, TodayHabit};
use crate::storage::{HabitStorage, StorageError};
use crate::tools::{plural_days, NoParams};

/// Response for today's checklist
#[derive(Debug, Serialize)]
pub struct TodayResponse {
    pub date: NaiveDate,
    pub habits: Vec<TodayHabit>,
    pub progress: DailyProgress,
    /// Consecutive days with at least one completed habit
    pub day_streak: u32,
    pub message: String,
}

/// Habits scheduled for today with their done flags
pub fn habit_today<S: HabitStorage>(
    storage: &S,
    _params: NoParams,
    today: NaiveDate,
) -> Result<TodayResponse, StorageError> {
    let habits = storage.today_habits(today)?;
    let done = habits.iter().filter(|h| h.done).count() as u32;
    let progress = AnalyticsEngine::new().daily_progress(done, habits.len() as u32);
    let day_streak = current_streak(&storage.completion_dates()?, today);

    let message = if habits.is_empty() {
        format!("Nothing scheduled for {}. Enjoy your day!", today.format("%A %Y-%m-%d"))
    } else {
        let lines = habits
            .iter()
            .map(|h| format!("{} {} (#{})", if h.done { "✅" } else { "⬜" }, h.name, h.id))
            .collect::<Vec<_>>()
            .join("\n");
        format!(
            "📅 {}: {} / {} done\n\n{}\n\n🔥 Day streak: {}",
            today.format("%A %Y-%m-%d"),
            progress.done,
            progress.scheduled,
            lines,
            plural_days(day_streak)
        )
    };

    Ok(TodayResponse {
        date: today,
        habits,
        progress,
        day_streak,
        message,
    })
}

/// Parameters for marking a habit done or not done
#[derive(Debug, Deserialize, JsonSchema)]
pub struct MarkDoneParams {
    /// ID of the habit
    pub habit_id: HabitId,
}

/// Response from marking or unmarking a habit
#[derive(Debug, Serialize)]
pub struct MarkDoneResponse {
    pub success: bool,
    pub habit_id: HabitId,
    pub name: String,
    pub done: bool,
    /// Consecutive scheduled occurrences of this habit completed
    pub current_streak: u32,
    /// Consecutive days with at least one completed habit
    pub day_streak: u32,
    pub message: String,
}

fn streaks_after_change<S: HabitStorage>(
    storage: &S,
    habit_id: HabitId,
    today: NaiveDate,
) -> Result<(Streak, u32), StorageError> {
    let habit = storage.get_habit(habit_id)?;
    let schedule = storage.get_schedule(habit_id)?;
    let dates = dates_for_habit(&storage.completions()?, habit_id);

    let streak = Streak::calculate(habit_id, &dates, &schedule, habit.created_at.date(), today);
    let day_streak = current_streak(&storage.completion_dates()?, today);
    Ok((streak, day_streak))
}

/// Mark a habit done for today
pub fn mark_done<S: HabitStorage>(
    storage: &S,
    params: MarkDoneParams,
    today: NaiveDate,
) -> Result<MarkDoneResponse, StorageError> {
    storage.mark_done(params.habit_id, today)?;

    let habit = storage.get_habit(params.habit_id)?;
    let (streak, day_streak) = streaks_after_change(storage, params.habit_id, today)?;

    Ok(MarkDoneResponse {
        success: true,
        habit_id: habit.id,
        message: format!(
            "🔥 Marked '{}' done! Current streak: {}\n{}",
            habit.name,
            plural_days(streak.current_streak),
            streak.motivational_message()
        ),
        name: habit.name,
        done: true,
        current_streak: streak.current_streak,
        day_streak,
    })
}

/// Undo today's completion of a habit
pub fn unmark_done<S: HabitStorage>(
    storage: &S,
    params: MarkDoneParams,
    today: NaiveDate,
) -> Result<MarkDoneResponse, StorageError> {
    storage.unmark_done(params.habit_id, today)?;

    let habit = storage.get_habit(params.habit_id)?;
    let (streak, day_streak) = streaks_after_change(storage, params.habit_id, today)?;

    Ok(MarkDoneResponse {
        success: true,
        habit_id: habit.id,
        message: format!(
            "↩️ '{}' is no longer marked done today. {}",
            habit.name,
            motivational_message(streak.current_streak)
        ),
        name: habit.name,
        done: false,
        current_streak: streak.current_streak,
        day_streak,
    })
}
