/// Tool for habit statistics and insights
///
/// This module implements the habit_stats MCP tool: rankings, distributions
/// and rewards as plain data series, plus a few written insights.

use chrono::{Duration, NaiveDate};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::analytics::{AnalyticsEngine, HabitStreakRank, Reward, Tally};
use crate::domain::{current_streak, longest_streak};
use crate::storage::{HabitStorage, StorageError};
use crate::tools::plural_days;

/// Parameters for the statistics report
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct StatsParams {
    /// Only count completions from the last N days in the most-done ranking
    pub days: Option<u32>,
}

/// Response with every statistics series
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub day_streak: u32,
    pub longest_day_streak: u32,
    /// First day included in `most_done`, if limited
    pub since: Option<NaiveDate>,
    pub most_done: Vec<Tally<String>>,
    pub most_productive_days: Vec<Tally<NaiveDate>>,
    pub least_productive_days: Vec<Tally<NaiveDate>>,
    pub scheduled_by_weekday: Vec<Tally<&'static str>>,
    pub scheduled_by_category: Vec<Tally<String>>,
    pub completions_by_category: Vec<Tally<String>>,
    pub completions_by_weekday: Vec<Tally<&'static str>>,
    pub longest_streaks: Vec<HabitStreakRank>,
    pub rewards: Vec<Reward>,
    pub insights: Vec<String>,
    pub message: String,
}

/// Build the full statistics report
pub fn habit_stats<S: HabitStorage>(
    storage: &S,
    params: StatsParams,
    today: NaiveDate,
) -> Result<StatsResponse, StorageError> {
    let analytics = AnalyticsEngine::new();
    let records = storage.completions()?;
    let habits = storage.scheduled_habits()?;
    let dates = storage.completion_dates()?;

    // A window reaching past the earliest representable date has no lower bound
    let since = params
        .days
        .and_then(|days| today.checked_sub_signed(Duration::days(i64::from(days))));
    let day_streak = current_streak(&dates, today);
    let longest_day_streak = longest_streak(&dates);

    let most_done = analytics.most_done(&records, since);
    let insights = analytics.generate_insights(&habits, &records, today);

    let mut message = format!(
        "📈 Day streak: {} | Best day streak: {}",
        plural_days(day_streak),
        plural_days(longest_day_streak)
    );
    if most_done.is_empty() {
        match params.days {
            Some(days) => message.push_str(&format!("\nNo habits done in the last {}.", plural_days(days))),
            None => message.push_str("\nNo habits done yet."),
        }
    } else {
        let ranking = most_done
            .iter()
            .map(|t| format!("{} ({})", t.key, t.count))
            .collect::<Vec<_>>()
            .join(", ");
        message.push_str(&format!("\nMost done: {}", ranking));
    }
    for insight in &insights {
        message.push_str(&format!("\n💡 {}", insight));
    }

    Ok(StatsResponse {
        day_streak,
        longest_day_streak,
        since,
        most_done,
        most_productive_days: analytics.most_productive_days(&records),
        least_productive_days: analytics.least_productive_days(&records),
        scheduled_by_weekday: analytics.scheduled_by_weekday(&habits),
        scheduled_by_category: analytics.scheduled_by_category(&habits),
        completions_by_category: analytics.completions_by_category(&records),
        completions_by_weekday: analytics.completions_by_weekday(&records),
        longest_streaks: analytics.longest_streaks_by_habit(&habits, &records),
        rewards: analytics.rewards(longest_day_streak),
        insights,
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CategoryDraft, NewHabit, Schedule};
    use crate::storage::sqlite::SqliteStorage;
    use chrono::Weekday;
    use tempfile::tempdir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_stats_report() {
        let temp_dir = tempdir().unwrap();
        let storage = SqliteStorage::new(temp_dir.path().join("test.db")).unwrap();
        let health = storage.add_category(&CategoryDraft::new("Health", None).unwrap()).unwrap();

        let a = storage
            .add_habit(&NewHabit::new("A", None, Some(health.id), Schedule::new([Weekday::Mon, Weekday::Tue])).unwrap())
            .unwrap();
        let b = storage
            .add_habit(&NewHabit::new("B", None, None, Schedule::new([Weekday::Mon])).unwrap())
            .unwrap();

        storage.mark_done(a.id, date(2024, 1, 1)).unwrap();
        storage.mark_done(a.id, date(2024, 1, 2)).unwrap();
        storage.mark_done(b.id, date(2024, 1, 1)).unwrap();

        let report = habit_stats(&storage, StatsParams::default(), date(2024, 1, 3)).unwrap();

        assert_eq!(
            report.most_done,
            vec![Tally::new("A".to_string(), 2), Tally::new("B".to_string(), 1)]
        );
        assert_eq!(report.day_streak, 2);
        assert_eq!(report.longest_day_streak, 2);
        assert_eq!(report.most_productive_days[0], Tally::new(date(2024, 1, 1), 2));
        assert_eq!(report.scheduled_by_weekday[0], Tally::new("Monday", 2));
        assert_eq!(report.completions_by_category, vec![Tally::new("Health".to_string(), 2)]);
        assert_eq!(report.longest_streaks[0].name, "A");
        assert!(report.message.contains("Most done: A (2), B (1)"));
    }

    #[test]
    fn test_stats_window() {
        let temp_dir = tempdir().unwrap();
        let storage = SqliteStorage::new(temp_dir.path().join("test.db")).unwrap();
        let run = storage.add_habit(&NewHabit::new("Run", None, None, Schedule::daily()).unwrap()).unwrap();
        storage.mark_done(run.id, date(2024, 1, 1)).unwrap();

        let report = habit_stats(&storage, StatsParams { days: Some(7) }, date(2024, 3, 1)).unwrap();
        assert!(report.most_done.is_empty());
        assert_eq!(report.since, Some(date(2024, 2, 23)));
        assert!(report.message.contains("last 7 days"));
    }

    #[test]
    fn test_stats_window_beyond_calendar_counts_everything() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        let run = storage.add_habit(&NewHabit::new("Run", None, None, Schedule::daily()).unwrap()).unwrap();
        storage.mark_done(run.id, date(2024, 1, 1)).unwrap();

        let report = habit_stats(&storage, StatsParams { days: Some(u32::MAX) }, date(2024, 1, 1)).unwrap();
        assert_eq!(report.since, None);
        assert_eq!(report.most_done, vec![Tally::new("Run".to_string(), 1)]);
    }

    #[test]
    fn test_stats_on_empty_database() {
        let temp_dir = tempdir().unwrap();
        let storage = SqliteStorage::new(temp_dir.path().join("test.db")).unwrap();

        let report = habit_stats(&storage, StatsParams::default(), date(2024, 1, 1)).unwrap();
        assert_eq!(report.day_streak, 0);
        assert!(report.most_done.is_empty());
        assert!(report.scheduled_by_weekday.is_empty());
        assert!(report.longest_streaks.is_empty());
    }
}
