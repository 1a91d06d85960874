/// Analytics engine for statistics, rankings and rewards
///
/// This module turns completion records and habit schedules into the plain
/// data series shown on the statistics screens: rankings, distributions,
/// per-habit streaks, daily progress and streak rewards. Everything here is
/// pure; the current date is always passed in.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;

use crate::domain::{
    dates_for_habit, longest_scheduled_streak, longest_streak, weekday_name, CompletionRecord,
    ScheduledHabit, Streak, WEEKDAYS,
};

/// Longest overall day streaks that unlock a reward
pub const REWARD_MILESTONES: [u32; 4] = [5, 15, 25, 50];

/// How many days the least-productive ranking keeps
pub const LEAST_PRODUCTIVE_LIMIT: usize = 3;

/// One bar of a chart: a key and how often it occurred
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tally<K> {
    pub key: K,
    pub count: u32,
}

impl<K> Tally<K> {
    pub fn new(key: K, count: u32) -> Self {
        Self { key, count }
    }
}

/// Longest streaks of one habit, with and without its schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HabitStreakRank {
    pub name: String,
    /// Consecutive calendar days, ignoring the schedule
    pub longest_streak: u32,
    /// Consecutive scheduled occurrences
    pub longest_scheduled_streak: u32,
}

/// A streak milestone and whether it has been reached
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reward {
    pub days: u32,
    pub unlocked: bool,
}

/// Habits done today out of the habits scheduled today
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyProgress {
    pub done: u32,
    pub scheduled: u32,
    /// `done / scheduled` clamped to 0.0..=1.0, 0.0 when nothing is scheduled
    pub ratio: f64,
}

fn count_by<K: Ord, I: IntoIterator<Item = K>>(keys: I) -> BTreeMap<K, u32> {
    let mut counts = BTreeMap::new();
    for key in keys {
        *counts.entry(key).or_insert(0) += 1;
    }
    counts
}

/// Highest count first, ties broken by key
fn ranked<K: Ord>(counts: BTreeMap<K, u32>) -> Vec<Tally<K>> {
    let mut tallies: Vec<Tally<K>> = counts
        .into_iter()
        .map(|(key, count)| Tally::new(key, count))
        .collect();
    tallies.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
    tallies
}

/// Weekdays in Monday..Sunday order, skipping days with no count
fn by_weekday(counts: BTreeMap<u32, u32>) -> Vec<Tally<&'static str>> {
    WEEKDAYS
        .iter()
        .filter_map(|day| {
            counts
                .get(&day.num_days_from_monday())
                .map(|count| Tally::new(weekday_name(*day), *count))
        })
        .collect()
}

/// Analytics engine for processing habit data
///
/// Stateless; holds the logic for turning stored records into statistics.
#[derive(Debug, Default)]
pub struct AnalyticsEngine;

impl AnalyticsEngine {
    /// Create a new analytics engine
    pub fn new() -> Self {
        Self
    }

    /// Calculate streak information for a habit from the completion log
    pub fn calculate_habit_streak(
        &self,
        habit: &ScheduledHabit,
        records: &[CompletionRecord],
        today: NaiveDate,
    ) -> Streak {
        let dates = dates_for_habit(records, habit.habit_id);
        Streak::calculate(habit.habit_id, &dates, &habit.schedule, habit.created_on, today)
    }

    /// Completion counts per habit name, optionally only from `since` onwards
    pub fn most_done(&self, records: &[CompletionRecord], since: Option<NaiveDate>) -> Vec<Tally<String>> {
        let counts = count_by(
            records
                .iter()
                .filter(|r| since.map_or(true, |start| r.date >= start))
                .map(|r| r.habit_name.clone()),
        );
        ranked(counts)
    }

    /// Days ranked by number of completions, busiest first
    pub fn most_productive_days(&self, records: &[CompletionRecord]) -> Vec<Tally<NaiveDate>> {
        ranked(count_by(records.iter().map(|r| r.date)))
    }

    /// The days with the fewest completions among days that had any
    pub fn least_productive_days(&self, records: &[CompletionRecord]) -> Vec<Tally<NaiveDate>> {
        let mut tallies: Vec<Tally<NaiveDate>> = count_by(records.iter().map(|r| r.date))
            .into_iter()
            .map(|(date, count)| Tally::new(date, count))
            .collect();
        tallies.sort_by(|a, b| a.count.cmp(&b.count).then_with(|| a.key.cmp(&b.key)));
        tallies.truncate(LEAST_PRODUCTIVE_LIMIT);
        tallies
    }

    /// Number of habits scheduled on each weekday
    pub fn scheduled_by_weekday(&self, habits: &[ScheduledHabit]) -> Vec<Tally<&'static str>> {
        by_weekday(count_by(
            habits
                .iter()
                .flat_map(|h| h.schedule.days().iter().map(Weekday::num_days_from_monday)),
        ))
    }

    /// Number of habits in each category, whatever their weekdays
    ///
    /// Habits without a category are not counted.
    pub fn scheduled_by_category(&self, habits: &[ScheduledHabit]) -> Vec<Tally<String>> {
        ranked(count_by(habits.iter().filter_map(|h| h.category.clone())))
    }

    /// Completion counts per category
    pub fn completions_by_category(&self, records: &[CompletionRecord]) -> Vec<Tally<String>> {
        ranked(count_by(records.iter().filter_map(|r| r.category.clone())))
    }

    /// Completion counts per weekday, derived from each completion's date
    pub fn completions_by_weekday(&self, records: &[CompletionRecord]) -> Vec<Tally<&'static str>> {
        by_weekday(count_by(
            records.iter().map(|r| r.date.weekday().num_days_from_monday()),
        ))
    }

    /// Longest streak of every habit, best first
    pub fn longest_streaks_by_habit(
        &self,
        habits: &[ScheduledHabit],
        records: &[CompletionRecord],
    ) -> Vec<HabitStreakRank> {
        let mut ranks: Vec<HabitStreakRank> = habits
            .iter()
            .map(|habit| {
                let dates = dates_for_habit(records, habit.habit_id);
                HabitStreakRank {
                    name: habit.name.clone(),
                    longest_streak: longest_streak(&dates),
                    longest_scheduled_streak: longest_scheduled_streak(&dates, &habit.schedule),
                }
            })
            .collect();

        ranks.sort_by(|a, b| {
            b.longest_streak
                .cmp(&a.longest_streak)
                .then_with(|| a.name.cmp(&b.name))
        });
        ranks
    }

    /// Habits scheduled on a weekday, ordered by name
    pub fn agenda_for<'a>(&self, habits: &'a [ScheduledHabit], weekday: Weekday) -> Vec<&'a ScheduledHabit> {
        let mut agenda: Vec<&ScheduledHabit> = habits
            .iter()
            .filter(|h| h.schedule.contains(weekday))
            .collect();
        agenda.sort_by(|a, b| a.name.cmp(&b.name));
        agenda
    }

    pub fn daily_progress(&self, done: u32, scheduled: u32) -> DailyProgress {
        let ratio = if scheduled == 0 {
            0.0
        } else {
            (done as f64 / scheduled as f64).min(1.0)
        };
        DailyProgress { done, scheduled, ratio }
    }

    /// Milestone rewards, unlocked by the longest overall day streak
    pub fn rewards(&self, longest_overall_streak: u32) -> Vec<Reward> {
        REWARD_MILESTONES
            .iter()
            .map(|days| Reward {
                days: *days,
                unlocked: longest_overall_streak >= *days,
            })
            .collect()
    }

    /// Short human-readable observations about the user's habits
    pub fn generate_insights(
        &self,
        habits: &[ScheduledHabit],
        records: &[CompletionRecord],
        today: NaiveDate,
    ) -> Vec<String> {
        let mut insights = Vec::new();

        if habits.is_empty() {
            insights.push("Start by creating your first habit to track!".to_string());
            return insights;
        }

        if records.is_empty() {
            insights.push("Great job creating habits! Now start marking them done.".to_string());
            return insights;
        }

        insights.push(format!(
            "You have {} habits with {} total completions. Keep up the great work!",
            habits.len(),
            records.len()
        ));

        if let Some(top) = self.most_done(records, None).first() {
            insights.push(format!("Your most completed habit is '{}' ({} times).", top.key, top.count));
        }

        if let Some(best_day) = self
            .completions_by_weekday(records)
            .into_iter()
            .rev()
            .max_by_key(|tally| tally.count)
        {
            insights.push(format!("{} is your most productive weekday.", best_day.key));
        }

        let unscheduled: Vec<&str> = habits
            .iter()
            .filter(|h| h.schedule.is_empty())
            .map(|h| h.name.as_str())
            .collect();
        if !unscheduled.is_empty() {
            insights.push(format!(
                "These habits have no scheduled days yet: {}.",
                unscheduled.join(", ")
            ));
        }

        let slipping: Vec<&str> = habits
            .iter()
            .filter(|h| {
                let streak = self.calculate_habit_streak(h, records, today);
                streak.total_completions > 0 && !streak.is_on_track(&h.schedule, today)
            })
            .map(|h| h.name.as_str())
            .collect();
        if !slipping.is_empty() {
            insights.push(format!(
                "You missed the last scheduled day of: {}. Today is a good day to restart.",
                slipping.join(", ")
            ));
        }

        insights
    }
}
