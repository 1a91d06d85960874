/// Streak calculation and tracking functionality
///
/// All calculations here are pure: they take completion dates, an optional
/// weekday schedule and the current date, and never look at the clock.
/// Input dates may arrive in any order and may contain duplicates.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use chrono::{Duration, NaiveDate};
use crate::domain::{HabitId, Schedule};

/// Current run of consecutive calendar days with at least one completion
///
/// The run is anchored at `today` when today is already done, otherwise at
/// yesterday, so an unfinished today does not break a streak. Any gap day
/// ends the run.
pub fn current_streak(dates: &[NaiveDate], today: NaiveDate) -> u32 {
    let done: BTreeSet<NaiveDate> = dates.iter().copied().collect();
    if done.is_empty() {
        return 0;
    }

    let mut checking_date = if done.contains(&today) {
        today
    } else {
        today - Duration::days(1)
    };

    let mut streak = 0;
    while done.contains(&checking_date) {
        streak += 1;
        checking_date = checking_date - Duration::days(1);
    }

    streak
}

/// Longest run of consecutive calendar days anywhere in the history
pub fn longest_streak(dates: &[NaiveDate]) -> u32 {
    let done: BTreeSet<NaiveDate> = dates.iter().copied().collect();
    longest_run(done.into_iter(), |last| Some(last + Duration::days(1)))
}

/// Longest run of consecutive scheduled occurrences that were all completed
///
/// Only completions on scheduled weekdays count. Two of them are consecutive
/// when the later one is the first scheduled day after the earlier one, so
/// the ordinary calendar gaps between scheduled days never break the run.
pub fn longest_scheduled_streak(dates: &[NaiveDate], schedule: &Schedule) -> u32 {
    let done = scheduled_completions(dates, schedule);
    longest_run(done.into_iter(), |last| schedule.next_after(last))
}

/// Current run of completed scheduled occurrences, counted back from today
///
/// Starts at the latest scheduled day on or before `today`. If that is today
/// and today is not done yet, the count starts from the previous scheduled
/// day instead.
pub fn current_scheduled_streak(dates: &[NaiveDate], schedule: &Schedule, today: NaiveDate) -> u32 {
    let done = scheduled_completions(dates, schedule);
    if done.is_empty() {
        return 0;
    }

    let mut checking_date = match schedule.latest_on_or_before(today) {
        Some(date) if date == today && !done.contains(&today) => {
            match schedule.previous_before(today) {
                Some(previous) => previous,
                None => return 0,
            }
        }
        Some(date) => date,
        None => return 0,
    };

    let mut streak = 0;
    while done.contains(&checking_date) {
        streak += 1;
        match schedule.previous_before(checking_date) {
            Some(previous) => checking_date = previous,
            None => break,
        }
    }

    streak
}

fn scheduled_completions(dates: &[NaiveDate], schedule: &Schedule) -> BTreeSet<NaiveDate> {
    dates
        .iter()
        .copied()
        .filter(|date| schedule.is_scheduled_for_date(*date))
        .collect()
}

/// Length of the longest chain in ascending `dates` where each date equals
/// `expected_next` of its predecessor
fn longest_run<I, F>(mut dates: I, expected_next: F) -> u32
where
    I: Iterator<Item = NaiveDate>,
    F: Fn(NaiveDate) -> Option<NaiveDate>,
{
    let Some(mut last_date) = dates.next() else {
        return 0;
    };

    let mut longest_streak = 1;
    let mut current_streak = 1;

    for date in dates {
        if expected_next(last_date) == Some(date) {
            current_streak += 1;
        } else {
            longest_streak = longest_streak.max(current_streak);
            current_streak = 1;
        }
        last_date = date;
    }

    longest_streak.max(current_streak)
}

/// Calculated streak information for a habit
///
/// This struct holds all the streak-related statistics for a habit,
/// computed against its weekday schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Streak {
    /// Which habit this streak data is for
    pub habit_id: HabitId,
    /// Current consecutive scheduled occurrences completed
    pub current_streak: u32,
    /// Best streak ever achieved for this habit
    pub longest_streak: u32,
    /// When the habit was last completed (None if never completed)
    pub last_completed: Option<NaiveDate>,
    /// Total number of days this habit has been completed
    pub total_completions: u32,
    /// Share of scheduled days since creation that were completed (0.0 to 1.0)
    pub completion_rate: f64,
}

impl Streak {
    /// Create a new streak record with zero values
    pub fn new(habit_id: HabitId) -> Self {
        Self {
            habit_id,
            current_streak: 0,
            longest_streak: 0,
            last_completed: None,
            total_completions: 0,
            completion_rate: 0.0,
        }
    }

    /// Calculate streak information from a habit's completion dates
    pub fn calculate(
        habit_id: HabitId,
        dates: &[NaiveDate],
        schedule: &Schedule,
        created_on: NaiveDate,
        today: NaiveDate,
    ) -> Self {
        let done: BTreeSet<NaiveDate> = dates.iter().copied().collect();
        if done.is_empty() {
            return Self::new(habit_id);
        }

        let current_streak = current_scheduled_streak(dates, schedule, today);
        let longest_streak = longest_scheduled_streak(dates, schedule);

        Self {
            habit_id,
            current_streak,
            longest_streak: longest_streak.max(current_streak),
            last_completed: done.iter().next_back().copied(),
            total_completions: done.len() as u32,
            completion_rate: Self::calculate_completion_rate(&done, schedule, created_on, today),
        }
    }

    /// Check if the habit is "on track": the most recent scheduled day that
    /// has already had a chance to be completed was completed
    pub fn is_on_track(&self, schedule: &Schedule, today: NaiveDate) -> bool {
        let Some(last_completed) = self.last_completed else {
            return false;
        };

        let due = match schedule.latest_on_or_before(today) {
            Some(date) if date == today && last_completed != today => schedule.previous_before(today),
            other => other,
        };

        match due {
            Some(due_date) => last_completed >= due_date,
            None => true,
        }
    }

    /// Get a motivational message based on current streak status
    pub fn motivational_message(&self) -> String {
        motivational_message(self.current_streak)
    }

    /// Completions on scheduled days since creation, divided by the number of
    /// scheduled days since creation
    fn calculate_completion_rate(
        done: &BTreeSet<NaiveDate>,
        schedule: &Schedule,
        created_on: NaiveDate,
        today: NaiveDate,
    ) -> f64 {
        let expected = schedule.occurrences_between(created_on, today);
        if expected == 0 {
            return 0.0;
        }

        let actual = done
            .iter()
            .filter(|date| **date >= created_on && **date <= today)
            .filter(|date| schedule.is_scheduled_for_date(**date))
            .count();

        (actual as f64 / expected as f64).min(1.0)
    }
}

/// Message shown next to a streak counter
pub fn motivational_message(current_streak: u32) -> String {
    match current_streak {
        0 => "Ready to start your streak! Every journey begins with a single step.".to_string(),
        1 => "Great start! One day down, keep the momentum going.".to_string(),
        2..=6 => format!("Nice work! {} days in a row. You're building a strong habit.", current_streak),
        7..=13 => format!("Excellent! {} days strong. You're in the groove now!", current_streak),
        14..=29 => format!("Amazing! {} days straight. This is becoming second nature.", current_streak),
        30..=99 => format!("Incredible! {} days of consistency. You're a habit master!", current_streak),
        _ => format!("Legendary! {} days of unwavering commitment. You're an inspiration!", current_streak),
    }
}
