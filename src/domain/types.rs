/// Core types used throughout the domain layer
///
/// This module defines the ID wrappers and the weekday `Schedule` that are
/// used by Habit, Category and the streak calculations.

use std::fmt;

use serde::{Deserialize, Serialize};
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use schemars::JsonSchema;
use crate::domain::DomainError;

/// All weekdays in calendar order, Monday first
pub const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Unique identifier for a habit
///
/// Wraps the integer row id so a habit ID can't be passed where a
/// category ID is expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct HabitId(pub i64);

impl fmt::Display for HabitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct CategoryId(pub i64);

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Full English name of a weekday, as stored in the `HabitDays` table
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Parse a weekday from its full or three-letter name (case-insensitive)
pub fn parse_weekday(s: &str) -> Result<Weekday, DomainError> {
    let lowered = s.trim().to_lowercase();
    WEEKDAYS
        .iter()
        .copied()
        .find(|day| {
            let name = weekday_name(*day).to_lowercase();
            lowered == name || lowered == name[..3]
        })
        .ok_or_else(|| DomainError::InvalidWeekday(s.to_string()))
}

/// The set of weekdays on which a habit is expected to be performed
///
/// Days are kept unique and in calendar order (Monday first). An empty
/// schedule is valid and means the habit is never due.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Vec<String>", try_from = "Vec<String>")]
pub struct Schedule {
    days: Vec<Weekday>,
}

impl Schedule {
    /// Build a schedule from any collection of weekdays, dropping duplicates
    pub fn new<I: IntoIterator<Item = Weekday>>(days: I) -> Self {
        let mut present = [false; 7];
        for day in days {
            present[day.num_days_from_monday() as usize] = true;
        }

        Self {
            days: WEEKDAYS
                .iter()
                .copied()
                .filter(|day| present[day.num_days_from_monday() as usize])
                .collect(),
        }
    }

    /// A schedule covering every day of the week
    pub fn daily() -> Self {
        Self::new(WEEKDAYS)
    }

    /// Parse a schedule from weekday names
    pub fn parse<S: AsRef<str>>(names: &[S]) -> Result<Self, DomainError> {
        let days = names
            .iter()
            .map(|name| parse_weekday(name.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(days))
    }

    pub fn days(&self) -> &[Weekday] {
        &self.days
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn contains(&self, day: Weekday) -> bool {
        self.days.contains(&day)
    }

    /// Check if the habit is due on a given date
    pub fn is_scheduled_for_date(&self, date: NaiveDate) -> bool {
        self.contains(date.weekday())
    }

    /// First scheduled date strictly after `date`
    pub fn next_after(&self, date: NaiveDate) -> Option<NaiveDate> {
        (1..=7)
            .map(|offset| date + Duration::days(offset))
            .find(|candidate| self.is_scheduled_for_date(*candidate))
    }

    /// Last scheduled date strictly before `date`
    pub fn previous_before(&self, date: NaiveDate) -> Option<NaiveDate> {
        (1..=7)
            .map(|offset| date - Duration::days(offset))
            .find(|candidate| self.is_scheduled_for_date(*candidate))
    }

    /// Latest scheduled date on or before `date`
    pub fn latest_on_or_before(&self, date: NaiveDate) -> Option<NaiveDate> {
        if self.is_scheduled_for_date(date) {
            Some(date)
        } else {
            self.previous_before(date)
        }
    }

    /// Number of scheduled dates in the inclusive range `from..=to`
    pub fn occurrences_between(&self, from: NaiveDate, to: NaiveDate) -> u32 {
        if from > to || self.is_empty() {
            return 0;
        }

        from.iter_days()
            .take_while(|date| *date <= to)
            .filter(|date| self.is_scheduled_for_date(*date))
            .count() as u32
    }

    /// Weekday names in calendar order, e.g. `["Monday", "Friday"]`
    pub fn names(&self) -> Vec<&'static str> {
        self.days.iter().map(|day| weekday_name(*day)).collect()
    }
}

impl From<Schedule> for Vec<String> {
    fn from(schedule: Schedule) -> Self {
        schedule.names().into_iter().map(String::from).collect()
    }
}

impl TryFrom<Vec<String>> for Schedule {
    type Error = DomainError;

    fn try_from(names: Vec<String>) -> Result<Self, Self::Error> {
        Schedule::parse(&names)
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.days.is_empty() {
            return write!(f, "no days");
        }
        if self.days.len() == 7 {
            return write!(f, "every day");
        }
        write!(f, "{}", self.names().join(", "))
    }
}
