/// Storage layer for persisting habit data
///
/// This module handles all database operations using SQLite. It provides
/// a clean interface for storing categories, habits, their weekday
/// schedules and the completion log.

pub mod sqlite;
pub mod migrations;

// Re-export the main storage types
pub use sqlite::*;

use chrono::NaiveDate;
use thiserror::Error;
use crate::domain::{
    ArchivedHabit, Category, CategoryDraft, CategoryId, CompletionRecord, DomainError, Habit,
    HabitId, HabitOverview, HabitUpdate, NewHabit, Schedule, ScheduledHabit, TodayHabit,
};

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database connection error: {0}")]
    Connection(String),

    #[error("Database query error: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("Invalid stored data: {0}")]
    InvalidData(String),

    #[error("Validation error: {0}")]
    Validation(#[from] DomainError),

    #[error("Habit not found: {habit_id}")]
    HabitNotFound { habit_id: HabitId },

    #[error("Category not found: {category_id}")]
    CategoryNotFound { category_id: CategoryId },

    #[error("Category {category_id} still has {linked_habits} linked habit(s)")]
    CategoryInUse { category_id: CategoryId, linked_habits: u32 },

    #[error("A category named '{name}' already exists")]
    DuplicateCategory { name: String },

    #[error("A habit named '{name}' already exists")]
    DuplicateHabit { name: String },

    #[error("Migration error: {0}")]
    Migration(String),
}

/// Trait defining the storage interface for habits and categories
///
/// Every method is one unit of work. Implementations must make methods
/// that touch several rows atomic. "Today" is always passed in by the
/// caller so the store never reads the clock.
pub trait HabitStorage {
    /// Create a category, rejecting duplicate names
    fn add_category(&self, draft: &CategoryDraft) -> Result<Category, StorageError>;

    /// Rename and re-describe an existing category
    fn modify_category(&self, category_id: CategoryId, draft: &CategoryDraft) -> Result<Category, StorageError>;

    fn get_category(&self, category_id: CategoryId) -> Result<Category, StorageError>;

    /// All categories ordered by id
    fn list_categories(&self) -> Result<Vec<Category>, StorageError>;

    /// Number of habits that reference a category
    fn count_linked_habits(&self, category_id: CategoryId) -> Result<u32, StorageError>;

    /// Delete a category that no habit refers to
    ///
    /// Fails with `CategoryInUse` while habits still reference it.
    fn delete_category(&self, category_id: CategoryId) -> Result<Category, StorageError>;

    /// Create a habit together with its schedule
    fn add_habit(&self, habit: &NewHabit) -> Result<Habit, StorageError>;

    /// Get a habit by ID
    fn get_habit(&self, habit_id: HabitId) -> Result<Habit, StorageError>;

    /// Weekday schedule of a habit
    fn get_schedule(&self, habit_id: HabitId) -> Result<Schedule, StorageError>;

    /// Apply a partial update to a habit
    fn modify_habit(&self, habit_id: HabitId, update: &HabitUpdate) -> Result<Habit, StorageError>;

    /// Delete a habit, archiving a snapshot of it first
    ///
    /// The schedule is removed; completion log rows are kept.
    fn delete_habit(&self, habit_id: HabitId) -> Result<ArchivedHabit, StorageError>;

    /// Every habit with its category name and schedule
    fn list_habits(&self) -> Result<Vec<HabitOverview>, StorageError>;

    /// Habits scheduled on the weekday of `today`
    fn today_habits(&self, today: NaiveDate) -> Result<Vec<TodayHabit>, StorageError>;

    /// Record that a habit was done on `today`
    fn mark_done(&self, habit_id: HabitId, today: NaiveDate) -> Result<(), StorageError>;

    /// Remove today's completion of a habit
    fn unmark_done(&self, habit_id: HabitId, today: NaiveDate) -> Result<(), StorageError>;

    /// Clear all done flags once per calendar day
    ///
    /// Returns true when a reset happened, false when one already ran today.
    fn reset_daily_flags(&self, today: NaiveDate) -> Result<bool, StorageError>;

    /// Day of the most recent daily reset
    fn last_reset(&self) -> Result<Option<NaiveDate>, StorageError>;

    /// Number of habits currently flagged done
    fn count_done_today(&self) -> Result<u32, StorageError>;

    /// Snapshots of deleted habits, most recent first
    fn habit_history(&self) -> Result<Vec<ArchivedHabit>, StorageError>;

    /// Distinct days with any completion, most recent first
    fn completion_dates(&self) -> Result<Vec<NaiveDate>, StorageError>;

    /// Completion log joined with current habit names and categories
    fn completions(&self) -> Result<Vec<CompletionRecord>, StorageError>;

    /// Every habit with its schedule, for distribution and streak queries
    fn scheduled_habits(&self) -> Result<Vec<ScheduledHabit>, StorageError>;
}
