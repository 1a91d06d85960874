/// Domain module containing core business logic and data types
///
/// This module defines the core entities (Habit, Category, completion records)
/// and the streak calculations over them. These types represent the
/// fundamental concepts in our habit tracking system.

pub mod habit;
pub mod category;
pub mod completion;
pub mod streak;
pub mod types;

// Re-export public types for easy access
pub use habit::*;
pub use category::*;
pub use completion::*;
pub use streak::*;
pub use types::*;

use thiserror::Error;

/// Errors that can occur during domain operations
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Invalid habit name: {0}")]
    InvalidHabitName(String),

    #[error("Invalid category name: {0}")]
    InvalidCategoryName(String),

    #[error("Invalid weekday: {0}")]
    InvalidWeekday(String),
}
