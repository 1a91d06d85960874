/// Public library interface for the habit tracker
///
/// This module exports the server, the storage layer and the domain types
/// so they can be used by the binary, by other applications and by tests.

use std::path::PathBuf;
use chrono::{Local, NaiveDate};
use thiserror::Error;

// Internal modules
mod domain;
mod storage;
mod analytics;
mod mcp;
pub mod tools;

// Re-export public modules and types
pub use domain::*;
pub use storage::{migrations, SqliteStorage, StorageError, HabitStorage};
pub use analytics::{AnalyticsEngine, DailyProgress, HabitStreakRank, Reward, Tally, REWARD_MILESTONES};
pub use mcp::protocol;
pub use mcp::McpServer;

/// Errors that can occur during server operation
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Database error: {0}")]
    Database(#[from] storage::StorageError),

    #[error("Domain validation error: {0}")]
    Domain(#[from] domain::DomainError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Main habit tracker server
///
/// Owns the SQLite store and decides what "today" is. Everything below
/// this type receives the date as a parameter.
pub struct HabitTrackerServer {
    storage: SqliteStorage,
    fixed_today: Option<NaiveDate>,
}

impl HabitTrackerServer {
    /// Create a new habit tracker server with the specified database path
    ///
    /// This will initialize the SQLite database with the required schema
    /// if it doesn't already exist.
    pub async fn new(db_path: PathBuf) -> Result<Self, ServerError> {
        tracing::info!("Initializing Habit Tracker server with database: {:?}", db_path);

        let storage = SqliteStorage::new(db_path)?;

        Ok(Self {
            storage,
            fixed_today: None,
        })
    }

    /// Server backed by a throwaway in-memory database
    pub fn in_memory() -> Result<Self, ServerError> {
        Ok(Self {
            storage: SqliteStorage::open_in_memory()?,
            fixed_today: None,
        })
    }

    /// Pin "today" to a fixed date instead of the local clock
    pub fn with_fixed_date(mut self, today: NaiveDate) -> Self {
        self.fixed_today = Some(today);
        self
    }

    /// The current local calendar date
    pub fn today(&self) -> NaiveDate {
        self.fixed_today
            .unwrap_or_else(|| Local::now().date_naive())
    }

    /// Begin one interaction cycle: run the daily reset and return today's date
    pub fn start_interaction(&self) -> Result<NaiveDate, StorageError> {
        let today = self.today();
        self.storage.reset_daily_flags(today)?;
        Ok(today)
    }

    /// Run the MCP server, handling JSON-RPC requests over stdin/stdout
    ///
    /// This method will block until stdin is closed or an error occurs.
    pub async fn run(self) -> Result<(), ServerError> {
        tracing::info!("Starting MCP server...");

        let today = self.start_interaction()?;
        let habits = self.storage.list_habits()?;
        tracing::info!(
            "Server started successfully on {}, found {} existing habits",
            today,
            habits.len()
        );

        let mut mcp_server = mcp::McpServer::new(self);
        mcp_server.run().await?;

        Ok(())
    }

    /// Get a reference to the storage layer (useful for testing)
    pub fn storage(&self) -> &SqliteStorage {
        &self.storage
    }
}
