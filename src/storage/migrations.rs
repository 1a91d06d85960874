/// Database migration management
///
/// This module handles creating and updating the SQLite database schema.
/// Table and column names match the files written by earlier versions of
/// the tracker, so existing databases open without conversion.

use rusqlite::{Connection, OptionalExtension};
use crate::storage::StorageError;

/// Current database schema version
///
/// Increment this when you add new migrations
pub const CURRENT_VERSION: i32 = 1;

/// Initialize the database schema
///
/// This creates all required tables and indexes if they don't exist.
/// It also sets up the version tracking for future migrations.
pub fn initialize_database(conn: &Connection) -> Result<(), StorageError> {
    // Create version tracking table first
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        )",
        [],
    )?;

    let current_version = get_current_version(conn)?;

    if current_version < CURRENT_VERSION {
        run_migrations(conn, current_version)?;
        set_version(conn, CURRENT_VERSION)?;
    } else if current_version > CURRENT_VERSION {
        return Err(StorageError::Migration(format!(
            "database schema version {} is newer than supported version {}",
            current_version, CURRENT_VERSION
        )));
    }

    Ok(())
}

/// Get the current database schema version (0 for a fresh file)
pub fn get_current_version(conn: &Connection) -> Result<i32, StorageError> {
    let version = conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
            row.get::<_, i32>(0)
        })
        .optional()?
        .unwrap_or(0);

    Ok(version)
}

fn set_version(conn: &Connection, version: i32) -> Result<(), StorageError> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        [version],
    )?;
    Ok(())
}

/// Run database migrations from the current version to the latest
fn run_migrations(conn: &Connection, from_version: i32) -> Result<(), StorageError> {
    if from_version < 1 {
        migration_v1(conn)?;
    }

    Ok(())
}

/// Migration to version 1: Create initial tables
///
/// Uses `IF NOT EXISTS` throughout so a database created before version
/// tracking existed is adopted as-is.
fn migration_v1(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS Category (
            CategoryID INTEGER PRIMARY KEY AUTOINCREMENT,
            Name TEXT NOT NULL UNIQUE,
            Description TEXT
        );

        CREATE TABLE IF NOT EXISTS Habit (
            HabitID INTEGER PRIMARY KEY AUTOINCREMENT,
            Name TEXT NOT NULL,
            Description TEXT,
            CategoryID INTEGER,
            Done INTEGER NOT NULL DEFAULT 0,
            CreateAt TEXT NOT NULL DEFAULT (DATETIME('now', 'localtime'))
        );

        CREATE TABLE IF NOT EXISTS HabitDays (
            HabitID INTEGER NOT NULL,
            Days TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS HabitLog (
            HabitID INTEGER NOT NULL,
            DateDone TEXT NOT NULL,
            PRIMARY KEY (HabitID, DateDone)
        );

        CREATE TABLE IF NOT EXISTS HabitHistory (
            HabitID INTEGER,
            Name TEXT,
            Date TEXT
        );

        CREATE TABLE IF NOT EXISTS Settings (
            key TEXT PRIMARY KEY,
            value TEXT
        );",
    )?;

    create_indexes_v1(conn)?;

    tracing::info!("Applied migration v1: Created initial database schema");
    Ok(())
}

/// Create database indexes for version 1
fn create_indexes_v1(conn: &Connection) -> Result<(), StorageError> {
    // Schedule lookups by habit and by weekday
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_habitdays_habit ON HabitDays (HabitID)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_habitdays_days ON HabitDays (Days)",
        [],
    )?;

    // Completions by date (streaks and productive days)
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_habitlog_date ON HabitLog (DateDone)",
        [],
    )?;

    // Linked-habit counts when deleting a category
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_habit_category ON Habit (CategoryID)",
        [],
    )?;

    tracing::info!("Created database indexes for v1");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_initialize_database() {
        let conn = Connection::open_in_memory().unwrap();

        // Should succeed on a fresh database
        let result = initialize_database(&conn);
        assert!(result.is_ok());

        // Should succeed when called again (idempotent)
        let result = initialize_database(&conn);
        assert!(result.is_ok());

        let table_count: i32 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name IN
                 ('Category', 'Habit', 'HabitDays', 'HabitLog', 'HabitHistory', 'Settings')",
                [],
                |row| row.get(0),
            )
            .unwrap();

        assert_eq!(table_count, 6);
    }

    #[test]
    fn test_habit_table_has_no_store_level_foreign_key() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_database(&conn).unwrap();

        let foreign_keys: i32 = conn
            .query_row("SELECT COUNT(*) FROM pragma_foreign_key_list('Habit')", [], |row| row.get(0))
            .unwrap();
        assert_eq!(foreign_keys, 0);
    }

    #[test]
    fn test_version_tracking() {
        let conn = Connection::open_in_memory().unwrap();

        initialize_database(&conn).unwrap();
        let version = get_current_version(&conn).unwrap();
        assert_eq!(version, CURRENT_VERSION);
    }

    #[test]
    fn test_adopts_existing_unversioned_database() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE Category (CategoryID INTEGER PRIMARY KEY AUTOINCREMENT, Name TEXT NOT NULL UNIQUE, Description TEXT);
             INSERT INTO Category (Name, Description) VALUES ('Health', NULL);",
        ).unwrap();

        initialize_database(&conn).unwrap();

        let name: String = conn
            .query_row("SELECT Name FROM Category", [], |row| row.get(0))
            .unwrap();
        assert_eq!(name, "Health");
    }

    #[test]
    fn test_rejects_newer_schema() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_database(&conn).unwrap();
        set_version(&conn, CURRENT_VERSION + 1).unwrap();

        assert!(matches!(initialize_database(&conn), Err(StorageError::Migration(_))));
    }
}
