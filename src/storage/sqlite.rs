/// SQLite implementation of the habit storage interface
///
/// This module provides the concrete SQLite implementation for storing
/// and retrieving habit data. It handles all SQL queries and data conversion.
/// Operations that touch more than one row run inside a transaction that is
/// rolled back when it is dropped without a commit.

use std::collections::HashMap;
use std::path::Path;

use chrono::{Datelike, NaiveDate, Weekday};
use rusqlite::{ffi, params, Connection, OptionalExtension, Row};

use crate::domain::{
    parse_weekday, weekday_name, ArchivedHabit, Category, CategoryDraft, CategoryId,
    CompletionRecord, Habit, HabitId, HabitOverview, HabitUpdate, NewHabit, Schedule,
    ScheduledHabit, TodayHabit,
};
use crate::storage::{migrations, HabitStorage, StorageError};

const LAST_RESET_KEY: &str = "last_reset";

/// SQLite-based storage implementation
///
/// This struct holds a connection to the SQLite database and implements
/// all the storage operations defined in the HabitStorage trait.
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Create a new SQLite storage instance
    ///
    /// This opens the database file and runs any necessary migrations
    /// to ensure the schema is up to date.
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self, StorageError> {
        let db_path = db_path.as_ref();
        let conn = Connection::open(db_path)
            .map_err(|e| StorageError::Connection(format!("Failed to open database: {}", e)))?;

        let storage = Self::from_connection(conn)?;
        tracing::info!("SQLite storage initialized at: {:?}", db_path);
        Ok(storage)
    }

    /// Open a private in-memory database, mostly useful for tests
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StorageError::Connection(format!("Failed to open in-memory database: {}", e)))?;
        Self::from_connection(conn)
    }

    /// Category links are checked by the repository operations, not by the store
    fn from_connection(conn: Connection) -> Result<Self, StorageError> {
        migrations::initialize_database(&conn)?;

        Ok(Self { conn })
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
                || e.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY
    )
}

/// Turn a UNIQUE constraint failure into a domain-level duplicate error
fn unique_or<T>(
    result: rusqlite::Result<T>,
    on_conflict: impl FnOnce() -> StorageError,
) -> Result<T, StorageError> {
    match result {
        Ok(value) => Ok(value),
        Err(e) if is_unique_violation(&e) => Err(on_conflict()),
        Err(e) => Err(StorageError::Query(e)),
    }
}

fn habit_from_row(row: &Row<'_>) -> rusqlite::Result<Habit> {
    Ok(Habit::from_existing(
        HabitId(row.get(0)?),
        row.get(1)?, // name
        row.get(2)?, // description
        row.get::<_, Option<i64>>(3)?.map(CategoryId),
        row.get(4)?, // done
        row.get(5)?, // created_at
    ))
}

fn category_from_row(row: &Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: CategoryId(row.get(0)?),
        name: row.get(1)?,
        description: row.get(2)?,
    })
}

fn find_habit(conn: &Connection, habit_id: HabitId) -> Result<Habit, StorageError> {
    conn.query_row(
        "SELECT HabitID, Name, Description, CategoryID, Done, CreateAt
         FROM Habit WHERE HabitID = ?1",
        params![habit_id.0],
        habit_from_row,
    )
    .optional()?
    .ok_or(StorageError::HabitNotFound { habit_id })
}

fn find_category(conn: &Connection, category_id: CategoryId) -> Result<Category, StorageError> {
    conn.query_row(
        "SELECT CategoryID, Name, Description FROM Category WHERE CategoryID = ?1",
        params![category_id.0],
        category_from_row,
    )
    .optional()?
    .ok_or(StorageError::CategoryNotFound { category_id })
}

fn linked_habits(conn: &Connection, category_id: CategoryId) -> Result<u32, StorageError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM Habit WHERE CategoryID = ?1",
        params![category_id.0],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// Fail with `DuplicateHabit` if another habit already uses `name`
fn ensure_habit_name_free(
    conn: &Connection,
    name: &str,
    except: Option<HabitId>,
) -> Result<(), StorageError> {
    let taken: Option<i64> = conn
        .query_row(
            "SELECT HabitID FROM Habit WHERE Name = ?1 AND HabitID != ?2 LIMIT 1",
            params![name, except.map(|id| id.0).unwrap_or(-1)],
            |row| row.get(0),
        )
        .optional()?;

    match taken {
        Some(_) => Err(StorageError::DuplicateHabit { name: name.to_string() }),
        None => Ok(()),
    }
}

fn replace_schedule(conn: &Connection, habit_id: HabitId, schedule: &Schedule) -> Result<(), StorageError> {
    conn.execute("DELETE FROM HabitDays WHERE HabitID = ?1", params![habit_id.0])?;

    let mut stmt = conn.prepare("INSERT INTO HabitDays (HabitID, Days) VALUES (?1, ?2)")?;
    for day in schedule.days() {
        stmt.execute(params![habit_id.0, weekday_name(*day)])?;
    }
    Ok(())
}

fn parse_stored_weekday(habit_id: HabitId, name: &str) -> Result<Weekday, StorageError> {
    parse_weekday(name).map_err(|_| {
        StorageError::InvalidData(format!("unknown weekday '{}' for habit {}", name, habit_id))
    })
}

fn schedule_for(conn: &Connection, habit_id: HabitId) -> Result<Schedule, StorageError> {
    let mut stmt = conn.prepare("SELECT Days FROM HabitDays WHERE HabitID = ?1")?;
    let names = stmt
        .query_map(params![habit_id.0], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;

    let days = names
        .iter()
        .map(|name| parse_stored_weekday(habit_id, name))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Schedule::new(days))
}

/// Schedules of every habit that has at least one weekday
fn all_schedules(conn: &Connection) -> Result<HashMap<HabitId, Schedule>, StorageError> {
    let mut stmt = conn.prepare("SELECT HabitID, Days FROM HabitDays")?;
    let rows = stmt
        .query_map([], |row| Ok((HabitId(row.get(0)?), row.get::<_, String>(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;

    let mut days: HashMap<HabitId, Vec<Weekday>> = HashMap::new();
    for (habit_id, name) in rows {
        days.entry(habit_id)
            .or_default()
            .push(parse_stored_weekday(habit_id, &name)?);
    }

    Ok(days
        .into_iter()
        .map(|(habit_id, days)| (habit_id, Schedule::new(days)))
        .collect())
}

/// Stored reset day; an unreadable value is treated as "never reset"
fn read_last_reset(conn: &Connection) -> Result<Option<NaiveDate>, StorageError> {
    let value: Option<Option<String>> = conn
        .query_row(
            "SELECT value FROM Settings WHERE key = ?1",
            params![LAST_RESET_KEY],
            |row| row.get(0),
        )
        .optional()?;

    match value.flatten() {
        None => Ok(None),
        Some(raw) => match NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
            Ok(date) => Ok(Some(date)),
            Err(_) => {
                tracing::warn!("Ignoring malformed {} value: {:?}", LAST_RESET_KEY, raw);
                Ok(None)
            }
        },
    }
}

impl HabitStorage for SqliteStorage {
    fn add_category(&self, draft: &CategoryDraft) -> Result<Category, StorageError> {
        unique_or(
            self.conn.execute(
                "INSERT INTO Category (Name, Description) VALUES (?1, ?2)",
                params![draft.name, draft.description],
            ),
            || StorageError::DuplicateCategory { name: draft.name.clone() },
        )?;

        let category = Category {
            id: CategoryId(self.conn.last_insert_rowid()),
            name: draft.name.clone(),
            description: draft.description.clone(),
        };

        tracing::debug!("Created category: {} ({})", category.name, category.id);
        Ok(category)
    }

    fn modify_category(&self, category_id: CategoryId, draft: &CategoryDraft) -> Result<Category, StorageError> {
        let rows_affected = unique_or(
            self.conn.execute(
                "UPDATE Category SET Name = ?2, Description = ?3 WHERE CategoryID = ?1",
                params![category_id.0, draft.name, draft.description],
            ),
            || StorageError::DuplicateCategory { name: draft.name.clone() },
        )?;

        if rows_affected == 0 {
            return Err(StorageError::CategoryNotFound { category_id });
        }

        tracing::debug!("Updated category: {} ({})", draft.name, category_id);
        Ok(Category {
            id: category_id,
            name: draft.name.clone(),
            description: draft.description.clone(),
        })
    }

    fn get_category(&self, category_id: CategoryId) -> Result<Category, StorageError> {
        find_category(&self.conn, category_id)
    }

    fn list_categories(&self) -> Result<Vec<Category>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT CategoryID, Name, Description FROM Category ORDER BY CategoryID"
        )?;
        let categories = stmt
            .query_map([], category_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(categories)
    }

    fn count_linked_habits(&self, category_id: CategoryId) -> Result<u32, StorageError> {
        linked_habits(&self.conn, category_id)
    }

    fn delete_category(&self, category_id: CategoryId) -> Result<Category, StorageError> {
        let tx = self.conn.unchecked_transaction()?;

        let category = find_category(&tx, category_id)?;
        let linked = linked_habits(&tx, category_id)?;
        if linked > 0 {
            tracing::warn!(
                "Refusing to delete category {} ({}): {} linked habit(s)",
                category.name, category_id, linked
            );
            return Err(StorageError::CategoryInUse { category_id, linked_habits: linked });
        }

        tx.execute("DELETE FROM Category WHERE CategoryID = ?1", params![category_id.0])?;
        tx.commit()?;

        tracing::debug!("Deleted category: {} ({})", category.name, category_id);
        Ok(category)
    }

    fn add_habit(&self, habit: &NewHabit) -> Result<Habit, StorageError> {
        let tx = self.conn.unchecked_transaction()?;

        if let Some(category_id) = habit.category_id {
            find_category(&tx, category_id)?;
        }
        ensure_habit_name_free(&tx, &habit.name, None)?;

        tx.execute(
            "INSERT INTO Habit (Name, Description, CategoryID, Done, CreateAt)
             VALUES (?1, ?2, ?3, 0, ?4)",
            params![
                habit.name,
                habit.description,
                habit.category_id.map(|id| id.0),
                habit.created_at
            ],
        )?;
        let habit_id = HabitId(tx.last_insert_rowid());

        replace_schedule(&tx, habit_id, &habit.schedule)?;
        tx.commit()?;

        tracing::debug!("Created habit: {} ({}) on {}", habit.name, habit_id, habit.schedule);
        Ok(Habit::from_existing(
            habit_id,
            habit.name.clone(),
            habit.description.clone(),
            habit.category_id,
            false,
            habit.created_at,
        ))
    }

    fn get_habit(&self, habit_id: HabitId) -> Result<Habit, StorageError> {
        find_habit(&self.conn, habit_id)
    }

    fn get_schedule(&self, habit_id: HabitId) -> Result<Schedule, StorageError> {
        find_habit(&self.conn, habit_id)?;
        schedule_for(&self.conn, habit_id)
    }

    fn modify_habit(&self, habit_id: HabitId, update: &HabitUpdate) -> Result<Habit, StorageError> {
        let tx = self.conn.unchecked_transaction()?;

        find_habit(&tx, habit_id)?;

        if let Some(name) = &update.name {
            ensure_habit_name_free(&tx, name, Some(habit_id))?;
            tx.execute(
                "UPDATE Habit SET Name = ?2 WHERE HabitID = ?1",
                params![habit_id.0, name],
            )?;
        }

        if let Some(description) = &update.description {
            tx.execute(
                "UPDATE Habit SET Description = ?2 WHERE HabitID = ?1",
                params![habit_id.0, description],
            )?;
        }

        if let Some(category_id) = update.category_id {
            find_category(&tx, category_id)?;
            tx.execute(
                "UPDATE Habit SET CategoryID = ?2 WHERE HabitID = ?1",
                params![habit_id.0, category_id.0],
            )?;
        }

        if let Some(schedule) = &update.schedule {
            replace_schedule(&tx, habit_id, schedule)?;
        }

        let habit = find_habit(&tx, habit_id)?;
        tx.commit()?;

        tracing::debug!("Updated habit: {} ({})", habit.name, habit_id);
        Ok(habit)
    }

    fn delete_habit(&self, habit_id: HabitId) -> Result<ArchivedHabit, StorageError> {
        let tx = self.conn.unchecked_transaction()?;

        let habit = find_habit(&tx, habit_id)?;

        tx.execute(
            "INSERT INTO HabitHistory (HabitID, Name, Date) VALUES (?1, ?2, ?3)",
            params![habit_id.0, habit.name, habit.created_at],
        )?;
        tx.execute("DELETE FROM HabitDays WHERE HabitID = ?1", params![habit_id.0])?;
        tx.execute("DELETE FROM Habit WHERE HabitID = ?1", params![habit_id.0])?;

        tx.commit()?;

        tracing::debug!("Deleted habit: {} ({}), completion log kept", habit.name, habit_id);
        Ok(ArchivedHabit {
            habit_id,
            name: habit.name,
            created_at: habit.created_at,
        })
    }

    fn list_habits(&self) -> Result<Vec<HabitOverview>, StorageError> {
        let mut schedules = all_schedules(&self.conn)?;

        let mut stmt = self.conn.prepare(
            "SELECT h.HabitID, h.Name, h.Description, c.Name, h.CreateAt
             FROM Habit h
             LEFT JOIN Category c ON h.CategoryID = c.CategoryID
             ORDER BY h.HabitID"
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(HabitOverview {
                    id: HabitId(row.get(0)?),
                    name: row.get(1)?,
                    description: row.get(2)?,
                    category: row.get(3)?,
                    schedule: Schedule::default(),
                    created_at: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows
            .into_iter()
            .map(|mut habit| {
                habit.schedule = schedules.remove(&habit.id).unwrap_or_default();
                habit
            })
            .collect())
    }

    fn today_habits(&self, today: NaiveDate) -> Result<Vec<TodayHabit>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT h.Name, h.HabitID, h.Done
             FROM Habit h
             JOIN HabitDays d ON h.HabitID = d.HabitID
             WHERE d.Days = ?1
             ORDER BY h.HabitID"
        )?;
        let habits = stmt
            .query_map(params![weekday_name(today.weekday())], |row| {
                Ok(TodayHabit {
                    name: row.get(0)?,
                    id: HabitId(row.get(1)?),
                    done: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(habits)
    }

    fn mark_done(&self, habit_id: HabitId, today: NaiveDate) -> Result<(), StorageError> {
        let tx = self.conn.unchecked_transaction()?;

        find_habit(&tx, habit_id)?;
        tx.execute(
            "INSERT OR IGNORE INTO HabitLog (HabitID, DateDone) VALUES (?1, ?2)",
            params![habit_id.0, today],
        )?;
        tx.execute("UPDATE Habit SET Done = 1 WHERE HabitID = ?1", params![habit_id.0])?;

        tx.commit()?;

        tracing::debug!("Marked habit {} done for {}", habit_id, today);
        Ok(())
    }

    fn unmark_done(&self, habit_id: HabitId, today: NaiveDate) -> Result<(), StorageError> {
        let tx = self.conn.unchecked_transaction()?;

        find_habit(&tx, habit_id)?;
        tx.execute(
            "DELETE FROM HabitLog WHERE HabitID = ?1 AND DateDone = ?2",
            params![habit_id.0, today],
        )?;
        tx.execute("UPDATE Habit SET Done = 0 WHERE HabitID = ?1", params![habit_id.0])?;

        tx.commit()?;

        tracing::debug!("Unmarked habit {} for {}", habit_id, today);
        Ok(())
    }

    fn reset_daily_flags(&self, today: NaiveDate) -> Result<bool, StorageError> {
        let tx = self.conn.unchecked_transaction()?;

        if read_last_reset(&tx)? == Some(today) {
            return Ok(false);
        }

        let cleared = tx.execute("UPDATE Habit SET Done = 0 WHERE Done != 0", [])?;
        tx.execute(
            "INSERT OR REPLACE INTO Settings (key, value) VALUES (?1, ?2)",
            params![LAST_RESET_KEY, today],
        )?;

        tx.commit()?;

        tracing::info!("Daily reset for {}: cleared {} done flag(s)", today, cleared);
        Ok(true)
    }

    fn last_reset(&self) -> Result<Option<NaiveDate>, StorageError> {
        read_last_reset(&self.conn)
    }

    fn count_done_today(&self) -> Result<u32, StorageError> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM Habit WHERE Done = 1",
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn habit_history(&self) -> Result<Vec<ArchivedHabit>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT HabitID, Name, Date FROM HabitHistory ORDER BY rowid DESC"
        )?;
        let history = stmt
            .query_map([], |row| {
                Ok(ArchivedHabit {
                    habit_id: HabitId(row.get(0)?),
                    name: row.get(1)?,
                    created_at: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(history)
    }

    fn completion_dates(&self) -> Result<Vec<NaiveDate>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT DateDone FROM HabitLog ORDER BY DateDone DESC"
        )?;
        let dates = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<NaiveDate>, _>>()?;
        Ok(dates)
    }

    fn completions(&self) -> Result<Vec<CompletionRecord>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT l.HabitID, h.Name, c.Name, l.DateDone
             FROM HabitLog l
             JOIN Habit h ON l.HabitID = h.HabitID
             LEFT JOIN Category c ON h.CategoryID = c.CategoryID
             ORDER BY l.DateDone, l.HabitID"
        )?;
        let records = stmt
            .query_map([], |row| {
                Ok(CompletionRecord {
                    habit_id: HabitId(row.get(0)?),
                    habit_name: row.get(1)?,
                    category: row.get(2)?,
                    date: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    fn scheduled_habits(&self) -> Result<Vec<ScheduledHabit>, StorageError> {
        let mut schedules = all_schedules(&self.conn)?;

        let mut stmt = self.conn.prepare(
            "SELECT h.HabitID, h.Name, c.Name, h.CreateAt
             FROM Habit h
             LEFT JOIN Category c ON h.CategoryID = c.CategoryID
             ORDER BY h.Name"
        )?;
        let rows = stmt
            .query_map([], |row| {
                let created_at: chrono::NaiveDateTime = row.get(3)?;
                Ok((HabitId(row.get(0)?), row.get::<_, String>(1)?, row.get::<_, Option<String>>(2)?, created_at))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows
            .into_iter()
            .map(|(habit_id, name, category, created_at)| ScheduledHabit {
                habit_id,
                name,
                category,
                schedule: schedules.remove(&habit_id).unwrap_or_default(),
                created_on: created_at.date(),
            })
            .collect())
    }
}
