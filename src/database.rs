use rusqlite::{Connection, OptionalExtension, Transaction, TransactionBehavior};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::models::{CommunicationStyle, DailyLog, Mood, Task, UserProfile};
use crate::store::{check_date_key, LogStore};

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    SqliteError(#[from] rusqlite::Error),
    #[error("Failed to create database directory: {0}")]
    DirectoryError(String),
    #[error("Invalid date key '{0}' (expected YYYY-MM-DD)")]
    InvalidDate(String),
    #[error("Store lock poisoned: {0}")]
    LockPoisoned(String),
    #[error("A user profile already exists")]
    ProfileExists,
}

/// One line of the per-day summary used by `focuslog list --all`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaySummary {
    pub date: String,
    pub task_count: usize,
    pub completed_count: usize,
    pub mood: Option<Mood>,
}

pub struct Database {
    conn: Connection,
}

impl Database {
    /// Create a new database connection and initialize the schema
    pub fn new(path: &str) -> Result<Self, DatabaseError> {
        let db_path = PathBuf::from(path);

        // Create parent directory if it doesn't exist
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| DatabaseError::DirectoryError(e.to_string()))?;
            }
        }

        let conn = Connection::open(&db_path)?;
        // Another process holding the write lock makes us wait instead of failing
        conn.busy_timeout(Duration::from_secs(5))?;

        let db = Database { conn };
        db.initialize_schema()?;
        tracing::debug!(path = %db_path.display(), "database opened");

        Ok(db)
    }

    /// Open a private in-memory database (tests, dry runs)
    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        let db = Database {
            conn: Connection::open_in_memory()?,
        };
        db.initialize_schema()?;
        Ok(db)
    }

    /// Initialize the database schema (tables and indexes)
    fn initialize_schema(&self) -> Result<(), DatabaseError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS daily_logs (
                date            TEXT PRIMARY KEY,
                mood            TEXT,
                updated_at      TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS tasks (
                id              TEXT PRIMARY KEY,
                date            TEXT NOT NULL,
                position        INTEGER NOT NULL,
                text            TEXT NOT NULL,
                completed       INTEGER NOT NULL DEFAULT 0,
                created_at      TEXT NOT NULL,
                start_time      TEXT,
                end_time        TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_tasks_date ON tasks(date, position);

            CREATE TABLE IF NOT EXISTS profile (
                id                  INTEGER PRIMARY KEY CHECK (id = 1),
                name                TEXT NOT NULL,
                role                TEXT NOT NULL,
                goals               TEXT NOT NULL,
                challenges          TEXT NOT NULL,
                communication_style TEXT NOT NULL,
                created_at          TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    fn row_to_task(row: &rusqlite::Row) -> Result<Task, rusqlite::Error> {
        Ok(Task {
            id: row.get(0)?,
            text: row.get(1)?,
            completed: row.get::<_, i64>(2)? != 0,
            created_at: row.get(3)?,
            start_time: row.get(4)?,
            end_time: row.get(5)?,
        })
    }

    fn parse_mood(raw: Option<String>) -> Option<Mood> {
        let raw = raw?;
        match raw.parse::<Mood>() {
            Ok(mood) => Some(mood),
            Err(e) => {
                tracing::warn!(mood = %raw, error = %e, "ignoring unreadable mood");
                None
            }
        }
    }

    /// Read a day's log through any connection (plain or inside a transaction)
    fn read_log(conn: &Connection, date: &str) -> Result<Option<DailyLog>, DatabaseError> {
        let mood_row: Option<Option<String>> = conn
            .query_row(
                "SELECT mood FROM daily_logs WHERE date = ?1",
                rusqlite::params![date],
                |row| row.get(0),
            )
            .optional()?;

        let Some(mood) = mood_row else {
            return Ok(None);
        };

        let mut stmt = conn.prepare(
            "SELECT id, text, completed, created_at, start_time, end_time
             FROM tasks WHERE date = ?1 ORDER BY position ASC",
        )?;
        let tasks = stmt
            .query_map(rusqlite::params![date], Self::row_to_task)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(DailyLog {
            tasks,
            mood: Self::parse_mood(mood),
        }))
    }

    /// Replace a day's log; caller owns the transaction
    fn write_log(tx: &Transaction, date: &str, log: &DailyLog) -> Result<(), DatabaseError> {
        tx.execute(
            "INSERT INTO daily_logs (date, mood, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(date) DO UPDATE SET mood = excluded.mood, updated_at = excluded.updated_at",
            rusqlite::params![
                date,
                log.mood.map(|m| m.as_str()),
                chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
            ],
        )?;

        tx.execute("DELETE FROM tasks WHERE date = ?1", rusqlite::params![date])?;
        let mut stmt = tx.prepare(
            "INSERT INTO tasks (id, date, position, text, completed, created_at, start_time, end_time)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )?;
        for (position, task) in log.tasks.iter().enumerate() {
            stmt.execute(rusqlite::params![
                task.id,
                date,
                position as i64,
                task.text,
                if task.completed { 1 } else { 0 },
                task.created_at,
                task.start_time,
                task.end_time
            ])?;
        }
        Ok(())
    }

    /// Every date that has a stored log, newest first
    pub fn list_days(&self) -> Result<Vec<DaySummary>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT d.date, d.mood,
                    COUNT(t.id),
                    COALESCE(SUM(t.completed), 0)
             FROM daily_logs d LEFT JOIN tasks t ON t.date = d.date
             GROUP BY d.date ORDER BY d.date DESC",
        )?;

        let days = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, Option<String>>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, i64>(3)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(days
            .into_iter()
            .map(|(date, mood, task_count, completed_count)| DaySummary {
                date,
                task_count: task_count as usize,
                completed_count: completed_count as usize,
                mood: Self::parse_mood(mood),
            })
            .collect())
    }

    /// Load the stored user profile, if onboarding has happened
    pub fn load_profile(&self) -> Result<Option<UserProfile>, DatabaseError> {
        let row = self
            .conn
            .query_row(
                "SELECT name, role, goals, challenges, communication_style FROM profile WHERE id = 1",
                [],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, String>(4)?,
                    ))
                },
            )
            .optional()?;

        Ok(row.map(|(name, role, goals, challenges, style)| UserProfile {
            name,
            role,
            goals,
            challenges,
            communication_style: style.parse().unwrap_or_else(|e: String| {
                tracing::warn!(error = %e, "unreadable communication style, using supportive");
                CommunicationStyle::Supportive
            }),
        }))
    }

    /// Store the profile. It is immutable: a second save fails.
    pub fn save_profile(&self, profile: &UserProfile) -> Result<(), DatabaseError> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO profile (id, name, role, goals, challenges, communication_style, created_at)
             VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                profile.name,
                profile.role,
                profile.goals,
                profile.challenges,
                profile.communication_style.as_str(),
                chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
            ],
        )?;
        if inserted == 0 {
            return Err(DatabaseError::ProfileExists);
        }
        Ok(())
    }
}

impl LogStore for Database {
    fn read(&self, date: &str) -> Result<Option<DailyLog>, DatabaseError> {
        check_date_key(date)?;
        Self::read_log(&self.conn, date)
    }

    fn write(&self, date: &str, log: &DailyLog) -> Result<(), DatabaseError> {
        check_date_key(date)?;
        let tx = self.conn.unchecked_transaction()?;
        Self::write_log(&tx, date, log)?;
        tx.commit()?;
        Ok(())
    }

    /// Read-modify-write inside one IMMEDIATE transaction, so writers from
    /// other processes are serialised instead of overwriting each other.
    fn update<F>(&self, date: &str, mutate: F) -> Result<DailyLog, DatabaseError>
    where
        F: FnOnce(&mut DailyLog),
    {
        check_date_key(date)?;
        let tx = Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)?;
        let mut log = Self::read_log(&tx, date)?.unwrap_or_default();
        mutate(&mut log);
        Self::write_log(&tx, date, &log)?;
        tx.commit()?;
        Ok(log)
    }
}
