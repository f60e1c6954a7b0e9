//! Task snapshot repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Save and load whole `TaskSnapshot`s; the store is a save/load boundary,
//!   not a live backing for `TaskManager`.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - `save_snapshot` validates before writing and replaces all rows in one
//!   transaction.
//! - `load_snapshot` returns tasks in id order (= creation order) and rejects
//!   rows that violate task invariants.
//! - Timestamps are stored as Unix epoch milliseconds.

use crate::db::DbError;
use crate::model::snapshot::TaskSnapshot;
use crate::model::task::{Task, TaskId, ValidationError};
use chrono::{DateTime, Utc};
use log::{error, info};
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};

const NEXT_ID_KEY: &str = "next_id";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for task snapshot persistence.
#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationError),
    Db(DbError),
    InvalidData(String),
    MissingRequiredTable(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted task data: {message}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "task database is missing required table `{table}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::InvalidData(_) | Self::MissingRequiredTable(_) => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Save/load boundary for task snapshots.
pub trait TaskRepository {
    /// Replaces all stored tasks and the id counter with `snapshot`.
    fn save_snapshot(&mut self, snapshot: &TaskSnapshot) -> RepoResult<()>;
    /// Loads the stored snapshot; an empty store yields `TaskSnapshot::default()`.
    fn load_snapshot(&self) -> RepoResult<TaskSnapshot>;
}

/// SQLite-backed task snapshot repository.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    /// Wraps a migrated connection.
    ///
    /// # Errors
    /// - `RepoError::MissingRequiredTable` when the schema was not applied.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        for table in ["tasks", "task_meta"] {
            if !table_exists(conn, table)? {
                return Err(RepoError::MissingRequiredTable(table));
            }
        }
        Ok(Self { conn })
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn save_snapshot(&mut self, snapshot: &TaskSnapshot) -> RepoResult<()> {
        snapshot.validate()?;

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute("DELETE FROM tasks;", [])?;
        {
            let mut insert = tx.prepare(
                "INSERT INTO tasks (id, text, completed, created_at, deadline)
                 VALUES (?1, ?2, ?3, ?4, ?5);",
            )?;
            for task in &snapshot.tasks {
                insert.execute(params![
                    id_to_db(task.id())?,
                    task.text(),
                    bool_to_int(task.is_completed()),
                    task.created_at().timestamp_millis(),
                    task.deadline().map(|deadline| deadline.timestamp_millis()),
                ])?;
            }
        }
        tx.execute(
            "INSERT INTO task_meta (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value;",
            params![NEXT_ID_KEY, counter_to_db(snapshot.effective_next_id())?],
        )?;

        if let Err(err) = tx.commit() {
            error!(
                "event=snapshot_save module=repo status=error error_code=commit_failed error={err}"
            );
            return Err(err.into());
        }

        info!(
            "event=snapshot_save module=repo status=ok task_count={}",
            snapshot.tasks.len()
        );
        Ok(())
    }

    fn load_snapshot(&self) -> RepoResult<TaskSnapshot> {
        let mut stmt = self.conn.prepare(
            "SELECT id, text, completed, created_at, deadline
             FROM tasks
             ORDER BY id ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }

        let stored_next_id = self
            .conn
            .query_row(
                "SELECT value FROM task_meta WHERE key = ?1;",
                [NEXT_ID_KEY],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        let next_id = match stored_next_id {
            Some(value) => u64::try_from(value).map_err(|_| {
                RepoError::InvalidData(format!("invalid next_id `{value}` in task_meta"))
            })?,
            None => 1,
        };

        let snapshot = TaskSnapshot { tasks, next_id };
        snapshot.validate()?;
        let snapshot = TaskSnapshot {
            next_id: snapshot.effective_next_id(),
            ..snapshot
        };

        info!(
            "event=snapshot_load module=repo status=ok task_count={} next_id={}",
            snapshot.tasks.len(),
            snapshot.next_id
        );
        Ok(snapshot)
    }
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let raw_id: i64 = row.get("id")?;
    let id = u64::try_from(raw_id)
        .map(TaskId::new)
        .map_err(|_| RepoError::InvalidData(format!("invalid id `{raw_id}` in tasks.id")))?;

    let completed = match row.get::<_, i64>("completed")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid completed value `{other}` in tasks.completed"
            )));
        }
    };

    let created_at = millis_to_timestamp(row.get("created_at")?, "tasks.created_at")?;
    let deadline = match row.get::<_, Option<i64>>("deadline")? {
        Some(value) => Some(millis_to_timestamp(value, "tasks.deadline")?),
        None => None,
    };

    Task::restore(id, row.get("text")?, completed, created_at, deadline).map_err(|err| {
        RepoError::InvalidData(format!("task {raw_id} violates invariants: {err}"))
    })
}

fn millis_to_timestamp(value: i64, column: &str) -> RepoResult<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(value)
        .ok_or_else(|| RepoError::InvalidData(format!("invalid timestamp `{value}` in {column}")))
}

fn id_to_db(id: TaskId) -> RepoResult<i64> {
    i64::try_from(id.get())
        .map_err(|_| RepoError::InvalidData(format!("task id {id} exceeds SQLite integer range")))
}

fn counter_to_db(value: u64) -> RepoResult<i64> {
    i64::try_from(value)
        .map_err(|_| RepoError::InvalidData(format!("next_id {value} exceeds SQLite integer range")))
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
