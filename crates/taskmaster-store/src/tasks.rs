//! Data access for the `task` table.
//!
//! Four operations, each a single SQL statement: insert, two bounded
//! selects, and a conditional update. Completion is a compare-and-set
//! (`WHERE id = ? AND completed = 0`) so racing or repeated calls cannot
//! double-apply; the loser sees zero matching rows.

use rusqlite::{params, OptionalExtension};
use tracing::instrument;

use taskmaster_core::task::{now_rfc3339, NewTask, Task};

use crate::error::StoreError;
use crate::pool::{new_file, new_in_memory, ConnectionConfig, ConnectionPool};
use crate::schema;

const TASK_COLUMNS: &str = "id, title, description, completed, created_at";

/// Handle to the task database. Cheap to clone; all clones share the
/// underlying pool. Constructed once at startup and passed to whoever
/// needs storage access.
#[derive(Clone)]
pub struct TaskStore {
    pool: ConnectionPool,
}

impl TaskStore {
    /// Open a file-backed store.
    ///
    /// Never fails: connections open lazily, so an unreachable database
    /// file surfaces as per-operation errors (and as "disconnected" from
    /// [`TaskStore::ping`]) rather than preventing startup.
    pub fn open(path: &str, config: &ConnectionConfig) -> Self {
        Self {
            pool: new_file(path, config),
        }
    }

    /// Open an in-memory store with the schema created (for tests).
    pub fn in_memory() -> Result<Self, StoreError> {
        let store = Self {
            pool: new_in_memory(&ConnectionConfig::default())?,
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Create the schema if missing. Safe to run repeatedly.
    pub fn init_schema(&self) -> Result<(), StoreError> {
        let conn = self.pool.get()?;
        schema::init_schema(&conn)
    }

    /// Cheap reachability probe for the liveness endpoint.
    pub fn ping(&self) -> Result<(), StoreError> {
        let conn = self.pool.get()?;
        let _: i64 = conn.query_row("SELECT 1", [], |row| row.get(0))?;
        Ok(())
    }

    /// Insert a task and return the persisted row, including the
    /// generated id and timestamp. Input is assumed validated and
    /// normalized by [`NewTask::parse`].
    #[instrument(skip(self, new), fields(title_chars = new.title.chars().count()))]
    pub fn create(&self, new: &NewTask) -> Result<Task, StoreError> {
        let conn = self.pool.get()?;
        let now = now_rfc3339();
        let task = conn.query_row(
            &format!(
                "INSERT INTO task (title, description, completed, created_at)
                 VALUES (?1, ?2, 0, ?3)
                 RETURNING {TASK_COLUMNS}"
            ),
            params![new.title, new.description, now],
            task_from_row,
        )?;
        Ok(task)
    }

    /// Up to `limit` incomplete tasks, newest first.
    #[instrument(skip(self))]
    pub fn list_recent_incomplete(&self, limit: u32) -> Result<Vec<Task>, StoreError> {
        self.list_by_completed(false, limit)
    }

    /// Up to `limit` completed tasks, newest first.
    #[instrument(skip(self))]
    pub fn list_recent_completed(&self, limit: u32) -> Result<Vec<Task>, StoreError> {
        self.list_by_completed(true, limit)
    }

    fn list_by_completed(&self, completed: bool, limit: u32) -> Result<Vec<Task>, StoreError> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!(
            // id tiebreak keeps same-millisecond inserts in reverse
            // insertion order.
            "SELECT {TASK_COLUMNS} FROM task
             WHERE completed = ?1
             ORDER BY created_at DESC, id DESC
             LIMIT ?2"
        ))?;
        let tasks = stmt
            .query_map(params![completed, limit], task_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tasks)
    }

    /// Flip a task to completed, returning the updated row, or `None`
    /// when the id does not exist or the task is already completed.
    ///
    /// The `AND completed = 0` guard makes this idempotent and race-safe:
    /// of two concurrent calls for the same id, exactly one matches the
    /// row and the other gets `None`. No read-then-write, no explicit
    /// lock.
    #[instrument(skip(self))]
    pub fn mark_complete(&self, id: i64) -> Result<Option<Task>, StoreError> {
        let conn = self.pool.get()?;
        let task = conn
            .query_row(
                &format!(
                    "UPDATE task SET completed = 1
                     WHERE id = ?1 AND completed = 0
                     RETURNING {TASK_COLUMNS}"
                ),
                params![id],
                task_from_row,
            )
            .optional()?;
        Ok(task)
    }
}

fn task_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        completed: row.get(3)?,
        created_at: row.get(4)?,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
