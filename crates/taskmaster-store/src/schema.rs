//! SQL DDL for the task database.
//!
//! A single `task` table, created idempotently at startup. WAL mode and
//! the other pragmas are set per connection by the pool customizer.

use rusqlite::Connection;

use crate::error::StoreError;

/// `AUTOINCREMENT` keeps ids strictly increasing and never reused, even
/// after the highest row is gone.
pub const CREATE_TABLES: &str = r#"
CREATE TABLE IF NOT EXISTS task (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    description TEXT,
    completed INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_task_completed_created
    ON task(completed, created_at DESC);
"#;

/// Create the schema if it does not exist. Safe to run repeatedly.
pub fn init_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(CREATE_TABLES)?;
    Ok(())
}
