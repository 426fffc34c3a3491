//! SQLite persistence for The Lowdown
//!
//! Four independent tables (articles, threats, snapshots, podcast episodes),
//! each with an auto-incrementing id, a lifecycle status, and
//! `created_at`/`updated_at` timestamps. `updated_at` is owned exclusively by
//! an AFTER UPDATE trigger; application code never writes it, so it reflects
//! the latest persisted mutation regardless of which code path wrote the row.
//!
//! Uses `Mutex<Connection>` for thread-safety; SQLite's single-writer
//! semantics are the only concurrency boundary the application relies on.

pub mod articles;
pub mod podcasts;
pub mod snapshots;
pub mod threats;

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::Connection;

use crate::error::{Error, Result};

/// Shared relational store for all entity types
pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    /// Open (or create) the store at the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        // Create parent directory if needed
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        let store = Self::init(conn)?;

        tracing::info!(path = %path.display(), "SQLite store initialized");
        Ok(store)
    }

    /// Create an in-memory store (for testing)
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL; PRAGMA foreign_keys=ON;",
        )?;

        let store = Self {
            conn: Mutex::new(conn),
        };
        store.create_schema()?;
        Ok(store)
    }

    /// Create tables, indexes, and the update-timestamp triggers
    fn create_schema(&self) -> Result<()> {
        let conn = self.conn();
        conn.execute_batch(
            r#"
                CREATE TABLE IF NOT EXISTS articles (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    url TEXT NOT NULL UNIQUE,
                    title TEXT,
                    source TEXT,
                    summary TEXT,
                    status TEXT NOT NULL DEFAULT 'pending',
                    original_content TEXT,
                    position INTEGER,
                    created_at TEXT NOT NULL DEFAULT (STRFTIME('%Y-%m-%d %H:%M:%f', 'now')),
                    updated_at TEXT NOT NULL DEFAULT (STRFTIME('%Y-%m-%d %H:%M:%f', 'now'))
                );

                CREATE INDEX IF NOT EXISTS idx_articles_status
                    ON articles(status);

                CREATE TABLE IF NOT EXISTS threats (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL,
                    type TEXT,
                    country_of_origin TEXT,
                    description TEXT,
                    specifications TEXT,
                    ioc_year INTEGER,
                    operators TEXT,
                    image_url TEXT,
                    tod_summary TEXT,
                    status TEXT NOT NULL DEFAULT 'draft',
                    created_at TEXT NOT NULL DEFAULT (STRFTIME('%Y-%m-%d %H:%M:%f', 'now')),
                    updated_at TEXT NOT NULL DEFAULT (STRFTIME('%Y-%m-%d %H:%M:%f', 'now'))
                );

                CREATE TABLE IF NOT EXISTS snapshots (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    url TEXT NOT NULL UNIQUE,
                    title TEXT,
                    source TEXT,
                    highlight TEXT,
                    status TEXT NOT NULL DEFAULT 'pending',
                    original_content TEXT,
                    position INTEGER,
                    created_at TEXT NOT NULL DEFAULT (STRFTIME('%Y-%m-%d %H:%M:%f', 'now')),
                    updated_at TEXT NOT NULL DEFAULT (STRFTIME('%Y-%m-%d %H:%M:%f', 'now'))
                );

                CREATE INDEX IF NOT EXISTS idx_snapshots_status
                    ON snapshots(status);

                CREATE TABLE IF NOT EXISTS podcast_episodes (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    title TEXT NOT NULL,
                    episode_number INTEGER,
                    podcast_url TEXT NOT NULL UNIQUE,
                    description TEXT,
                    published_date TEXT,
                    image_url TEXT,
                    created_at TEXT NOT NULL DEFAULT (STRFTIME('%Y-%m-%d %H:%M:%f', 'now')),
                    updated_at TEXT NOT NULL DEFAULT (STRFTIME('%Y-%m-%d %H:%M:%f', 'now'))
                );

                -- updated_at is trigger-owned: application UPDATE statements never set it
                CREATE TRIGGER IF NOT EXISTS trg_articles_updated_at
                AFTER UPDATE ON articles FOR EACH ROW
                BEGIN
                    UPDATE articles
                    SET updated_at = STRFTIME('%Y-%m-%d %H:%M:%f', 'now')
                    WHERE id = NEW.id;
                END;

                CREATE TRIGGER IF NOT EXISTS trg_threats_updated_at
                AFTER UPDATE ON threats FOR EACH ROW
                BEGIN
                    UPDATE threats
                    SET updated_at = STRFTIME('%Y-%m-%d %H:%M:%f', 'now')
                    WHERE id = NEW.id;
                END;

                CREATE TRIGGER IF NOT EXISTS trg_snapshots_updated_at
                AFTER UPDATE ON snapshots FOR EACH ROW
                BEGIN
                    UPDATE snapshots
                    SET updated_at = STRFTIME('%Y-%m-%d %H:%M:%f', 'now')
                    WHERE id = NEW.id;
                END;

                CREATE TRIGGER IF NOT EXISTS trg_podcast_episodes_updated_at
                AFTER UPDATE ON podcast_episodes FOR EACH ROW
                BEGIN
                    UPDATE podcast_episodes
                    SET updated_at = STRFTIME('%Y-%m-%d %H:%M:%f', 'now')
                    WHERE id = NEW.id;
                END;
                "#,
        )?;

        Ok(())
    }

    /// Acquire the connection guard
    pub(crate) fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap()
    }
}

/// Check whether a rusqlite error is a UNIQUE constraint violation
pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

/// Map a rusqlite error to a Conflict with the given message when it is a
/// uniqueness violation, and to a Database error otherwise
pub(crate) fn map_insert_error(err: rusqlite::Error, conflict_msg: impl Into<String>) -> Error {
    if is_unique_violation(&err) {
        Error::Conflict(conflict_msg.into())
    } else {
        Error::Database(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_creation_is_idempotent() {
        let store = Store::in_memory().unwrap();
        assert!(store.create_schema().is_ok());
    }

    #[test]
    fn test_open_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("lowdown.db");
        let store = Store::open(&path);
        assert!(store.is_ok());
        assert!(path.exists());
    }

    #[test]
    fn test_all_tables_exist() {
        let store = Store::in_memory().unwrap();
        let conn = store.conn();
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'
                 AND name IN ('articles', 'threats', 'snapshots', 'podcast_episodes')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 4);
    }

    #[test]
    fn test_all_triggers_exist() {
        let store = Store::in_memory().unwrap();
        let conn = store.conn();
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'trigger'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        // One update-timestamp trigger per table, snapshots included.
        assert_eq!(count, 4);
    }
}
