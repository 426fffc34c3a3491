//! Snapshot store operations
//!
//! Snapshots parallel articles but carry a one-sentence `highlight` instead
//! of a full summary. Ordering, archived-row re-activation, and position
//! re-indexing behave the same way.

use rusqlite::{params, Connection, OptionalExtension, ToSql};

use crate::error::{Error, Result};
use crate::models::{Snapshot, SnapshotCreate, SnapshotStatus, SnapshotUpdate};
use crate::store::articles::reindex_positions;
use crate::store::{map_insert_error, Store};

const COLUMNS: &str = "id, url, title, source, highlight, status, original_content, position, \
                       created_at, updated_at";

fn row_to_snapshot(row: &rusqlite::Row<'_>) -> rusqlite::Result<Snapshot> {
    Ok(Snapshot {
        id: row.get(0)?,
        url: row.get(1)?,
        title: row.get(2)?,
        source: row.get(3)?,
        highlight: row.get(4)?,
        status: row.get(5)?,
        original_content: row.get(6)?,
        position: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

fn fetch(conn: &Connection, id: i64) -> Result<Snapshot> {
    let sql = format!("SELECT {COLUMNS} FROM snapshots WHERE id = ?1");
    conn.query_row(&sql, params![id], row_to_snapshot)
        .optional()?
        .ok_or_else(|| Error::not_found("Snapshot not found."))
}

impl Store {
    /// List non-archived snapshots ordered by position
    pub fn list_snapshots(&self) -> Result<Vec<Snapshot>> {
        let conn = self.conn();
        let sql = format!(
            "SELECT {COLUMNS} FROM snapshots WHERE status != 'archived' ORDER BY position ASC"
        );
        let mut stmt = conn.prepare(&sql)?;
        let snapshots = stmt
            .query_map([], row_to_snapshot)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(snapshots)
    }

    /// Get a snapshot by id
    pub fn get_snapshot(&self, id: i64) -> Result<Snapshot> {
        let conn = self.conn();
        fetch(&conn, id)
    }

    /// Create a new snapshot at the bottom of the list
    pub fn create_snapshot(&self, payload: SnapshotCreate) -> Result<Snapshot> {
        if payload.url.trim().is_empty() {
            return Err(Error::validation("Snapshot url must not be empty."));
        }

        let conn = self.conn();

        let existing: Option<(i64, SnapshotStatus)> = conn
            .query_row(
                "SELECT id, status FROM snapshots WHERE url = ?1",
                params![payload.url],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        if let Some((id, status)) = existing {
            if status == SnapshotStatus::Archived {
                let max_pos: i64 = conn.query_row(
                    "SELECT COALESCE(MAX(position), 0) FROM snapshots WHERE status != 'archived'",
                    [],
                    |row| row.get(0),
                )?;
                conn.execute(
                    "UPDATE snapshots SET status = 'pending', position = ?1 WHERE id = ?2",
                    params![max_pos + 1, id],
                )?;
                tracing::info!(snapshot_id = id, url = %payload.url, "re-activated archived snapshot");
                return fetch(&conn, id);
            }
            return Err(Error::conflict(format!(
                "Snapshot with URL {} already exists.",
                payload.url
            )));
        }

        let position: i64 = conn.query_row(
            "SELECT COALESCE(MAX(position), 0) + 1 FROM snapshots",
            [],
            |row| row.get(0),
        )?;

        conn.execute(
            "INSERT INTO snapshots (url, title, source, highlight, position)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                payload.url,
                payload.title,
                payload.source,
                payload.highlight,
                position
            ],
        )
        .map_err(|e| {
            map_insert_error(
                e,
                format!("Snapshot with URL {} already exists.", payload.url),
            )
        })?;

        let id = conn.last_insert_rowid();
        tracing::info!(snapshot_id = id, url = %payload.url, "snapshot created");
        fetch(&conn, id)
    }

    /// Apply a partial update; `updated_at` is refreshed by the store trigger
    pub fn update_snapshot(&self, id: i64, fields: SnapshotUpdate) -> Result<Snapshot> {
        let conn = self.conn();

        let mut sets: Vec<&str> = Vec::new();
        let mut values: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(url) = fields.url {
            sets.push("url = ?");
            values.push(Box::new(url));
        }
        if let Some(title) = fields.title {
            sets.push("title = ?");
            values.push(Box::new(title));
        }
        if let Some(source) = fields.source {
            sets.push("source = ?");
            values.push(Box::new(source));
        }
        if let Some(highlight) = fields.highlight {
            sets.push("highlight = ?");
            values.push(Box::new(highlight));
        }
        if let Some(status) = fields.status {
            sets.push("status = ?");
            values.push(Box::new(status));
        }
        if let Some(position) = fields.position {
            sets.push("position = ?");
            values.push(Box::new(position));
        }

        if sets.is_empty() {
            return fetch(&conn, id);
        }

        let sql = format!("UPDATE snapshots SET {} WHERE id = ?", sets.join(", "));
        values.push(Box::new(id));

        let changed = conn
            .execute(&sql, rusqlite::params_from_iter(values))
            .map_err(|e| map_insert_error(e, "Snapshot with that URL already exists."))?;

        if changed == 0 {
            return Err(Error::not_found("Snapshot not found."));
        }

        fetch(&conn, id)
    }

    /// Persist the highlight workflow result and advance the lifecycle
    pub fn apply_snapshot_highlight(
        &self,
        id: i64,
        highlight: &str,
        original_content: &str,
    ) -> Result<Snapshot> {
        let conn = self.conn();
        let changed = conn.execute(
            "UPDATE snapshots SET highlight = ?1, original_content = ?2, status = 'highlighted'
             WHERE id = ?3",
            params![highlight, original_content, id],
        )?;

        if changed == 0 {
            return Err(Error::not_found("Snapshot not found."));
        }

        fetch(&conn, id)
    }

    /// Delete a snapshot and re-index the positions of the remaining rows
    pub fn delete_snapshot(&self, id: i64) -> Result<()> {
        let conn = self.conn();
        let deleted = conn.execute("DELETE FROM snapshots WHERE id = ?1", params![id])?;
        if deleted == 0 {
            return Err(Error::not_found("Snapshot not found."));
        }

        reindex_positions(&conn, "snapshots")?;
        tracing::info!(snapshot_id = id, "snapshot deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(store: &Store, url: &str) -> Snapshot {
        store
            .create_snapshot(SnapshotCreate {
                url: url.to_string(),
                title: Some("Snapshot".to_string()),
                highlight: None,
                source: Some("Manual".to_string()),
            })
            .unwrap()
    }

    #[test]
    fn test_create_defaults() {
        let store = Store::in_memory().unwrap();
        let snapshot = create(&store, "http://example.com/snap");

        assert_eq!(snapshot.status, SnapshotStatus::Pending);
        assert_eq!(snapshot.position, Some(1));
        assert_eq!(snapshot.created_at, snapshot.updated_at);
    }

    #[test]
    fn test_duplicate_url_conflicts() {
        let store = Store::in_memory().unwrap();
        create(&store, "http://example.com/snap");

        let err = store
            .create_snapshot(SnapshotCreate {
                url: "http://example.com/snap".to_string(),
                title: None,
                highlight: None,
                source: None,
            })
            .unwrap_err();

        assert!(matches!(err, Error::Conflict(_)));
        assert_eq!(store.list_snapshots().unwrap().len(), 1);
    }

    #[test]
    fn test_apply_highlight_transitions_status() {
        let store = Store::in_memory().unwrap();
        let snapshot = create(&store, "http://example.com/snap");

        let updated = store
            .apply_snapshot_highlight(snapshot.id, "🚩 One sentence.", "raw page text")
            .unwrap();

        assert_eq!(updated.status, SnapshotStatus::Highlighted);
        assert_eq!(updated.highlight.as_deref(), Some("🚩 One sentence."));
        assert_eq!(updated.original_content.as_deref(), Some("raw page text"));
    }

    #[test]
    fn test_delete_reindexes_positions() {
        let store = Store::in_memory().unwrap();
        let first = create(&store, "http://example.com/1");
        create(&store, "http://example.com/2");

        store.delete_snapshot(first.id).unwrap();

        let remaining = store.list_snapshots().unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].position, Some(1));
    }
}
