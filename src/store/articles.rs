//! Article store operations
//!
//! Articles are ordered by a manual `position` field. Listing excludes
//! archived rows. Re-adding an archived URL re-activates the existing row
//! instead of conflicting.

use rusqlite::{params, Connection, OptionalExtension, ToSql};

use crate::error::{Error, Result};
use crate::models::{Article, ArticleCreate, ArticleStatus, ArticleUpdate};
use crate::store::{map_insert_error, Store};

const COLUMNS: &str =
    "id, url, title, source, summary, status, original_content, position, created_at, updated_at";

fn row_to_article(row: &rusqlite::Row<'_>) -> rusqlite::Result<Article> {
    Ok(Article {
        id: row.get(0)?,
        url: row.get(1)?,
        title: row.get(2)?,
        source: row.get(3)?,
        summary: row.get(4)?,
        status: row.get(5)?,
        original_content: row.get(6)?,
        position: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

fn fetch(conn: &Connection, id: i64) -> Result<Article> {
    let sql = format!("SELECT {COLUMNS} FROM articles WHERE id = ?1");
    conn.query_row(&sql, params![id], row_to_article)
        .optional()?
        .ok_or_else(|| Error::not_found("Article not found."))
}

impl Store {
    /// List non-archived articles ordered by position
    pub fn list_articles(&self) -> Result<Vec<Article>> {
        let conn = self.conn();
        let sql = format!(
            "SELECT {COLUMNS} FROM articles WHERE status != 'archived' ORDER BY position ASC"
        );
        let mut stmt = conn.prepare(&sql)?;
        let articles = stmt
            .query_map([], row_to_article)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(articles)
    }

    /// Get an article by id
    pub fn get_article(&self, id: i64) -> Result<Article> {
        let conn = self.conn();
        fetch(&conn, id)
    }

    /// Create a new article at the bottom of the list
    ///
    /// If an article with the same URL exists and is archived, it is
    /// re-activated (status back to pending, moved to the top position).
    /// An active duplicate is a Conflict.
    pub fn create_article(&self, payload: ArticleCreate) -> Result<Article> {
        if payload.url.trim().is_empty() {
            return Err(Error::validation("Article url must not be empty."));
        }

        let conn = self.conn();

        let existing: Option<(i64, ArticleStatus)> = conn
            .query_row(
                "SELECT id, status FROM articles WHERE url = ?1",
                params![payload.url],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        if let Some((id, status)) = existing {
            if status == ArticleStatus::Archived {
                let max_pos: i64 = conn.query_row(
                    "SELECT COALESCE(MAX(position), 0) FROM articles WHERE status != 'archived'",
                    [],
                    |row| row.get(0),
                )?;
                conn.execute(
                    "UPDATE articles SET status = 'pending', position = ?1 WHERE id = ?2",
                    params![max_pos + 1, id],
                )?;
                tracing::info!(article_id = id, url = %payload.url, "re-activated archived article");
                return fetch(&conn, id);
            }
            return Err(Error::conflict(format!(
                "Article with URL {} already exists.",
                payload.url
            )));
        }

        let position: i64 = conn.query_row(
            "SELECT COALESCE(MAX(position), 0) + 1 FROM articles",
            [],
            |row| row.get(0),
        )?;

        conn.execute(
            "INSERT INTO articles (url, title, source, summary, position)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                payload.url,
                payload.title,
                payload.source,
                payload.summary,
                position
            ],
        )
        .map_err(|e| {
            map_insert_error(
                e,
                format!("Article with URL {} already exists.", payload.url),
            )
        })?;

        let id = conn.last_insert_rowid();
        tracing::info!(article_id = id, url = %payload.url, "article created");
        fetch(&conn, id)
    }

    /// Apply a partial update; `updated_at` is refreshed by the store trigger
    pub fn update_article(&self, id: i64, fields: ArticleUpdate) -> Result<Article> {
        let conn = self.conn();

        if fields.is_empty() {
            return fetch(&conn, id);
        }

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
        if let Some(summary) = fields.summary {
            sets.push("summary = ?");
            values.push(Box::new(summary));
        }
        if let Some(status) = fields.status {
            sets.push("status = ?");
            values.push(Box::new(status));
        }
        if let Some(position) = fields.position {
            sets.push("position = ?");
            values.push(Box::new(position));
        }

        let sql = format!("UPDATE articles SET {} WHERE id = ?", sets.join(", "));
        values.push(Box::new(id));

        let changed = conn
            .execute(&sql, rusqlite::params_from_iter(values))
            .map_err(|e| map_insert_error(e, "Article with that URL already exists."))?;

        if changed == 0 {
            return Err(Error::not_found("Article not found."));
        }

        fetch(&conn, id)
    }

    /// Persist the summarize workflow result and advance the lifecycle
    pub fn apply_article_summary(
        &self,
        id: i64,
        summary: &str,
        original_content: &str,
    ) -> Result<Article> {
        let conn = self.conn();
        let changed = conn.execute(
            "UPDATE articles SET summary = ?1, original_content = ?2, status = 'summarized'
             WHERE id = ?3",
            params![summary, original_content, id],
        )?;

        if changed == 0 {
            return Err(Error::not_found("Article not found."));
        }

        fetch(&conn, id)
    }

    /// Delete an article and re-index the positions of the remaining rows
    pub fn delete_article(&self, id: i64) -> Result<()> {
        let conn = self.conn();
        let deleted = conn.execute("DELETE FROM articles WHERE id = ?1", params![id])?;
        if deleted == 0 {
            return Err(Error::not_found("Article not found."));
        }

        reindex_positions(&conn, "articles")?;
        tracing::info!(article_id = id, "article deleted");
        Ok(())
    }
}

/// Re-number the positions of non-archived rows 1..n, preserving order
pub(crate) fn reindex_positions(conn: &Connection, table: &str) -> Result<()> {
    let sql = format!("SELECT id FROM {table} WHERE status != 'archived' ORDER BY position ASC");
    let mut stmt = conn.prepare(&sql)?;
    let ids = stmt
        .query_map([], |row| row.get::<_, i64>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let update = format!("UPDATE {table} SET position = ?1 WHERE id = ?2");
    for (i, row_id) in ids.iter().enumerate() {
        conn.execute(&update, params![(i + 1) as i64, row_id])?;
    }
    Ok(())
}
