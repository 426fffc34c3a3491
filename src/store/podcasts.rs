//! Podcast episode store operations
//!
//! Episodes are immutable metadata records keyed by `podcast_url`.

use rusqlite::{params, Connection, OptionalExtension, ToSql};

use crate::error::{Error, Result};
use crate::models::{PodcastEpisode, PodcastEpisodeCreate, PodcastEpisodeUpdate};
use crate::store::{map_insert_error, Store};

const COLUMNS: &str = "id, title, episode_number, podcast_url, description, published_date, \
                       image_url, created_at, updated_at";

fn row_to_episode(row: &rusqlite::Row<'_>) -> rusqlite::Result<PodcastEpisode> {
    Ok(PodcastEpisode {
        id: row.get(0)?,
        title: row.get(1)?,
        episode_number: row.get(2)?,
        podcast_url: row.get(3)?,
        description: row.get(4)?,
        published_date: row.get(5)?,
        image_url: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

fn fetch(conn: &Connection, id: i64) -> Result<PodcastEpisode> {
    let sql = format!("SELECT {COLUMNS} FROM podcast_episodes WHERE id = ?1");
    conn.query_row(&sql, params![id], row_to_episode)
        .optional()?
        .ok_or_else(|| Error::not_found("Podcast episode not found."))
}

impl Store {
    /// List episodes, newest first
    pub fn list_podcast_episodes(&self) -> Result<Vec<PodcastEpisode>> {
        let conn = self.conn();
        let sql =
            format!("SELECT {COLUMNS} FROM podcast_episodes ORDER BY created_at DESC, id DESC");
        let mut stmt = conn.prepare(&sql)?;
        let episodes = stmt
            .query_map([], row_to_episode)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(episodes)
    }

    /// Get an episode by id
    pub fn get_podcast_episode(&self, id: i64) -> Result<PodcastEpisode> {
        let conn = self.conn();
        fetch(&conn, id)
    }

    /// Create a new episode
    pub fn create_podcast_episode(&self, payload: PodcastEpisodeCreate) -> Result<PodcastEpisode> {
        if payload.title.trim().is_empty() {
            return Err(Error::validation("Podcast episode title must not be empty."));
        }
        if payload.podcast_url.trim().is_empty() {
            return Err(Error::validation("Podcast episode url must not be empty."));
        }

        let conn = self.conn();
        conn.execute(
            "INSERT INTO podcast_episodes
                (title, episode_number, podcast_url, description, published_date, image_url)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                payload.title,
                payload.episode_number,
                payload.podcast_url,
                payload.description,
                payload.published_date,
                payload.image_url,
            ],
        )
        .map_err(|e| {
            map_insert_error(
                e,
                format!(
                    "Podcast episode with URL {} already exists.",
                    payload.podcast_url
                ),
            )
        })?;

        let id = conn.last_insert_rowid();
        tracing::info!(episode_id = id, url = %payload.podcast_url, "podcast episode created");
        fetch(&conn, id)
    }

    /// Apply a partial update; `updated_at` is refreshed by the store trigger
    pub fn update_podcast_episode(
        &self,
        id: i64,
        fields: PodcastEpisodeUpdate,
    ) -> Result<PodcastEpisode> {
        let conn = self.conn();

        let mut sets: Vec<&str> = Vec::new();
        let mut values: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(title) = fields.title {
            sets.push("title = ?");
            values.push(Box::new(title));
        }
        if let Some(episode_number) = fields.episode_number {
            sets.push("episode_number = ?");
            values.push(Box::new(episode_number));
        }
        if let Some(podcast_url) = fields.podcast_url {
            sets.push("podcast_url = ?");
            values.push(Box::new(podcast_url));
        }
        if let Some(description) = fields.description {
            sets.push("description = ?");
            values.push(Box::new(description));
        }
        if let Some(published_date) = fields.published_date {
            sets.push("published_date = ?");
            values.push(Box::new(published_date));
        }
        if let Some(image_url) = fields.image_url {
            sets.push("image_url = ?");
            values.push(Box::new(image_url));
        }

        if sets.is_empty() {
            return fetch(&conn, id);
        }

        let sql = format!("UPDATE podcast_episodes SET {} WHERE id = ?", sets.join(", "));
        values.push(Box::new(id));

        let changed = conn
            .execute(&sql, rusqlite::params_from_iter(values))
            .map_err(|e| map_insert_error(e, "Podcast episode with that URL already exists."))?;

        if changed == 0 {
            return Err(Error::not_found("Podcast episode not found."));
        }

        fetch(&conn, id)
    }

    /// Delete an episode by id
    pub fn delete_podcast_episode(&self, id: i64) -> Result<()> {
        let conn = self.conn();
        let deleted = conn.execute("DELETE FROM podcast_episodes WHERE id = ?1", params![id])?;
        if deleted == 0 {
            return Err(Error::not_found("Podcast episode not found."));
        }
        tracing::info!(episode_id = id, "podcast episode deleted");
        Ok(())
    }
}
