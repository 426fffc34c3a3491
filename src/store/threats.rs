//! Threat store operations
//!
//! `specifications` (a structured map) and `operators` (an ordered list of
//! nations) are typed values at the API boundary and JSON text at the
//! persistence edge.

use rusqlite::{params, Connection, OptionalExtension, ToSql};
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::models::{Threat, ThreatCreate, ThreatUpdate};
use crate::store::Store;

const COLUMNS: &str = "id, name, type, country_of_origin, description, specifications, ioc_year, \
                       operators, image_url, tod_summary, status, created_at, updated_at";

fn decode_json<T: serde::de::DeserializeOwned>(
    idx: usize,
    text: Option<String>,
) -> rusqlite::Result<Option<T>> {
    match text {
        None => Ok(None),
        Some(text) => serde_json::from_str(&text).map(Some).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                idx,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        }),
    }
}

fn row_to_threat(row: &rusqlite::Row<'_>) -> rusqlite::Result<Threat> {
    let specifications: Option<Map<String, Value>> = decode_json(5, row.get(5)?)?;
    let operators: Option<Vec<String>> = decode_json(7, row.get(7)?)?;

    Ok(Threat {
        id: row.get(0)?,
        name: row.get(1)?,
        threat_type: row.get(2)?,
        country_of_origin: row.get(3)?,
        description: row.get(4)?,
        specifications,
        ioc_year: row.get(6)?,
        operators,
        image_url: row.get(8)?,
        tod_summary: row.get(9)?,
        status: row.get(10)?,
        created_at: row.get(11)?,
        updated_at: row.get(12)?,
    })
}

fn fetch(conn: &Connection, id: i64) -> Result<Threat> {
    let sql = format!("SELECT {COLUMNS} FROM threats WHERE id = ?1");
    conn.query_row(&sql, params![id], row_to_threat)
        .optional()?
        .ok_or_else(|| Error::not_found("Threat not found."))
}

fn encode_json<T: serde::Serialize>(value: &Option<T>) -> Result<Option<String>> {
    value
        .as_ref()
        .map(|v| serde_json::to_string(v))
        .transpose()
        .map_err(Error::from)
}

impl Store {
    /// List threats, newest first
    pub fn list_threats(&self) -> Result<Vec<Threat>> {
        let conn = self.conn();
        let sql = format!("SELECT {COLUMNS} FROM threats ORDER BY created_at DESC, id DESC");
        let mut stmt = conn.prepare(&sql)?;
        let threats = stmt
            .query_map([], row_to_threat)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(threats)
    }

    /// Get a threat by id
    pub fn get_threat(&self, id: i64) -> Result<Threat> {
        let conn = self.conn();
        fetch(&conn, id)
    }

    /// Create a new threat with status `draft`
    pub fn create_threat(&self, payload: ThreatCreate) -> Result<Threat> {
        if payload.name.trim().is_empty() {
            return Err(Error::validation("Threat name must not be empty."));
        }

        let specifications = encode_json(&payload.specifications)?;
        let operators = encode_json(&payload.operators)?;

        let conn = self.conn();
        conn.execute(
            "INSERT INTO threats
                (name, type, country_of_origin, description, specifications, ioc_year, operators, image_url)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                payload.name,
                payload.threat_type,
                payload.country_of_origin,
                payload.description,
                specifications,
                payload.ioc_year,
                operators,
                payload.image_url,
            ],
        )?;

        let id = conn.last_insert_rowid();
        tracing::info!(threat_id = id, name = %payload.name, "threat created");
        fetch(&conn, id)
    }

    /// Apply a partial update; `updated_at` is refreshed by the store trigger
    pub fn update_threat(&self, id: i64, fields: ThreatUpdate) -> Result<Threat> {
        let specifications = encode_json(&fields.specifications)?;
        let operators = encode_json(&fields.operators)?;

        let conn = self.conn();

        let mut sets: Vec<&str> = Vec::new();
        let mut values: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(name) = fields.name {
            sets.push("name = ?");
            values.push(Box::new(name));
        }
        if let Some(threat_type) = fields.threat_type {
            sets.push("type = ?");
            values.push(Box::new(threat_type));
        }
        if let Some(country) = fields.country_of_origin {
            sets.push("country_of_origin = ?");
            values.push(Box::new(country));
        }
        if let Some(description) = fields.description {
            sets.push("description = ?");
            values.push(Box::new(description));
        }
        if let Some(json) = specifications {
            sets.push("specifications = ?");
            values.push(Box::new(json));
        }
        if let Some(ioc_year) = fields.ioc_year {
            sets.push("ioc_year = ?");
            values.push(Box::new(ioc_year));
        }
        if let Some(json) = operators {
            sets.push("operators = ?");
            values.push(Box::new(json));
        }
        if let Some(image_url) = fields.image_url {
            sets.push("image_url = ?");
            values.push(Box::new(image_url));
        }
        if let Some(tod_summary) = fields.tod_summary {
            sets.push("tod_summary = ?");
            values.push(Box::new(tod_summary));
        }
        if let Some(status) = fields.status {
            sets.push("status = ?");
            values.push(Box::new(status));
        }

        if sets.is_empty() {
            return fetch(&conn, id);
        }

        let sql = format!("UPDATE threats SET {} WHERE id = ?", sets.join(", "));
        values.push(Box::new(id));

        let changed = conn.execute(&sql, rusqlite::params_from_iter(values))?;
        if changed == 0 {
            return Err(Error::not_found("Threat not found."));
        }

        fetch(&conn, id)
    }

    /// Delete a threat by id
    pub fn delete_threat(&self, id: i64) -> Result<()> {
        let conn = self.conn();
        let deleted = conn.execute("DELETE FROM threats WHERE id = ?1", params![id])?;
        if deleted == 0 {
            return Err(Error::not_found("Threat not found."));
        }
        tracing::info!(threat_id = id, "threat deleted");
        Ok(())
    }
}
