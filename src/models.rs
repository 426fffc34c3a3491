//! Core data structures for The Lowdown backend
//!
//! Four independently owned record types (no foreign keys between them):
//! articles, threats, snapshots, and podcast episodes. Each carries a
//! lifecycle status and store-maintained `created_at`/`updated_at`
//! timestamps.

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;

fn default_source() -> Option<String> {
    Some("Manual".to_string())
}

// ============================================================================
// Status Enums
// ============================================================================

macro_rules! status_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? } default $default:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant,)+
        }

        impl $name {
            /// Convert to the string stored in the database
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::$default
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(format!("unknown {} value: {other}", stringify!($name))),
                }
            }
        }

        impl ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_str()))
            }
        }

        impl FromSql for $name {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                value
                    .as_str()?
                    .parse()
                    .map_err(|e: String| FromSqlError::Other(e.into()))
            }
        }
    };
}

status_enum! {
    /// Article lifecycle status
    ArticleStatus {
        Pending => "pending",
        Summarized => "summarized",
        Accepted => "accepted",
        Archived => "archived",
    } default Pending
}

status_enum! {
    /// Threat lifecycle status, promoted manually
    ThreatStatus {
        Draft => "draft",
        Recommended => "recommended",
        Published => "published",
    } default Draft
}

status_enum! {
    /// Snapshot lifecycle status
    SnapshotStatus {
        Pending => "pending",
        Highlighted => "highlighted",
        Accepted => "accepted",
        Archived => "archived",
    } default Pending
}

// ============================================================================
// Article
// ============================================================================

/// Curated newsletter article
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub id: i64,
    /// Natural key, unique across articles
    pub url: String,
    pub title: Option<String>,
    pub source: Option<String>,
    /// Generated newsletter summary, populated by the summarize workflow
    pub summary: Option<String>,
    pub status: ArticleStatus,
    /// Raw scraped page text, populated by the summarize workflow
    pub original_content: Option<String>,
    /// Manual ordering within the newsletter
    pub position: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

/// Payload for creating an article
#[derive(Debug, Clone, Deserialize)]
pub struct ArticleCreate {
    pub url: String,
    pub title: Option<String>,
    pub summary: Option<String>,
    #[serde(default = "default_source")]
    pub source: Option<String>,
}

/// Partial update payload for an article; unset fields are left untouched
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArticleUpdate {
    pub url: Option<String>,
    pub title: Option<String>,
    pub source: Option<String>,
    pub summary: Option<String>,
    pub status: Option<ArticleStatus>,
    pub position: Option<i64>,
}

impl ArticleUpdate {
    /// True when no field is set
    pub fn is_empty(&self) -> bool {
        self.url.is_none()
            && self.title.is_none()
            && self.source.is_none()
            && self.summary.is_none()
            && self.status.is_none()
            && self.position.is_none()
    }
}

// ============================================================================
// Threat
// ============================================================================

/// "Threat of the day" entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Threat {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub threat_type: Option<String>,
    pub country_of_origin: Option<String>,
    pub description: Option<String>,
    /// Structured technical data (range, speed, ...), stored as JSON text
    pub specifications: Option<Map<String, Value>>,
    /// Initial operational capability year
    pub ioc_year: Option<i64>,
    /// Ordered list of operator nations, stored as JSON text
    pub operators: Option<Vec<String>>,
    pub image_url: Option<String>,
    pub tod_summary: Option<String>,
    pub status: ThreatStatus,
    pub created_at: String,
    pub updated_at: String,
}

/// Payload for creating a threat
#[derive(Debug, Clone, Deserialize)]
pub struct ThreatCreate {
    pub name: String,
    #[serde(rename = "type", alias = "threat_type")]
    pub threat_type: Option<String>,
    pub country_of_origin: Option<String>,
    pub description: Option<String>,
    pub specifications: Option<Map<String, Value>>,
    pub ioc_year: Option<i64>,
    pub operators: Option<Vec<String>>,
    pub image_url: Option<String>,
}

/// Partial update payload for a threat
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ThreatUpdate {
    pub name: Option<String>,
    #[serde(rename = "type", alias = "threat_type")]
    pub threat_type: Option<String>,
    pub country_of_origin: Option<String>,
    pub description: Option<String>,
    pub specifications: Option<Map<String, Value>>,
    pub ioc_year: Option<i64>,
    pub operators: Option<Vec<String>>,
    pub image_url: Option<String>,
    pub tod_summary: Option<String>,
    pub status: Option<ThreatStatus>,
}

// ============================================================================
// Snapshot
// ============================================================================

/// Short-form article with a one-sentence highlight instead of a summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub id: i64,
    /// Natural key, unique across snapshots
    pub url: String,
    pub title: Option<String>,
    pub source: Option<String>,
    /// Generated one-sentence highlight
    pub highlight: Option<String>,
    pub status: SnapshotStatus,
    pub original_content: Option<String>,
    pub position: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

/// Payload for creating a snapshot
#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotCreate {
    pub url: String,
    pub title: Option<String>,
    pub highlight: Option<String>,
    #[serde(default = "default_source")]
    pub source: Option<String>,
}

/// Partial update payload for a snapshot
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SnapshotUpdate {
    pub url: Option<String>,
    pub title: Option<String>,
    pub source: Option<String>,
    pub highlight: Option<String>,
    pub status: Option<SnapshotStatus>,
    pub position: Option<i64>,
}

// ============================================================================
// Podcast Episode
// ============================================================================

/// Podcast episode metadata record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PodcastEpisode {
    pub id: i64,
    pub title: String,
    pub episode_number: Option<i64>,
    /// Natural key, unique across episodes
    pub podcast_url: String,
    pub description: Option<String>,
    pub published_date: Option<String>,
    pub image_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Payload for creating a podcast episode
#[derive(Debug, Clone, Deserialize)]
pub struct PodcastEpisodeCreate {
    pub title: String,
    pub podcast_url: String,
    pub episode_number: Option<i64>,
    pub description: Option<String>,
    pub published_date: Option<String>,
    pub image_url: Option<String>,
}

/// Partial update payload for a podcast episode
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PodcastEpisodeUpdate {
    pub title: Option<String>,
    pub podcast_url: Option<String>,
    pub episode_number: Option<i64>,
    pub description: Option<String>,
    pub published_date: Option<String>,
    pub image_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            ArticleStatus::Pending,
            ArticleStatus::Summarized,
            ArticleStatus::Accepted,
            ArticleStatus::Archived,
        ] {
            assert_eq!(status.as_str().parse::<ArticleStatus>().unwrap(), status);
        }

        for status in [
            ThreatStatus::Draft,
            ThreatStatus::Recommended,
            ThreatStatus::Published,
        ] {
            assert_eq!(status.as_str().parse::<ThreatStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_status_defaults() {
        assert_eq!(ArticleStatus::default(), ArticleStatus::Pending);
        assert_eq!(ThreatStatus::default(), ThreatStatus::Draft);
        assert_eq!(SnapshotStatus::default(), SnapshotStatus::Pending);
    }

    #[test]
    fn test_unknown_status_rejected() {
        assert!("bogus".parse::<ArticleStatus>().is_err());
    }

    #[test]
    fn test_article_create_defaults_source() {
        let payload: ArticleCreate =
            serde_json::from_str(r#"{"url": "http://example.com/a"}"#).unwrap();
        assert_eq!(payload.source.as_deref(), Some("Manual"));
        assert!(payload.title.is_none());
    }

    #[test]
    fn test_threat_type_field_name() {
        // The wire name is "type"; "threat_type" is accepted as an alias.
        let payload: ThreatCreate = serde_json::from_str(
            r#"{"name": "S-400 Triumf", "type": "SAM", "operators": ["Russia", "China"]}"#,
        )
        .unwrap();
        assert_eq!(payload.threat_type.as_deref(), Some("SAM"));
        assert_eq!(payload.operators.as_deref(), Some(&["Russia".to_string(), "China".to_string()][..]));

        let aliased: ThreatCreate =
            serde_json::from_str(r#"{"name": "Kinzhal", "threat_type": "ALBM"}"#).unwrap();
        assert_eq!(aliased.threat_type.as_deref(), Some("ALBM"));
    }

    #[test]
    fn test_threat_serializes_type_key() {
        let threat = Threat {
            id: 1,
            name: "S-400 Triumf".to_string(),
            threat_type: Some("SAM".to_string()),
            country_of_origin: Some("Russia".to_string()),
            description: None,
            specifications: None,
            ioc_year: Some(2007),
            operators: None,
            image_url: None,
            tod_summary: None,
            status: ThreatStatus::Draft,
            created_at: "2025-01-01 00:00:00.000".to_string(),
            updated_at: "2025-01-01 00:00:00.000".to_string(),
        };

        let json = serde_json::to_value(&threat).unwrap();
        assert_eq!(json["type"], "SAM");
        assert_eq!(json["status"], "draft");
    }

    #[test]
    fn test_empty_update_detection() {
        let update = ArticleUpdate::default();
        assert!(update.is_empty());

        let update = ArticleUpdate {
            title: Some("New title".to_string()),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }
}
