//! lowdown - backend API for The Lowdown newsletter
//!
//! A small content-management backend for a defense and aviation newsletter:
//! articles, "threat of the day" entries, snapshots, and podcast episodes,
//! plus a summarize workflow that scrapes an article URL and stores a
//! generated summary.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration management and settings
//! - [`models`] - Core data structures and types
//! - [`store`] - SQLite persistence with update-timestamp triggers
//! - [`scrape`] - Web scraper collaborator (real + test double)
//! - [`summarize`] - Summary/highlight generation collaborator
//! - [`api`] - Axum HTTP server and route handlers
//! - [`error`] - Unified error handling
//!
//! # Example
//!
//! ```no_run
//! use lowdown::api::ApiServer;
//! use lowdown::config::Config;
//! use lowdown::scrape::HttpScraper;
//! use lowdown::store::Store;
//! use lowdown::summarize::StubSummarizer;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let store = Arc::new(Store::open(&config.database.sqlite_path)?);
//!     let scraper = Arc::new(HttpScraper::new(&config.scraper)?);
//!     let server = ApiServer::new(config.server, store, scraper, Arc::new(StubSummarizer));
//!     server.start().await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod scrape;
pub mod store;
pub mod summarize;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::api::{ApiServer, AppState};
    pub use crate::config::Config;
    pub use crate::error::{Error, Result};
    pub use crate::models::{
        Article, ArticleStatus, PodcastEpisode, Snapshot, SnapshotStatus, Threat, ThreatStatus,
    };
    pub use crate::scrape::{ContentScraper, HttpScraper};
    pub use crate::store::Store;
    pub use crate::summarize::{StubSummarizer, Summarizer};
}

// Direct re-exports for convenience
pub use models::{Article, PodcastEpisode, Snapshot, Threat};
