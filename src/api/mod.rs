//! HTTP API layer
//!
//! Axum server exposing the entity endpoints (list/create/get/update/delete)
//! plus the summarize and highlight workflows. Endpoints map 1:1 onto store
//! operations; workflow endpoints orchestrate the scraper and summarizer
//! collaborators.

pub mod handlers;
pub mod server;

pub use handlers::create_router;
pub use server::{ApiServer, AppState};
