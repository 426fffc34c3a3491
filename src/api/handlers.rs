//! Route handlers for The Lowdown API
//!
//! One set of endpoints per entity type with identical shape, plus the
//! composite summarize/highlight workflows. Store errors surface through
//! [`crate::error::Error`]'s `IntoResponse` impl: conflict → 409,
//! not-found → 404, validation → 422, upstream failure → 502.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{
    Article, ArticleCreate, ArticleUpdate, PodcastEpisode, PodcastEpisodeCreate,
    PodcastEpisodeUpdate, Snapshot, SnapshotCreate, SnapshotUpdate, Threat, ThreatCreate,
    ThreatUpdate,
};

use super::server::AppState;

// ============================================================================
// Request / Response Types
// ============================================================================

/// Static welcome payload for the root endpoint
#[derive(Debug, Serialize)]
pub struct WelcomeResponse {
    pub message: String,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub uptime_secs: u64,
}

/// Summarize workflow request
#[derive(Debug, Deserialize)]
pub struct SummarizeRequest {
    pub article_id: i64,
}

/// Summarize workflow request with caller-supplied content
#[derive(Debug, Deserialize)]
pub struct ManualSummarizeRequest {
    pub article_id: i64,
    pub manual_content: String,
}

/// Highlight workflow request
#[derive(Debug, Deserialize)]
pub struct HighlightRequest {
    pub snapshot_id: i64,
}

/// Highlight workflow request with caller-supplied content
#[derive(Debug, Deserialize)]
pub struct ManualHighlightRequest {
    pub snapshot_id: i64,
    pub manual_content: String,
}

// ============================================================================
// Router
// ============================================================================

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(read_root))
        .route("/health", get(health_check))
        // Articles
        .route("/articles", get(list_articles).post(create_article))
        .route(
            "/articles/{id}",
            get(get_article).patch(update_article).delete(delete_article),
        )
        // Threats
        .route("/threats", get(list_threats).post(create_threat))
        .route(
            "/threats/{id}",
            get(get_threat).patch(update_threat).delete(delete_threat),
        )
        // Podcasts
        .route("/podcasts", get(list_podcasts).post(create_podcast))
        .route(
            "/podcasts/{id}",
            get(get_podcast).patch(update_podcast).delete(delete_podcast),
        )
        // Snapshots
        .route("/snapshots", get(list_snapshots).post(create_snapshot))
        .route(
            "/snapshots/{id}",
            get(get_snapshot)
                .patch(update_snapshot)
                .delete(delete_snapshot),
        )
        // Workflows
        .route("/summarize", post(summarize_article))
        .route("/summarize-manual", post(summarize_article_manual))
        .route("/highlight", post(highlight_snapshot))
        .route("/highlight-manual", post(highlight_snapshot_manual))
        .with_state(state)
}

// ============================================================================
// Root Handlers
// ============================================================================

async fn read_root() -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        message: "Welcome to The Lowdown API".to_string(),
    })
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "The Lowdown API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

// ============================================================================
// Article Handlers
// ============================================================================

async fn list_articles(State(state): State<AppState>) -> Result<Json<Vec<Article>>> {
    Ok(Json(state.store.list_articles()?))
}

async fn get_article(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Article>> {
    Ok(Json(state.store.get_article(id)?))
}

async fn create_article(
    State(state): State<AppState>,
    Json(payload): Json<ArticleCreate>,
) -> Result<(StatusCode, Json<Article>)> {
    let article = state.store.create_article(payload)?;
    Ok((StatusCode::CREATED, Json(article)))
}

async fn update_article(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(fields): Json<ArticleUpdate>,
) -> Result<Json<Article>> {
    Ok(Json(state.store.update_article(id, fields)?))
}

async fn delete_article(State(state): State<AppState>, Path(id): Path<i64>) -> Result<StatusCode> {
    state.store.delete_article(id)?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Threat Handlers
// ============================================================================

async fn list_threats(State(state): State<AppState>) -> Result<Json<Vec<Threat>>> {
    Ok(Json(state.store.list_threats()?))
}

async fn get_threat(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<Threat>> {
    Ok(Json(state.store.get_threat(id)?))
}

async fn create_threat(
    State(state): State<AppState>,
    Json(payload): Json<ThreatCreate>,
) -> Result<(StatusCode, Json<Threat>)> {
    let threat = state.store.create_threat(payload)?;
    Ok((StatusCode::CREATED, Json(threat)))
}

async fn update_threat(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(fields): Json<ThreatUpdate>,
) -> Result<Json<Threat>> {
    Ok(Json(state.store.update_threat(id, fields)?))
}

async fn delete_threat(State(state): State<AppState>, Path(id): Path<i64>) -> Result<StatusCode> {
    state.store.delete_threat(id)?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Podcast Handlers
// ============================================================================

async fn list_podcasts(State(state): State<AppState>) -> Result<Json<Vec<PodcastEpisode>>> {
    Ok(Json(state.store.list_podcast_episodes()?))
}

async fn get_podcast(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<PodcastEpisode>> {
    Ok(Json(state.store.get_podcast_episode(id)?))
}

async fn create_podcast(
    State(state): State<AppState>,
    Json(payload): Json<PodcastEpisodeCreate>,
) -> Result<(StatusCode, Json<PodcastEpisode>)> {
    let episode = state.store.create_podcast_episode(payload)?;
    Ok((StatusCode::CREATED, Json(episode)))
}

async fn update_podcast(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(fields): Json<PodcastEpisodeUpdate>,
) -> Result<Json<PodcastEpisode>> {
    Ok(Json(state.store.update_podcast_episode(id, fields)?))
}

async fn delete_podcast(State(state): State<AppState>, Path(id): Path<i64>) -> Result<StatusCode> {
    state.store.delete_podcast_episode(id)?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Snapshot Handlers
// ============================================================================

async fn list_snapshots(State(state): State<AppState>) -> Result<Json<Vec<Snapshot>>> {
    Ok(Json(state.store.list_snapshots()?))
}

async fn get_snapshot(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Snapshot>> {
    Ok(Json(state.store.get_snapshot(id)?))
}

async fn create_snapshot(
    State(state): State<AppState>,
    Json(payload): Json<SnapshotCreate>,
) -> Result<(StatusCode, Json<Snapshot>)> {
    let snapshot = state.store.create_snapshot(payload)?;
    Ok((StatusCode::CREATED, Json(snapshot)))
}

async fn update_snapshot(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(fields): Json<SnapshotUpdate>,
) -> Result<Json<Snapshot>> {
    Ok(Json(state.store.update_snapshot(id, fields)?))
}

async fn delete_snapshot(State(state): State<AppState>, Path(id): Path<i64>) -> Result<StatusCode> {
    state.store.delete_snapshot(id)?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Workflow Handlers
// ============================================================================

/// Summarize an article: load → scrape → summarize → persist.
///
/// Collaborator failures abort the workflow with no store mutation.
async fn summarize_article(
    State(state): State<AppState>,
    Json(request): Json<SummarizeRequest>,
) -> Result<Json<Article>> {
    let article = state.store.get_article(request.article_id)?;
    tracing::info!(article_id = request.article_id, url = %article.url, "summarization started");

    let content = state.scraper.fetch(&article.url).await?;
    let summary = state.summarizer.summarize(
        article.title.as_deref().unwrap_or(""),
        &content,
        &article.url,
    )?;

    let updated = state
        .store
        .apply_article_summary(request.article_id, &summary, &content)?;

    tracing::info!(article_id = request.article_id, "summarization complete");
    Ok(Json(updated))
}

/// Summarize an article from caller-supplied content, bypassing the scraper
async fn summarize_article_manual(
    State(state): State<AppState>,
    Json(request): Json<ManualSummarizeRequest>,
) -> Result<Json<Article>> {
    let article = state.store.get_article(request.article_id)?;

    let content = request.manual_content.trim();
    if content.is_empty() {
        return Err(Error::validation("Manual content cannot be empty."));
    }
    tracing::info!(article_id = request.article_id, "manual summarization started");

    let summary = state.summarizer.summarize(
        article.title.as_deref().unwrap_or(""),
        content,
        &article.url,
    )?;

    let updated = state
        .store
        .apply_article_summary(request.article_id, &summary, content)?;

    tracing::info!(article_id = request.article_id, "manual summarization complete");
    Ok(Json(updated))
}

/// Highlight a snapshot: load → scrape → highlight → persist
async fn highlight_snapshot(
    State(state): State<AppState>,
    Json(request): Json<HighlightRequest>,
) -> Result<Json<Snapshot>> {
    let snapshot = state.store.get_snapshot(request.snapshot_id)?;
    tracing::info!(snapshot_id = request.snapshot_id, url = %snapshot.url, "highlighting started");

    let content = state.scraper.fetch(&snapshot.url).await?;
    let highlight = state.summarizer.highlight(&content, &snapshot.url)?;

    let updated = state
        .store
        .apply_snapshot_highlight(request.snapshot_id, &highlight, &content)?;

    tracing::info!(snapshot_id = request.snapshot_id, "highlighting complete");
    Ok(Json(updated))
}

/// Highlight a snapshot from caller-supplied content, bypassing the scraper
async fn highlight_snapshot_manual(
    State(state): State<AppState>,
    Json(request): Json<ManualHighlightRequest>,
) -> Result<Json<Snapshot>> {
    let snapshot = state.store.get_snapshot(request.snapshot_id)?;

    let content = request.manual_content.trim();
    if content.is_empty() {
        return Err(Error::validation("Manual content cannot be empty."));
    }
    tracing::info!(snapshot_id = request.snapshot_id, "manual highlighting started");

    let highlight = state.summarizer.highlight(content, &snapshot.url)?;

    let updated = state
        .store
        .apply_snapshot_highlight(request.snapshot_id, &highlight, content)?;

    tracing::info!(snapshot_id = request.snapshot_id, "manual highlighting complete");
    Ok(Json(updated))
}
