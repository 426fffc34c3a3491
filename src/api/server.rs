//! API server wiring
//!
//! Builds the shared application state, applies the CORS and tracing layers,
//! and runs the axum server. The store and the scraper/summarizer
//! collaborators are injected at construction time.

use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::error::Result;
use crate::scrape::ContentScraper;
use crate::store::Store;
use crate::summarize::Summarizer;

use super::handlers::create_router;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Relational store
    pub store: Arc<Store>,

    /// Web scraper collaborator
    pub scraper: Arc<dyn ContentScraper>,

    /// Summary/highlight generator
    pub summarizer: Arc<dyn Summarizer>,

    /// Server start time
    pub start_time: Instant,
}

impl AppState {
    pub fn new(
        store: Arc<Store>,
        scraper: Arc<dyn ContentScraper>,
        summarizer: Arc<dyn Summarizer>,
    ) -> Self {
        Self {
            store,
            scraper,
            summarizer,
            start_time: Instant::now(),
        }
    }
}

/// Main API server
pub struct ApiServer {
    config: ServerConfig,
    state: AppState,
}

impl ApiServer {
    /// Create a new server with injected collaborators
    pub fn new(
        config: ServerConfig,
        store: Arc<Store>,
        scraper: Arc<dyn ContentScraper>,
        summarizer: Arc<dyn Summarizer>,
    ) -> Self {
        let state = AppState::new(store, scraper, summarizer);
        Self { config, state }
    }

    /// Get the application state
    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    /// Build the router with all routes and configured layers
    pub fn build_router(&self) -> Router {
        let mut router = create_router(self.state.clone());

        if self.config.enable_cors {
            router = router.layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            );
        }

        if self.config.enable_request_logging {
            router = router.layer(TraceLayer::new_for_http());
        }

        router
    }

    /// Start the server
    pub async fn start(&self) -> Result<()> {
        let router = self.build_router();
        let addr = self.config.bind_address;

        tracing::info!("Starting The Lowdown API server on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, router).await?;

        Ok(())
    }

    /// Start with graceful shutdown
    pub async fn start_with_shutdown(
        &self,
        shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> Result<()> {
        let router = self.build_router();
        let addr = self.config.bind_address;

        tracing::info!(
            "Starting The Lowdown API server on {} (with graceful shutdown)",
            addr
        );

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal)
            .await?;

        tracing::info!("The Lowdown API server shutdown complete");
        Ok(())
    }
}
