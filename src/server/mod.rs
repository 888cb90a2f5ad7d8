//! HTTP front door: upload form, `/upload` and `/health`.

pub mod error;
pub mod routes;

use crate::config::ReviewsConfig;
use crate::core::batch::BatchPipeline;
use crate::utils::error::Result;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub batch: BatchPipeline,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(batch: BatchPipeline, max_upload_bytes: usize) -> Self {
        Self {
            batch,
            max_upload_bytes,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let max_upload_bytes = state.max_upload_bytes;

    Router::new()
        .route("/", get(routes::upload_page))
        .route("/upload", post(routes::upload_file))
        .route("/health", get(routes::health_check))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .with_state(state)
}

/// Binds `config.server.bind` and serves until ctrl-c.
pub async fn serve(config: &ReviewsConfig, state: AppState) -> Result<()> {
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    tracing::info!("🌐 Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
