mod error;
mod routes;

use crate::{config::Config, media::MediaService};
use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use routes::{
    download_handler, health_handler, tiktok_download_handler, tiktok_info_handler,
    video_info_handler,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub media: Arc<MediaService>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/video-info", post(video_info_handler))
        .route("/api/download", post(download_handler))
        .route("/api/tiktok-info", post(tiktok_info_handler))
        .route("/api/tiktok-download", post(tiktok_download_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(config: &Config, media: MediaService) -> Result<()> {
    let app = build_router(AppState {
        media: Arc::new(media),
    });

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Server running on http://{}", addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
