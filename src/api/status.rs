//! Status Routes
//!
//! Health checks and collection status.
//!
//! Routes:
//! - GET /health - basic health check
//! - GET /status - collection and configuration summary

use axum::{extract::State, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{AppState, Result};

/// Build status routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/status", get(system_status))
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub timestamp: DateTime<Utc>,
}

/// System status response.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub image_root: String,
    pub dimension: usize,
    pub points_count: u64,
}

/// Basic health check.
///
/// GET /health
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: Utc::now(),
    })
}

/// Collection and configuration summary.
///
/// GET /status
#[axum::debug_handler]
async fn system_status(State(state): State<AppState>) -> Result<Json<StatusResponse>> {
    let points_count = state.store.count().await?;

    Ok(Json(StatusResponse {
        image_root: state.image_root.display().to_string(),
        dimension: state.dimension,
        points_count,
    }))
}
