//! Indexing Routes
//!
//! Routes:
//! - POST /index-images - index images from the configured directory

use axum::{
    extract::{Query, State},
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use tracing::info;

use crate::services::IndexSummary;
use crate::{AppState, Result};

/// Build indexing routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/index-images", post(index_images))
}

#[derive(Debug, Deserialize)]
pub struct IndexParams {
    /// Restrict the run to one category (subdirectory of the image root).
    pub category: Option<String>,
}

/// Index images from the configured directory.
///
/// POST /index-images?category=...
///
/// Scans the image root (or the named category subdirectory), embeds each
/// filename, and appends the vectors to the store. Per-file failures are
/// counted in the summary instead of aborting the run.
#[axum::debug_handler]
async fn index_images(
    State(state): State<AppState>,
    Query(params): Query<IndexParams>,
) -> Result<Json<IndexSummary>> {
    info!(
        category = params.category.as_deref().unwrap_or("all"),
        "Starting image indexing"
    );

    let summary = state.indexer.index_images(params.category.as_deref()).await?;

    Ok(Json(summary))
}
