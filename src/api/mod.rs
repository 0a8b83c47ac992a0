//! API Routes for Snapfind
//!
//! This module combines all API routes into a single router.
//!
//! Route structure:
//! - POST /index-images - trigger an indexing run over the image directory
//! - GET /search - text-to-image semantic search
//! - GET /images/*path - static image serving scoped to the image root
//! - /health, /status - health checks (public)

mod images;
mod indexing;
mod search;
pub mod status;

use axum::Router;

use crate::AppState;

/// Build the complete API router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(status::routes())
        .merge(indexing::routes())
        .merge(search::routes())
        .merge(images::routes())
}
