//! Search Routes
//!
//! Routes:
//! - GET /search - text-to-image semantic search

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::debug;

use crate::{AppState, Error, Result};

/// Upper bound on caller-supplied result counts.
const MAX_RESULTS: i64 = 100;

/// Build search routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/search", get(search))
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    /// Query text.
    pub q: String,

    /// Number of top matches to return.
    #[serde(default = "default_limit")]
    pub n: i64,

    /// Restrict matches to one category (subdirectory of the image root).
    pub category: Option<String>,

    /// When 1, respond with a single plain-text URL instead of a list.
    #[serde(default)]
    pub single: u8,
}

fn default_limit() -> i64 {
    5
}

/// Search for images by text query.
///
/// GET /search?q=...&n=5&category=...&single=0
///
/// Returns a JSON array of image URLs ordered by decreasing relevance. An
/// empty collection yields an empty array. With single=1 the response is a
/// plain-text body holding the single best URL, or 404 when nothing
/// matches.
#[axum::debug_handler]
async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Response> {
    if params.q.trim().is_empty() {
        return Err(Error::Validation("Query cannot be empty".into()));
    }
    if params.n < 1 || params.n > MAX_RESULTS {
        return Err(Error::Validation(format!(
            "Result count must be between 1 and {}",
            MAX_RESULTS
        )));
    }

    let single = params.single == 1;
    let limit = if single { 1 } else { params.n as usize };

    let hits = state
        .search
        .search(&params.q, limit, params.category.as_deref())
        .await?;

    let urls: Vec<String> = hits
        .iter()
        .map(|hit| image_url(&state.public_url, &hit.path))
        .collect();

    debug!(query = %params.q, results = urls.len(), "Returning search results");

    if single {
        let url = urls
            .into_iter()
            .next()
            .ok_or_else(|| Error::NotFound("No matching image found".into()))?;
        Ok(url.into_response())
    } else {
        Ok(Json(urls).into_response())
    }
}

/// Public URL for a stored image path, segment-encoded.
fn image_url(base: &str, path: &str) -> String {
    let encoded: Vec<String> = path
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect();

    format!("{}/images/{}", base, encoded.join("/"))
}
