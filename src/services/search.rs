//! Search workflow: query text to ranked image paths.
//!
//! Embeds the query, asks the store for the nearest stored vectors, and
//! returns hits best-first. An empty result set is a valid answer, not an
//! error.

use std::sync::Arc;

use tracing::debug;

use crate::error::{Error, Result};
use crate::services::{Embedder, VectorHit, VectorStore};

/// Service for text-to-image similarity search.
#[derive(Clone)]
pub struct SearchService {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
}

impl SearchService {
    /// Create a new search service.
    pub fn new(embedder: Arc<dyn Embedder>, store: Arc<dyn VectorStore>) -> Self {
        Self { embedder, store }
    }

    /// Top-`limit` stored images for a text query, optionally restricted to
    /// one category.
    pub async fn search(
        &self,
        query: &str,
        limit: usize,
        category: Option<&str>,
    ) -> Result<Vec<VectorHit>> {
        if query.trim().is_empty() {
            return Err(Error::Validation("Query cannot be empty".into()));
        }
        if limit == 0 {
            return Err(Error::Validation(
                "Result count must be at least 1".into(),
            ));
        }

        let vector = self.embedder.embed(query).await?;
        let hits = self.store.search(vector, limit, category).await?;

        debug!(query, hits = hits.len(), "Search completed");

        Ok(hits)
    }
}
