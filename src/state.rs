//! Application state for Snapfind.
//!
//! Contains the shared state that is passed to all handlers.

use std::path::PathBuf;
use std::sync::Arc;

use crate::services::{
    Embedder, EmbeddingService, IndexerService, QdrantService, SearchService, VectorStore,
};
use crate::{config, Result};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Vector store holding the image index.
    pub store: Arc<dyn VectorStore>,
    /// Indexing workflow.
    pub indexer: IndexerService,
    /// Search workflow.
    pub search: SearchService,
    /// Root directory served under /images.
    pub image_root: PathBuf,
    /// Base URL for links returned by search, without a trailing slash.
    pub public_url: String,
    /// Configured embedding dimension.
    pub dimension: usize,
}

impl AppState {
    /// Create a new application state, initializing all services.
    ///
    /// Connects to Qdrant and ensures the collection; a dimension mismatch
    /// against an existing collection fails startup.
    pub async fn new() -> Result<Self> {
        let config = config::config();

        let embedder: Arc<dyn Embedder> = Arc::new(EmbeddingService::new(&config.embedding)?);
        let store: Arc<dyn VectorStore> = Arc::new(QdrantService::new(&config.qdrant).await?);

        store.ensure_collection(config.embedding.dimension).await?;

        Ok(Self::from_parts(
            embedder,
            store,
            PathBuf::from(&config.library.image_dir),
            config.server.public_url.clone(),
            config.embedding.dimension,
            config.indexing.concurrency_limit,
            config.indexing.strict,
        ))
    }

    /// Wire state from already-built services. Tests use this to substitute
    /// an in-memory store and a stub embedder.
    pub fn from_parts(
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
        image_root: PathBuf,
        public_url: String,
        dimension: usize,
        concurrency_limit: usize,
        strict: bool,
    ) -> Self {
        let indexer = IndexerService::new(
            embedder.clone(),
            store.clone(),
            image_root.clone(),
            concurrency_limit,
        )
        .with_strict_mode(strict);
        let search = SearchService::new(embedder, store.clone());

        Self {
            store,
            indexer,
            search,
            image_root,
            public_url: public_url.trim_end_matches('/').to_string(),
            dimension,
        }
    }
}
