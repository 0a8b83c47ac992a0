//! Service layer for Snapfind.
//!
//! Contains the external service integrations and the workflows they power:
//! - Embeddings (remote OpenAI-compatible embedding API)
//! - Qdrant (vector storage)
//! - Indexer (image directory -> vector store)
//! - Search (query text -> ranked image paths)

mod embeddings;
mod indexer;
mod qdrant;
mod search;

pub use embeddings::{Embedder, EmbeddingService};
pub use indexer::{IndexSummary, IndexerService};
pub use qdrant::{QdrantService, VectorHit, VectorStore};
pub use search::SearchService;
