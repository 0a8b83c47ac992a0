//! Shared test doubles: a deterministic stub embedder and an in-memory
//! vector store with cosine ranking.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use snapfind::services::{Embedder, VectorHit, VectorStore};
use snapfind::{Error, Result};

/// Embedder that buckets words onto fixed slots, so texts sharing a word
/// land close together without any network call.
pub struct StubEmbedder {
    pub dimension: usize,
}

#[async_trait]
impl Embedder for StubEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(keyword_vector(text, self.dimension))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Embedder that fails for texts containing a marker word, for exercising
/// the per-file failure policy.
pub struct FailingEmbedder {
    pub inner: StubEmbedder,
    pub fail_on: String,
}

#[async_trait]
impl Embedder for FailingEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text.contains(&self.fail_on) {
            return Err(Error::Embedding(format!("stub failure for '{}'", text)));
        }
        self.inner.embed(text).await
    }

    fn dimension(&self) -> usize {
        self.inner.dimension()
    }
}

/// Deterministic word-bucket embedding, unit-normalized.
pub fn keyword_vector(text: &str, dimension: usize) -> Vec<f32> {
    let mut vector = vec![0.0f32; dimension];

    for word in text.to_lowercase().split_whitespace() {
        let mut slot = 0usize;
        for byte in word.bytes() {
            slot = (slot * 31 + byte as usize) % dimension;
        }
        vector[slot] += 1.0;
    }

    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in &mut vector {
            *v /= norm;
        }
    }

    vector
}

struct StoredPoint {
    path: String,
    category: Option<String>,
    vector: Vec<f32>,
}

/// In-memory stand-in for the Qdrant collection: append-only points,
/// cosine-ranked search, category match filter.
#[derive(Default)]
pub struct MemoryStore {
    points: RwLock<Vec<StoredPoint>>,
    dimension: RwLock<Option<usize>>,
}

impl MemoryStore {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

#[async_trait]
impl VectorStore for MemoryStore {
    async fn ensure_collection(&self, dimension: usize) -> Result<()> {
        let mut existing = self.dimension.write().await;
        match *existing {
            Some(current) if current != dimension => Err(Error::DimensionMismatch {
                expected: dimension,
                actual: current,
            }),
            _ => {
                *existing = Some(dimension);
                Ok(())
            }
        }
    }

    async fn insert(&self, path: &str, category: Option<&str>, vector: Vec<f32>) -> Result<()> {
        self.points.write().await.push(StoredPoint {
            path: path.to_string(),
            category: category.map(str::to_string),
            vector,
        });
        Ok(())
    }

    async fn search(
        &self,
        vector: Vec<f32>,
        limit: usize,
        category: Option<&str>,
    ) -> Result<Vec<VectorHit>> {
        let points = self.points.read().await;

        let mut hits: Vec<VectorHit> = points
            .iter()
            .filter(|point| match category {
                Some(cat) => point.category.as_deref() == Some(cat),
                None => true,
            })
            .map(|point| VectorHit {
                path: point.path.clone(),
                score: cosine(&point.vector, &vector),
            })
            .collect();

        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(limit);

        Ok(hits)
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.points.read().await.len() as u64)
    }
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
