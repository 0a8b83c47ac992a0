//! Qdrant adapter for the image vector collection.
//!
//! One collection holds (vector, file_path, category) points for a single
//! configured dimension. The collection dimension is fixed at deployment
//! time; a mismatch against an existing collection is fatal rather than
//! recoverable.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use qdrant_client::qdrant::{
    condition::ConditionOneOf, r#match::MatchValue, value::Kind, Condition,
    CreateCollectionBuilder, Distance, FieldCondition, Filter, Match, PointStruct, ScoredPoint,
    SearchPointsBuilder, UpsertPointsBuilder, Value as QdrantValue, VectorParamsBuilder,
};
use qdrant_client::Qdrant;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::QdrantConfig;
use crate::error::{Error, Result};

/// Payload key for the image path relative to the image root.
const KEY_FILE_PATH: &str = "file_path";
/// Payload key for the top-level category segment of that path.
const KEY_CATEGORY: &str = "category";

/// One similarity hit from the store, best-first when returned in a list.
#[derive(Debug, Clone)]
pub struct VectorHit {
    pub path: String,
    pub score: f32,
}

/// Capability seam for vector storage, so workflows can run against an
/// in-memory double in tests.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Create the collection if absent; verify its dimension if present.
    async fn ensure_collection(&self, dimension: usize) -> Result<()>;

    /// Append one (path, vector) record. Duplicate paths are accepted;
    /// re-indexing the same file adds a second point.
    async fn insert(&self, path: &str, category: Option<&str>, vector: Vec<f32>) -> Result<()>;

    /// Up to `limit` hits by descending similarity, optionally restricted
    /// to one category.
    async fn search(
        &self,
        vector: Vec<f32>,
        limit: usize,
        category: Option<&str>,
    ) -> Result<Vec<VectorHit>>;

    /// Total number of stored points.
    async fn count(&self) -> Result<u64>;
}

/// Vector storage backed by a Qdrant collection.
#[derive(Clone)]
pub struct QdrantService {
    inner: Arc<QdrantServiceInner>,
}

struct QdrantServiceInner {
    client: Qdrant,
    collection: String,
}

impl QdrantService {
    /// Connect to Qdrant and probe the connection.
    pub async fn new(config: &QdrantConfig) -> Result<Self> {
        let client = Qdrant::from_url(&config.url)
            .build()
            .map_err(|e| Error::StoreUnavailable(format!("Failed to connect to Qdrant: {}", e)))?;

        // Test connection
        client
            .list_collections()
            .await
            .map_err(|e| Error::StoreUnavailable(format!("Qdrant connection test failed: {}", e)))?;

        info!(url = %config.url, collection = %config.collection, "Qdrant service connected");

        Ok(Self {
            inner: Arc::new(QdrantServiceInner {
                client,
                collection: config.collection.clone(),
            }),
        })
    }

    /// Vector size of the existing collection, if it can be determined.
    async fn existing_dimension(&self) -> Result<usize> {
        let info = self
            .inner
            .client
            .collection_info(&self.inner.collection)
            .await
            .map_err(|e| Error::StoreUnavailable(format!("Failed to get collection info: {}", e)))?;

        Ok(info
            .result
            .as_ref()
            .and_then(|r| r.config.as_ref())
            .and_then(|c| c.params.as_ref())
            .and_then(|p| p.vectors_config.as_ref())
            .and_then(|vc| match vc.config.as_ref() {
                Some(qdrant_client::qdrant::vectors_config::Config::Params(params)) => {
                    Some(params.size as usize)
                }
                _ => None,
            })
            .unwrap_or(0))
    }
}

#[async_trait]
impl VectorStore for QdrantService {
    async fn ensure_collection(&self, dimension: usize) -> Result<()> {
        let exists = self
            .inner
            .client
            .collection_exists(&self.inner.collection)
            .await
            .map_err(|e| Error::StoreUnavailable(format!("Failed to check collection: {}", e)))?;

        if exists {
            let existing = self.existing_dimension().await?;
            if existing != dimension {
                return Err(Error::DimensionMismatch {
                    expected: dimension,
                    actual: existing,
                });
            }
            debug!(collection = %self.inner.collection, dimension, "Collection already exists");
            return Ok(());
        }

        self.inner
            .client
            .create_collection(
                CreateCollectionBuilder::new(&self.inner.collection)
                    .vectors_config(VectorParamsBuilder::new(dimension as u64, Distance::Cosine)),
            )
            .await
            .map_err(|e| Error::StoreUnavailable(format!("Failed to create collection: {}", e)))?;

        info!(collection = %self.inner.collection, dimension, "Created Qdrant collection");

        Ok(())
    }

    async fn insert(&self, path: &str, category: Option<&str>, vector: Vec<f32>) -> Result<()> {
        let mut payload: HashMap<String, QdrantValue> = HashMap::new();
        payload.insert(KEY_FILE_PATH.to_string(), QdrantValue::from(path.to_string()));
        if let Some(cat) = category {
            payload.insert(KEY_CATEGORY.to_string(), QdrantValue::from(cat.to_string()));
        }

        let point = PointStruct::new(Uuid::new_v4().to_string(), vector, payload);

        self.inner
            .client
            .upsert_points(UpsertPointsBuilder::new(&self.inner.collection, vec![point]))
            .await
            .map_err(|e| Error::StoreUnavailable(format!("Failed to upsert point: {}", e)))?;

        debug!(collection = %self.inner.collection, path, "Inserted image vector");

        Ok(())
    }

    async fn search(
        &self,
        vector: Vec<f32>,
        limit: usize,
        category: Option<&str>,
    ) -> Result<Vec<VectorHit>> {
        let mut builder =
            SearchPointsBuilder::new(&self.inner.collection, vector, limit as u64)
                .with_payload(true);

        if let Some(cat) = category {
            builder = builder.filter(Filter {
                must: vec![make_match_condition(KEY_CATEGORY, cat)],
                ..Default::default()
            });
        }

        let response = self
            .inner
            .client
            .search_points(builder)
            .await
            .map_err(|e| Error::StoreUnavailable(format!("Search failed: {}", e)))?;

        Ok(response
            .result
            .into_iter()
            .filter_map(scored_point_to_hit)
            .collect())
    }

    async fn count(&self) -> Result<u64> {
        let info = self
            .inner
            .client
            .collection_info(&self.inner.collection)
            .await
            .map_err(|e| Error::StoreUnavailable(format!("Failed to get collection info: {}", e)))?;

        Ok(info.result.and_then(|r| r.points_count).unwrap_or(0))
    }
}

/// Create a match condition for a payload field
fn make_match_condition(key: &str, value: &str) -> Condition {
    Condition {
        condition_one_of: Some(ConditionOneOf::Field(FieldCondition {
            key: key.to_string(),
            r#match: Some(Match {
                match_value: Some(MatchValue::Keyword(value.to_string())),
            }),
            ..Default::default()
        })),
    }
}

/// Convert a scored point to a hit; points without a file_path payload
/// are dropped.
fn scored_point_to_hit(point: ScoredPoint) -> Option<VectorHit> {
    let path = point.payload.get(KEY_FILE_PATH).and_then(|v| match &v.kind {
        Some(Kind::StringValue(s)) => Some(s.clone()),
        _ => None,
    })?;

    Some(VectorHit {
        path,
        score: point.score,
    })
}
