//! Embedding client for OpenAI-compatible APIs.
//!
//! Converts query and filename text into fixed-dimension vectors via the
//! remote `/embeddings` endpoint. Transient failures are retried with a
//! doubling delay before the call fails.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::EmbeddingConfig;
use crate::error::{Error, Result};

/// Maximum attempts per text before failing
const MAX_RETRIES: u32 = 2;

/// Delay between retries (doubles each time)
const RETRY_DELAY_MS: u64 = 500;

/// Request timeout for the embedding API
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Capability seam for embedding generation, so workflows can run against
/// a stub in tests.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a single non-empty text into a vector of `dimension()` floats.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Length every returned vector must have.
    fn dimension(&self) -> usize;
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    data: Option<Vec<EmbedData>>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct EmbedData {
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

/// Client for a remote OpenAI-compatible text embedding API.
#[derive(Clone)]
pub struct EmbeddingService {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
    dimension: usize,
}

impl EmbeddingService {
    /// Create a new embedding client from configuration.
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
            dimension: config.dimension,
        })
    }

    async fn request_embedding(&self, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/embeddings", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&json!({ "input": [text], "model": self.model }))
            .send()
            .await
            .map_err(|e| Error::Embedding(format!("Embedding request failed: {}", e)))?;

        let status = response.status();
        let body: EmbedResponse = response
            .json()
            .await
            .map_err(|e| Error::Embedding(format!("Invalid embedding response: {}", e)))?;

        if let Some(err) = body.error {
            return Err(Error::Embedding(format!(
                "Embedding API error ({}): {}",
                status, err.message
            )));
        }

        body.data
            .and_then(|mut data| {
                if data.is_empty() {
                    None
                } else {
                    Some(data.remove(0).embedding)
                }
            })
            .ok_or_else(|| Error::Embedding(format!("Embedding API returned no data ({})", status)))
    }
}

#[async_trait]
impl Embedder for EmbeddingService {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text.trim().is_empty() {
            return Err(Error::Validation(
                "Embedding input must be a non-empty string".into(),
            ));
        }
        if self.api_key.is_empty() {
            return Err(Error::Embedding(
                "Embedding API key is not configured".into(),
            ));
        }

        let mut delay = RETRY_DELAY_MS;
        let mut last_error = None;

        for attempt in 0..=MAX_RETRIES {
            if attempt > 0 {
                sleep(Duration::from_millis(delay)).await;
                delay *= 2;
            }

            match self.request_embedding(text).await {
                Ok(vector) => {
                    if vector.len() != self.dimension {
                        return Err(Error::DimensionMismatch {
                            expected: self.dimension,
                            actual: vector.len(),
                        });
                    }
                    debug!(model = %self.model, chars = text.len(), "Generated embedding");
                    return Ok(vector);
                }
                Err(e) => {
                    warn!(attempt, error = %e, "Embedding request failed");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| Error::Embedding("All embedding attempts failed".into())))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
