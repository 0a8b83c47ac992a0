//! Configuration management for Snapfind.
//!
//! Loads configuration from environment variables (with `.env` support) once
//! at startup. The embedding dimension must match the configured model's
//! output length; disagreement with an existing collection is a deployment
//! error, not a runtime-recoverable one.

use std::env;
use std::sync::OnceLock;

use url::Url;

/// Global configuration instance
static CONFIG: OnceLock<Config> = OnceLock::new();

/// Get the global configuration
pub fn config() -> &'static Config {
    CONFIG.get_or_init(Config::from_env)
}

/// Initialize configuration (call once at startup)
pub fn init() -> &'static Config {
    config()
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub embedding: EmbeddingConfig,
    pub qdrant: QdrantConfig,
    pub library: LibraryConfig,
    pub indexing: IndexingConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Base URL used when mapping stored paths back to public image links.
    pub public_url: String,
}

#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    pub api_key: String,
    /// OpenAI-compatible API base; override for third-party endpoints.
    pub base_url: String,
    pub model: String,
    /// Must equal the model's output length.
    pub dimension: usize,
}

#[derive(Debug, Clone)]
pub struct QdrantConfig {
    pub url: String,
    pub collection: String,
}

#[derive(Debug, Clone)]
pub struct LibraryConfig {
    /// Root directory scanned for images and served under /images.
    pub image_dir: String,
}

#[derive(Debug, Clone)]
pub struct IndexingConfig {
    /// Maximum number of files to embed in parallel (default: 4)
    pub concurrency_limit: usize,
    /// Abort an indexing run on the first per-file failure (default: false)
    pub strict: bool,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let public_url = env_or("PUBLIC_URL", "http://localhost:8765");
        Url::parse(&public_url).expect("Invalid PUBLIC_URL");

        Self {
            server: ServerConfig {
                host: env_or("HOST", "0.0.0.0"),
                port: env_or("PORT", "8765").parse().expect("Invalid PORT"),
                public_url,
            },
            embedding: EmbeddingConfig {
                api_key: env::var("OPENAI_API_KEY").unwrap_or_default(),
                base_url: env_or("OPENAI_API_BASE_URL", "https://api.openai.com/v1"),
                model: env_or("OPENAI_EMBEDDING_MODEL", "text-embedding-3-small"),
                dimension: env_or("EMBEDDING_DIM", "1536")
                    .parse()
                    .expect("Invalid EMBEDDING_DIM"),
            },
            qdrant: QdrantConfig {
                url: env_or("QDRANT_URL", "http://localhost:6334"),
                collection: env_or("COLLECTION_NAME", "image_vectors"),
            },
            library: LibraryConfig {
                image_dir: env_or("IMAGE_DIR", "images"),
            },
            indexing: IndexingConfig {
                concurrency_limit: env_or("INDEXING_CONCURRENCY", "4").parse().unwrap_or(4),
                strict: env_or("INDEX_STRICT", "false").eq_ignore_ascii_case("true"),
            },
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}
