//! Error types for Snapfind.
//!
//! Uses thiserror for ergonomic error definitions that integrate
//! with axum's response system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    // Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    // Resource errors
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    // External service errors
    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Vector store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    // Generic errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400
            Self::Validation(_) => StatusCode::BAD_REQUEST,

            // 404
            Self::NotFound(_) | Self::FileNotFound(_) => StatusCode::NOT_FOUND,

            // 502
            Self::Embedding(_) => StatusCode::BAD_GATEWAY,

            // 503
            Self::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,

            // 500
            Self::DimensionMismatch { .. } | Self::Internal(_) | Self::Other(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::FileNotFound(_) => "FILE_NOT_FOUND",
            Self::Embedding(_) => "EMBEDDING_ERROR",
            Self::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            Self::DimensionMismatch { .. } => "DIMENSION_MISMATCH",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Other(_) => "UNKNOWN_ERROR",
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();
        let message = self.to_string();

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

// Convenience conversions
impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("JSON error: {}", err))
    }
}
