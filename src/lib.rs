//! Snapfind - Text-to-Image Semantic Search
//!
//! Indexes images by filename-derived text, embeds that text via a remote
//! embedding API, stores the vectors in Qdrant, and serves top-K search
//! plus static image access over HTTP.

pub mod api;
pub mod config;
pub mod error;
pub mod services;
pub mod state;

pub use config::config;
pub use error::{Error, Result};
pub use state::AppState;
