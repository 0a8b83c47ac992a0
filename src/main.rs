//! Snapfind server binary.
//!
//! Wires configuration, the Qdrant-backed application state, and the HTTP
//! router, then serves until shutdown.

use std::net::SocketAddr;

use axum::extract::Request;
use axum::{Router, ServiceExt};
use tokio::net::TcpListener;
use tower::Layer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::normalize_path::NormalizePathLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use snapfind::{api, config, AppState, Result};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "snapfind=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = config::init();
    tracing::info!(
        "Starting Snapfind server on {}:{}",
        config.server.host,
        config.server.port
    );

    if config.embedding.api_key.is_empty() {
        tracing::error!("OPENAI_API_KEY not found in environment variables");
    }

    // The image root must exist before indexing or serving can work.
    tokio::fs::create_dir_all(&config.library.image_dir).await?;

    // Initialize application state (connects to Qdrant and verifies the
    // collection dimension - a mismatch is fatal here).
    let state = AppState::new().await?;
    tracing::info!("Application state initialized");

    // Build router
    let app = Router::new()
        .merge(api::routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Accept both /search and /search/ request forms.
    let app = NormalizePathLayer::trim_trailing_slash().layer(app);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .expect("Invalid address");

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app)).await?;

    Ok(())
}
