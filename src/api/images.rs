//! Image Routes
//!
//! Serves raw image bytes from the configured image root.
//!
//! Routes:
//! - GET /images/*path - fetch one image

use std::path::{Component, Path as FsPath, PathBuf};

use axum::{
    body::Body,
    extract::{Path, State},
    http::header,
    response::Response,
    routing::get,
    Router,
};

use crate::{AppState, Error, Result};

/// Build image routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/images/*path", get(serve_image))
}

/// Fetch one image by its path relative to the image root.
///
/// GET /images/{path}
///
/// The path may contain subdirectory segments but must stay inside the
/// image root; traversal segments are rejected before touching the
/// filesystem.
#[axum::debug_handler]
async fn serve_image(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Result<Response> {
    let relative = sanitize_request_path(&path)?;
    let full_path = state.image_root.join(&relative);

    let data = tokio::fs::read(&full_path)
        .await
        .map_err(|_| Error::FileNotFound(relative.display().to_string()))?;

    let content_type = mime_guess::from_path(&full_path).first_or_octet_stream();

    let response = Response::builder()
        .header(header::CONTENT_TYPE, content_type.as_ref())
        .header(header::CONTENT_LENGTH, data.len())
        .body(Body::from(data))
        .map_err(|e| Error::Internal(format!("Failed to build response: {}", e)))?;

    Ok(response)
}

/// Reject any component that could escape the image root.
fn sanitize_request_path(raw: &str) -> Result<PathBuf> {
    let mut clean = PathBuf::new();

    for component in FsPath::new(raw).components() {
        match component {
            Component::Normal(segment) => clean.push(segment),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(Error::Validation(format!("Invalid image path: {}", raw)));
            }
        }
    }

    if clean.as_os_str().is_empty() {
        return Err(Error::Validation("Image path cannot be empty".into()));
    }

    Ok(clean)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_and_nested_paths() {
        assert_eq!(
            sanitize_request_path("cat.jpg").unwrap(),
            PathBuf::from("cat.jpg")
        );
        assert_eq!(
            sanitize_request_path("memes/cat.jpg").unwrap(),
            PathBuf::from("memes/cat.jpg")
        );
        assert_eq!(
            sanitize_request_path("./memes/cat.jpg").unwrap(),
            PathBuf::from("memes/cat.jpg")
        );
    }

    #[test]
    fn rejects_parent_traversal() {
        assert!(sanitize_request_path("../secret.txt").is_err());
        assert!(sanitize_request_path("memes/../../secret.txt").is_err());
    }

    #[test]
    fn rejects_absolute_and_empty_paths() {
        assert!(sanitize_request_path("/etc/passwd").is_err());
        assert!(sanitize_request_path("").is_err());
        assert!(sanitize_request_path(".").is_err());
    }
}
