//! Indexing workflow for the image library.
//!
//! Walks the image root (or one category subdirectory), derives embedding
//! text from each filename, and appends (vector, path) records to the
//! store. Individual file failures are counted and skipped unless strict
//! mode is enabled. Re-running re-scans from scratch and only appends;
//! nothing is ever removed.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use tokio::fs;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::services::{Embedder, VectorStore};

/// File extensions treated as images
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp"];

/// Result of an indexing run.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct IndexSummary {
    /// Image files found under the scan root.
    pub scanned: usize,
    /// Files embedded and inserted.
    pub indexed: usize,
    /// Files that failed to embed or insert.
    pub failed: usize,
    /// Points in the collection after the run.
    pub total_in_collection: u64,
    pub duration_seconds: f64,
}

/// Service for indexing the image directory into the vector store.
#[derive(Clone)]
pub struct IndexerService {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    image_root: PathBuf,
    concurrency_limit: usize,
    strict: bool,
}

impl IndexerService {
    /// Create a new indexer service.
    pub fn new(
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
        image_root: PathBuf,
        concurrency_limit: usize,
    ) -> Self {
        Self {
            embedder,
            store,
            image_root,
            concurrency_limit: concurrency_limit.max(1),
            strict: false,
        }
    }

    /// Abort a run on the first per-file failure instead of continuing.
    pub fn with_strict_mode(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Index every image under the configured root, or under one category
    /// subdirectory.
    ///
    /// Each file is independent: processing order is unspecified and a
    /// partial run leaves previously inserted records in place.
    pub async fn index_images(&self, category: Option<&str>) -> Result<IndexSummary> {
        let scan_root = match category {
            Some(raw) => {
                let cat = sanitize_category(raw)?;
                let dir = self.image_root.join(&cat);
                if !dir.is_dir() {
                    return Err(Error::NotFound(format!(
                        "Category directory '{}' not found",
                        cat
                    )));
                }
                dir
            }
            None => self.image_root.clone(),
        };

        let start_time = Utc::now();

        let mut files = Vec::new();
        collect_image_files(&scan_root, &mut files).await?;

        info!(
            root = %scan_root.display(),
            files = files.len(),
            "Found image files to index"
        );

        let scanned = files.len();
        let mut indexed = 0usize;
        let mut failed = 0usize;

        let mut outcomes = stream::iter(files)
            .map(|path| {
                let service = self;
                async move {
                    let result = service.index_file(&path).await;
                    (path, result)
                }
            })
            .buffer_unordered(self.concurrency_limit);

        while let Some((path, result)) = outcomes.next().await {
            match result {
                Ok(()) => indexed += 1,
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "Failed to index image");
                    if self.strict {
                        return Err(e);
                    }
                    failed += 1;
                }
            }
        }

        let total_in_collection = self.store.count().await?;
        let duration_seconds =
            (Utc::now() - start_time).num_milliseconds() as f64 / 1000.0;

        info!(
            scanned,
            indexed,
            failed,
            total = total_in_collection,
            duration_s = duration_seconds,
            "Indexing completed"
        );

        Ok(IndexSummary {
            scanned,
            indexed,
            failed,
            total_in_collection,
            duration_seconds,
        })
    }

    /// Embed one file's name and insert the record.
    async fn index_file(&self, path: &Path) -> Result<()> {
        let relative = path.strip_prefix(&self.image_root).map_err(|_| {
            Error::Internal(format!(
                "File {} is outside the image root",
                path.display()
            ))
        })?;

        let stored_path = relative_path_string(relative);
        let text = embedding_text(relative)?;
        let vector = self.embedder.embed(&text).await?;
        let category = category_segment(relative);

        self.store
            .insert(&stored_path, category.as_deref(), vector)
            .await?;

        debug!(file = %stored_path, "Indexed image");

        Ok(())
    }
}

/// Recursively collect image files under a directory.
async fn collect_image_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    let mut entries = fs::read_dir(dir).await.map_err(|e| {
        Error::Internal(format!("Failed to read directory {}: {}", dir.display(), e))
    })?;

    while let Some(entry) = entries.next_entry().await.map_err(|e| {
        Error::Internal(format!("Failed to read directory {}: {}", dir.display(), e))
    })? {
        let path = entry.path();
        let file_type = entry.file_type().await.map_err(|e| {
            Error::Internal(format!("Failed to stat {}: {}", path.display(), e))
        })?;

        if file_type.is_dir() {
            Box::pin(collect_image_files(&path, files)).await?;
        } else if is_image_file(&path) {
            files.push(path);
        }
    }

    Ok(())
}

/// Whether a path carries a known image extension (case-insensitive).
fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| IMAGE_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
        .unwrap_or(false)
}

/// Text embedded for a file: the stem with `_` and `-` turned into spaces.
fn embedding_text(relative: &Path) -> Result<String> {
    let stem = relative
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| {
            Error::Validation(format!("Unreadable file name: {}", relative.display()))
        })?;

    Ok(stem.replace(['_', '-'], " "))
}

/// Relative path in stored form: forward slashes on every platform.
fn relative_path_string(relative: &Path) -> String {
    relative
        .iter()
        .filter_map(|c| c.to_str())
        .collect::<Vec<_>>()
        .join("/")
}

/// First path segment when the file sits inside a subdirectory.
fn category_segment(relative: &Path) -> Option<String> {
    let mut parts = relative.iter();
    let first = parts.next()?.to_str()?.to_string();
    parts.next().map(|_| first)
}

/// Validate a caller-supplied category name. Anything that could resolve
/// outside the image root is rejected.
fn sanitize_category(raw: &str) -> Result<String> {
    let trimmed = raw.trim_matches(|c| c == '/' || c == '\\');
    if trimmed.is_empty() {
        return Err(Error::Validation("Category must be non-empty".into()));
    }

    for component in Path::new(trimmed).components() {
        match component {
            Component::Normal(_) => {}
            _ => {
                return Err(Error::Validation(format!("Invalid category: {}", raw)));
            }
        }
    }

    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("cat_meme.jpg", true)]
    #[case("photo.JPEG", true)]
    #[case("art.Png", true)]
    #[case("clip.gif", true)]
    #[case("scan.bmp", true)]
    #[case("notes.txt", false)]
    #[case("archive.tar.gz", false)]
    #[case("no_extension", false)]
    fn image_extension_filter(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(is_image_file(Path::new(name)), expected);
    }

    #[rstest]
    #[case("cat_meme.jpg", "cat meme")]
    #[case("grumpy-cat.png", "grumpy cat")]
    #[case("memes/dog_meme.jpg", "dog meme")]
    #[case("plain.gif", "plain")]
    fn filename_to_embedding_text(#[case] path: &str, #[case] expected: &str) {
        assert_eq!(embedding_text(Path::new(path)).unwrap(), expected);
    }

    #[test]
    fn category_only_for_nested_files() {
        assert_eq!(
            category_segment(Path::new("memes/cat.jpg")),
            Some("memes".to_string())
        );
        assert_eq!(
            category_segment(Path::new("memes/funny/cat.jpg")),
            Some("memes".to_string())
        );
        assert_eq!(category_segment(Path::new("cat.jpg")), None);
    }

    #[test]
    fn category_validation() {
        assert_eq!(sanitize_category("memes").unwrap(), "memes");
        assert_eq!(sanitize_category("/memes/").unwrap(), "memes");
        assert_eq!(sanitize_category("memes/funny").unwrap(), "memes/funny");
        assert!(sanitize_category("../secrets").is_err());
        assert!(sanitize_category("a/../b").is_err());
        assert!(sanitize_category("").is_err());
    }
}
