//! Filesystem-backed blob store.
//!
//! Upload records point at objects below a configured root directory.
//! Deletion is the only operation the engine needs: when an upload record
//! is deleted, the backing object goes with it.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use headcount_core::{BlobStore, StoreError};
use tracing::debug;

/// Blob store rooted at a local directory.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    /// Create a blob store rooted at `root`. The directory does not have
    /// to exist yet; deletes against a missing tree are no-ops.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve a record path below the root, rejecting anything that
    /// would escape it.
    fn resolve(&self, path: &str) -> Result<PathBuf, StoreError> {
        let relative = Path::new(path);
        let escapes = relative.components().any(|component| {
            !matches!(component, Component::Normal(_) | Component::CurDir)
        });
        if escapes || relative.as_os_str().is_empty() {
            return Err(StoreError::Backend(format!(
                "blob path escapes the store root: {path}"
            )));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn delete(&self, path: &str) -> Result<(), StoreError> {
        let target = self.resolve(path)?;
        match tokio::fs::remove_file(&target).await {
            Ok(()) => {
                debug!(path, "blob deleted");
                Ok(())
            }
            // Already gone: deletion is idempotent.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path, "blob already absent");
                Ok(())
            }
            Err(e) => Err(StoreError::Backend(format!(
                "failed to delete blob {path}: {e}"
            ))),
        }
    }
}
