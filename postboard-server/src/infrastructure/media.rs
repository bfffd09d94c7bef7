use std::path::PathBuf;

use async_trait::async_trait;
use tracing::{error, info};

use crate::domain::error::DomainError;

/// Where uploaded post images end up.
#[async_trait]
pub trait MediaStorage: Send + Sync {
    /// Stores `bytes` under `name` (relative, e.g. `posts/abc.gif`) and returns
    /// the reference to keep on the post.
    async fn save(&self, name: &str, bytes: &[u8]) -> Result<String, DomainError>;

    /// Removes a file written by `save`. Missing files are not an error.
    async fn delete(&self, name: &str) -> Result<(), DomainError>;
}

#[derive(Debug, Clone)]
pub struct FileSystemStorage {
    root: PathBuf,
}

impl FileSystemStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl MediaStorage for FileSystemStorage {
    async fn save(&self, name: &str, bytes: &[u8]) -> Result<String, DomainError> {
        let path = self.root.join(name);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                error!(path = %parent.display(), "failed to create media directory: {}", e);
                DomainError::Internal(format!("media storage error: {e}"))
            })?;
        }
        tokio::fs::write(&path, bytes).await.map_err(|e| {
            error!(path = %path.display(), "failed to store upload: {}", e);
            DomainError::Internal(format!("media storage error: {e}"))
        })?;

        info!(name, size = bytes.len(), "media file stored");
        Ok(name.to_string())
    }

    async fn delete(&self, name: &str) -> Result<(), DomainError> {
        let path = self.root.join(name);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                info!(name, "media file removed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => {
                error!(path = %path.display(), "failed to remove upload: {}", e);
                Err(DomainError::Internal(format!("media storage error: {e}")))
            }
        }
    }
}
