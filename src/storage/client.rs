use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;

use crate::error::AppError;

/// Trait for blob storage operations.
///
/// Abstracted as a trait so tests can use an in-memory store.
#[async_trait]
pub trait StorageClient: Send + Sync {
    /// Store content under the given key, replacing any previous object.
    async fn put_object(&self, key: &str, content: Vec<u8>) -> Result<(), AppError>;
}

/// StorageClient writing each object as a file in a local directory.
pub struct LocalStorageClient {
    root: PathBuf,
}

impl LocalStorageClient {
    /// Create a client rooted at `root`, creating the directory if needed.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, AppError> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|e| {
            AppError::Storage(format!(
                "Failed to create upload root '{}': {}",
                root.display(),
                e
            ))
        })?;
        Ok(Self { root })
    }

    /// Keys are flat file names; anything with separators or dot segments is
    /// refused.
    fn object_path(&self, key: &str) -> Result<PathBuf, AppError> {
        let mut components = Path::new(key).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) if !key.contains('/') => Ok(self.root.join(key)),
            _ => Err(AppError::InvalidPath(format!("Invalid object key '{key}'"))),
        }
    }
}

#[async_trait]
impl StorageClient for LocalStorageClient {
    async fn put_object(&self, key: &str, content: Vec<u8>) -> Result<(), AppError> {
        let path = self.object_path(key)?;
        let tmp_path = self
            .root
            .join(format!(".{}.{}.tmp", key, uuid::Uuid::new_v4().simple()));

        tokio::fs::write(&tmp_path, content)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to put object '{}': {}", key, e)))?;

        if let Err(e) = tokio::fs::rename(&tmp_path, &path).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(AppError::Storage(format!(
                "Failed to put object '{}': {}",
                key, e
            )));
        }

        Ok(())
    }
}
