//! File-backed key-value store: one file per key

use super::KeyValueStore;
use crate::config::StorageConfig;
use crate::utils::safe_filename;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Stores each key as a file inside a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `dir`; the directory is created on first write
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Create a store in the configured directory, `~` expanded
    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(config.resolved_dir())
    }

    /// Storage directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn key_path(&self, key: &str) -> crate::Result<PathBuf> {
        if key.is_empty() || key == "." || key == ".." {
            return Err(crate::Error::Persistence(format!(
                "invalid storage key {:?}",
                key
            )));
        }
        Ok(self.dir.join(safe_filename(key)))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> crate::Result<Option<String>> {
        let path = self.key_path(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(crate::Error::Persistence(format!(
                "failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn set(&self, key: &str, value: &str) -> crate::Result<()> {
        let path = self.key_path(key)?;
        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            crate::Error::Persistence(format!("failed to create {}: {}", self.dir.display(), e))
        })?;

        // Write-then-rename keeps readers from seeing a half-written value.
        let tmp_path = self
            .dir
            .join(format!(".{}.{}.tmp", safe_filename(key), uuid::Uuid::new_v4()));
        if let Err(e) = tokio::fs::write(&tmp_path, value).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(crate::Error::Persistence(format!(
                "failed to write {}: {}",
                tmp_path.display(),
                e
            )));
        }
        if let Err(e) = tokio::fs::rename(&tmp_path, &path).await {
            warn!("Rename into {} failed, removing temp file", path.display());
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(crate::Error::Persistence(format!(
                "failed to replace {}: {}",
                path.display(),
                e
            )));
        }

        debug!("Stored {} bytes under {}", value.len(), key);
        Ok(())
    }

    async fn remove(&self, key: &str) -> crate::Result<()> {
        let path = self.key_path(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!("Removed {}", key);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(crate::Error::Persistence(format!(
                "failed to remove {}: {}",
                path.display(),
                e
            ))),
        }
    }
}
