use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};

use super::{ObjectStore, ObjectStoreError};

/// Local filesystem object store. Payloads live at `<base_path>/<folder>/<filename>`.
pub struct LocalStore {
    base_path: PathBuf,
    public_path: String,
}

impl LocalStore {
    pub fn new<P: AsRef<Path>>(base_path: P, public_path: &str) -> Result<Self, std::io::Error> {
        let base_path = base_path.as_ref().to_path_buf();
        std::fs::create_dir_all(&base_path)?;
        Ok(Self {
            base_path,
            public_path: public_path.trim_end_matches('/').to_string(),
        })
    }

    fn object_path(&self, key: &str) -> PathBuf {
        self.base_path.join(key)
    }
}

#[async_trait]
impl ObjectStore for LocalStore {
    fn name(&self) -> &'static str {
        "local"
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{key}", self.public_path)
    }

    async fn put(&self, key: &str, data: Bytes, _content_type: &str) -> Result<(), ObjectStoreError> {
        let path = self.object_path(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, &data).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Bytes, ObjectStoreError> {
        let path = self.object_path(key);
        if !path.exists() {
            return Err(ObjectStoreError::NotFound(key.to_string()));
        }
        let data = tokio::fs::read(&path).await?;
        Ok(Bytes::from(data))
    }

    async fn relocate(&self, from: &str, to: &str, _content_type: &str) -> Result<(), ObjectStoreError> {
        let from_path = self.object_path(from);
        let to_path = self.object_path(to);
        if let Some(parent) = to_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        // Metadata stays authoritative when the payload has already drifted away
        if !from_path.exists() {
            tracing::debug!(from = %from, to = %to, "Source payload missing, skipping move");
            return Ok(());
        }

        tokio::fs::rename(&from_path, &to_path).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), ObjectStoreError> {
        let path = self.object_path(key);
        if path.exists() {
            tokio::fs::remove_file(&path).await?;
        }
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, ObjectStoreError> {
        let path = self.object_path(key);
        Ok(path.exists())
    }

    async fn delete_folder(&self, folder: &str) -> Result<(), ObjectStoreError> {
        let path = self.object_path(folder);
        if path.is_dir() {
            tokio::fs::remove_dir_all(&path).await?;
        }
        Ok(())
    }
}
