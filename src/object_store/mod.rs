mod blob;
mod local;

pub use blob::BlobStore;
pub use local::LocalStore;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ObjectStoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Object not found: {0}")]
    NotFound(String),
    #[error("Backend error: {0}")]
    Backend(String),
    #[error("Missing credential: {0}")]
    MissingCredential(String),
}

/// Abstraction over payload storage backends.
/// Keys are `<folder>/<filename>`; the public URL of a key is a pure function of the key.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    fn name(&self) -> &'static str;
    fn public_url(&self, key: &str) -> String;
    async fn put(&self, key: &str, data: Bytes, content_type: &str)
        -> Result<(), ObjectStoreError>;
    async fn get(&self, key: &str) -> Result<Bytes, ObjectStoreError>;
    /// Move a payload to a new key. The old key is only dropped once the new one exists.
    async fn relocate(&self, from: &str, to: &str, content_type: &str)
        -> Result<(), ObjectStoreError>;
    async fn delete(&self, key: &str) -> Result<(), ObjectStoreError>;
    async fn exists(&self, key: &str) -> Result<bool, ObjectStoreError>;

    /// Fails when the backend could not accept any write, before any I/O.
    fn ensure_writable(&self) -> Result<(), ObjectStoreError> {
        Ok(())
    }

    /// Remove whatever container the backend keeps for a folder.
    async fn delete_folder(&self, _folder: &str) -> Result<(), ObjectStoreError> {
        Ok(())
    }
}
