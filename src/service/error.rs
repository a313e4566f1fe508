use thiserror::Error;

use crate::object_store::ObjectStoreError;
use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum FileError {
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Configuration fault: {0}")]
    Configuration(String),
    #[error("Storage fault: {0}")]
    Storage(String),
}

impl FileError {
    pub fn file_not_found(id: &str) -> Self {
        FileError::NotFound(format!("file '{id}' not found"))
    }

    pub fn too_large(max_upload_size: u64) -> Self {
        FileError::InvalidPayload(format!(
            "file exceeds maximum upload size of {max_upload_size} bytes"
        ))
    }
}

impl From<ObjectStoreError> for FileError {
    fn from(e: ObjectStoreError) -> Self {
        match e {
            ObjectStoreError::MissingCredential(msg) => FileError::Configuration(msg),
            e => FileError::Storage(e.to_string()),
        }
    }
}

impl From<StorageError> for FileError {
    fn from(e: StorageError) -> Self {
        FileError::Storage(e.to_string())
    }
}
