//! Upload, relocation and deletion of stored files.

mod error;
pub mod naming;
mod relocate;
mod upload;

pub use error::FileError;
pub use relocate::{FolderRemoval, RelocateRequest, RelocationCoordinator};
pub use upload::{UploadCoordinator, UploadRequest};

use std::sync::Arc;

use crate::config::UploadConfig;
use crate::object_store::ObjectStore;
use crate::storage::{FileRecord, MetadataStore};

/// Both coordinators over one index and one backend.
pub struct FileService {
    pub store: Arc<MetadataStore>,
    pub objects: Arc<dyn ObjectStore>,
    pub uploads: UploadCoordinator,
    pub relocation: RelocationCoordinator,
}

impl FileService {
    pub fn new(store: Arc<MetadataStore>, objects: Arc<dyn ObjectStore>, policy: UploadConfig) -> Self {
        Self {
            uploads: UploadCoordinator::new(Arc::clone(&store), Arc::clone(&objects), policy),
            relocation: RelocationCoordinator::new(Arc::clone(&store), Arc::clone(&objects)),
            store,
            objects,
        }
    }

    pub fn list(&self) -> Vec<FileRecord> {
        self.store.get_all()
    }

    /// Records in a folder. The folder name is normalized like an upload's.
    pub fn get_by_folder(&self, folder: &str) -> Vec<FileRecord> {
        self.store
            .find_by_folder(&naming::normalize_folder(Some(folder)))
    }

    pub fn get_by_id(&self, id: &str) -> Result<FileRecord, FileError> {
        self.store
            .find_by_id(id)
            .ok_or_else(|| FileError::file_not_found(id))
    }
}
