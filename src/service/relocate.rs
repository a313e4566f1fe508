use std::collections::BTreeSet;
use std::sync::Arc;

use super::naming::normalize_folder;
use super::FileError;
use crate::object_store::ObjectStore;
use crate::storage::models::object_key;
use crate::storage::{FilePatch, FileRecord, MetadataStore};

#[derive(Debug, Clone, Default)]
pub struct RelocateRequest {
    pub folder: Option<String>,
    pub description: Option<String>,
}

/// Records removed by a folder deletion
#[derive(Debug, Clone)]
pub struct FolderRemoval {
    pub folder: String,
    pub files: Vec<FileRecord>,
}

/// Moves payloads between folders and deletes them, keeping the index and
/// the backend in agreement.
///
/// Metadata only moves after the payload did. Deletions drop metadata first and
/// then try once to remove the payload; a failed payload removal is logged and
/// never fails the call. Folder and bulk deletions also proceed on a backend
/// without write access, leaving the payloads behind.
pub struct RelocationCoordinator {
    store: Arc<MetadataStore>,
    objects: Arc<dyn ObjectStore>,
}

impl RelocationCoordinator {
    pub fn new(store: Arc<MetadataStore>, objects: Arc<dyn ObjectStore>) -> Self {
        Self { store, objects }
    }

    pub async fn relocate(&self, id: &str, request: RelocateRequest) -> Result<FileRecord, FileError> {
        let file = self
            .store
            .find_by_id(id)
            .ok_or_else(|| FileError::file_not_found(id))?;

        let next_folder = match request.folder.as_deref() {
            Some(requested) => normalize_folder(Some(requested)),
            None => file.folder.clone(),
        };

        let mut patch = FilePatch {
            description: request.description,
            ..Default::default()
        };

        if next_folder != file.folder {
            let to = object_key(&next_folder, &file.filename);
            self.objects
                .relocate(&file.storage_key, &to, &file.mimetype)
                .await?;

            tracing::debug!(file_id = %id, from = %file.storage_key, to = %to, "Relocated payload");

            patch.url = Some(self.objects.public_url(&to));
            patch.folder = Some(next_folder);
            patch.storage_key = Some(to);
        }

        if patch.is_empty() {
            return Ok(file);
        }

        self.store
            .update(id, patch)?
            .ok_or_else(|| FileError::file_not_found(id))
    }

    /// Delete one record and its payload. A backend that cannot accept writes
    /// fails the call before the record is touched, so no payload is orphaned.
    pub async fn delete_by_id(&self, id: &str) -> Result<FileRecord, FileError> {
        if self.store.find_by_id(id).is_none() {
            return Err(FileError::file_not_found(id));
        }
        self.objects.ensure_writable()?;

        let removed = self
            .store
            .remove_by_id(id)?
            .ok_or_else(|| FileError::file_not_found(id))?;

        self.discard_payload(&removed.storage_key).await;
        tracing::debug!(file_id = %id, "Deleted file");
        Ok(removed)
    }

    pub async fn delete_by_folder(&self, folder: &str) -> Result<FolderRemoval, FileError> {
        let folder = normalize_folder(Some(folder));
        let files = self.store.remove_by_folder(&folder)?;

        for file in &files {
            self.discard_payload(&file.storage_key).await;
        }
        self.discard_folder(&folder).await;

        tracing::debug!(folder = %folder, count = files.len(), "Deleted folder");
        Ok(FolderRemoval { folder, files })
    }

    pub async fn delete_all(&self) -> Result<Vec<FileRecord>, FileError> {
        let files = self.store.clear_all()?;

        let mut folders = BTreeSet::new();
        for file in &files {
            self.discard_payload(&file.storage_key).await;
            folders.insert(file.folder.as_str());
        }
        for folder in folders {
            self.discard_folder(folder).await;
        }

        tracing::debug!(count = files.len(), "Deleted all files");
        Ok(files)
    }

    async fn discard_payload(&self, key: &str) {
        if let Err(e) = self.objects.delete(key).await {
            tracing::warn!(key = %key, backend = self.objects.name(), error = %e, "Failed to delete payload");
        }
    }

    async fn discard_folder(&self, folder: &str) {
        if let Err(e) = self.objects.delete_folder(folder).await {
            tracing::warn!(folder = %folder, backend = self.objects.name(), error = %e, "Failed to delete folder");
        }
    }
}
