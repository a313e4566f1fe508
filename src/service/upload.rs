use std::sync::Arc;

use bytes::Bytes;
use chrono::{SubsecRound, Utc};

use super::naming::{generate_filename, is_accepted_type, normalize_folder};
use super::FileError;
use crate::config::UploadConfig;
use crate::object_store::ObjectStore;
use crate::storage::models::object_key;
use crate::storage::{FileRecord, MetadataStore};

/// An inbound payload plus its placement intent.
#[derive(Debug, Clone, Default)]
pub struct UploadRequest {
    pub data: Option<Bytes>,
    pub original_name: String,
    pub mimetype: String,
    pub folder: Option<String>,
    pub description: Option<String>,
}

/// Validates uploads, stores the payload and registers its metadata.
pub struct UploadCoordinator {
    store: Arc<MetadataStore>,
    objects: Arc<dyn ObjectStore>,
    policy: UploadConfig,
}

impl UploadCoordinator {
    pub fn new(store: Arc<MetadataStore>, objects: Arc<dyn ObjectStore>, policy: UploadConfig) -> Self {
        Self {
            store,
            objects,
            policy,
        }
    }

    pub async fn upload(&self, request: UploadRequest) -> Result<FileRecord, FileError> {
        let data = request
            .data
            .ok_or_else(|| FileError::InvalidPayload("file is required".into()))?;

        if !is_accepted_type(&request.mimetype, &self.policy.accepted_types) {
            return Err(FileError::InvalidPayload(format!(
                "file type '{}' is not allowed",
                request.mimetype
            )));
        }

        let size = data.len() as u64;
        if size > self.policy.max_upload_size {
            return Err(FileError::too_large(self.policy.max_upload_size));
        }

        let folder = normalize_folder(request.folder.as_deref());
        let filename = generate_filename(&request.original_name);
        let key = object_key(&folder, &filename);

        // Phase 1: payload
        self.objects.put(&key, data, &request.mimetype).await?;

        // Phase 2: metadata
        let file = FileRecord {
            id: uuid::Uuid::new_v4().to_string(),
            filename,
            original_name: request.original_name,
            mimetype: request.mimetype,
            size,
            folder,
            url: self.objects.public_url(&key),
            storage_key: key.clone(),
            description: request.description,
            created_at: Utc::now().trunc_subsecs(3),
        };

        match self.store.add(file) {
            Ok(file) => {
                tracing::debug!(file_id = %file.id, key = %key, backend = self.objects.name(), "Uploaded file");
                Ok(file)
            }
            Err(e) => {
                // Best-effort cleanup of the orphaned payload
                if let Err(cleanup) = self.objects.delete(&key).await {
                    tracing::warn!(key = %key, error = %cleanup, "Failed to remove payload after metadata write failed");
                }
                Err(e.into())
            }
        }
    }
}
