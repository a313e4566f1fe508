//! Shared test helpers for file-depot unit tests.

use std::sync::Arc;

use crate::config::{Config, StorageConfig, UploadConfig};
use crate::object_store::LocalStore;
use crate::service::FileService;
use crate::storage::MetadataStore;
use crate::AppState;

/// Create a test AppState with a temporary storage root and local backend.
pub fn test_state(temp_dir: &tempfile::TempDir) -> Arc<AppState> {
    let root = temp_dir.path().join("uploads");

    let config = Config {
        bind_address: "127.0.0.1:0".to_string(),
        storage: StorageConfig {
            root: root.to_string_lossy().to_string(),
            ..Default::default()
        },
        upload: UploadConfig::default(),
    };

    let store = MetadataStore::open(&root).expect("Failed to open test metadata store");
    let objects = LocalStore::new(&root, &config.storage.public_path)
        .expect("Failed to create test object store");

    let files = FileService::new(Arc::new(store), Arc::new(objects), config.upload.clone());

    Arc::new(AppState { config, files })
}
