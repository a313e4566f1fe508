//! file-depot - folder-aware file uploads with a JSON metadata index
//!
//! This crate provides file upload, relocation and deletion with:
//! - Swappable payload backends (local filesystem, remote blob store)
//! - A single JSON document as the metadata index, cached in memory
//! - Metadata written only after the payload operation it describes succeeded
//! - REST API with multipart upload support

pub mod api;
pub mod config;
pub mod object_store;
pub mod service;
pub mod storage;
#[cfg(test)]
pub mod testutil;

use config::Config;
use service::FileService;

/// Shared application state
pub struct AppState {
    pub config: Config,
    pub files: FileService,
}
