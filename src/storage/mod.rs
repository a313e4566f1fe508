mod files;
pub mod models;
pub mod store;

pub use models::{FilePatch, FileRecord};
pub use store::{MetadataStore, StorageError};
