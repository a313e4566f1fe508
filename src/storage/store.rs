use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;

use super::models::{object_key, FileRecord};

/// Directory under the storage root holding the index. Never a valid folder name.
pub const META_DIR: &str = ".meta";
pub const INDEX_FILE: &str = "files.json";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// JSON-document metadata index with an in-memory snapshot.
///
/// The whole index is one ordered array. It is read from disk on first use and
/// then served from memory; every mutation rewrites the full document and only
/// replaces the snapshot once the write landed. One process owns the document.
/// A document that no longer parses is copied to `files.json.bak` and the index
/// starts over empty.
pub struct MetadataStore {
    index_path: PathBuf,
    cache: Mutex<Option<Vec<FileRecord>>>,
}

impl MetadataStore {
    /// Open or create the index under `<root>/.meta/files.json`
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self, StorageError> {
        let meta_dir = root.as_ref().join(META_DIR);
        std::fs::create_dir_all(&meta_dir)?;

        let index_path = meta_dir.join(INDEX_FILE);
        if !index_path.exists() {
            std::fs::write(&index_path, "[]")?;
        }

        Ok(Self {
            index_path,
            cache: Mutex::new(None),
        })
    }

    pub fn index_path(&self) -> &Path {
        &self.index_path
    }

    fn lock(&self) -> MutexGuard<'_, Option<Vec<FileRecord>>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run a read against the snapshot, loading it first if needed.
    pub(super) fn read<R>(&self, f: impl FnOnce(&[FileRecord]) -> R) -> R {
        let mut guard = self.lock();
        let records = guard.get_or_insert_with(|| self.load());
        f(records)
    }

    /// Run a mutation against a copy of the snapshot and persist it.
    /// A closure returning `None` made no change and nothing is written.
    pub(super) fn mutate<R>(
        &self,
        f: impl FnOnce(&mut Vec<FileRecord>) -> Option<R>,
    ) -> Result<Option<R>, StorageError> {
        let mut guard = self.lock();
        let mut records = guard.get_or_insert_with(|| self.load()).clone();

        let Some(result) = f(&mut records) else {
            return Ok(None);
        };

        self.persist(&records)?;
        *guard = Some(records);
        Ok(Some(result))
    }

    fn load(&self) -> Vec<FileRecord> {
        let raw = match std::fs::read_to_string(&self.index_path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                tracing::error!(path = %self.index_path.display(), error = %e, "Failed to read metadata index, starting empty");
                return Vec::new();
            }
        };

        let mut records: Vec<FileRecord> = match serde_json::from_str(&raw) {
            Ok(records) => records,
            Err(e) => {
                tracing::error!(path = %self.index_path.display(), error = %e, "Malformed metadata index, starting empty");
                self.preserve(&raw);
                return Vec::new();
            }
        };

        // Indexes written before storage keys were recorded
        for record in records.iter_mut().filter(|r| r.storage_key.is_empty()) {
            record.storage_key = object_key(&record.folder, &record.filename);
        }

        tracing::debug!(records = records.len(), "Loaded metadata index");
        records
    }

    /// Path the contents of an unparseable index are copied to
    pub fn backup_path(&self) -> PathBuf {
        self.index_path.with_extension("json.bak")
    }

    /// Keep the unparseable document aside; the next write replaces the index.
    fn preserve(&self, raw: &str) {
        let backup = self.backup_path();
        match std::fs::write(&backup, raw) {
            Ok(()) => tracing::warn!(backup = %backup.display(), "Saved unreadable metadata index"),
            Err(e) => tracing::error!(backup = %backup.display(), error = %e, "Failed to save unreadable metadata index"),
        }
    }

    fn persist(&self, records: &[FileRecord]) -> Result<(), StorageError> {
        let data = serde_json::to_vec_pretty(records)?;
        let tmp_path = self.index_path.with_extension("json.tmp");
        std::fs::write(&tmp_path, &data)?;
        std::fs::rename(&tmp_path, &self.index_path)?;
        Ok(())
    }
}
