use super::models::{FilePatch, FileRecord};
use super::store::{MetadataStore, StorageError};

impl MetadataStore {
    // ========================================================================
    // Reads
    // ========================================================================

    /// All records in insertion order. An absent or unreadable index reads as empty.
    pub fn get_all(&self) -> Vec<FileRecord> {
        self.read(|records| records.to_vec())
    }

    pub fn find_by_id(&self, id: &str) -> Option<FileRecord> {
        self.read(|records| records.iter().find(|r| r.id == id).cloned())
    }

    pub fn find_by_folder(&self, folder: &str) -> Vec<FileRecord> {
        self.read(|records| {
            records
                .iter()
                .filter(|r| r.folder == folder)
                .cloned()
                .collect()
        })
    }

    /// Resolve a payload address (`<folder>/<filename>`) back to its record
    pub fn find_by_location(&self, folder: &str, filename: &str) -> Option<FileRecord> {
        self.read(|records| {
            records
                .iter()
                .find(|r| r.folder == folder && r.filename == filename)
                .cloned()
        })
    }

    // ========================================================================
    // Writes
    // ========================================================================

    pub fn add(&self, file: FileRecord) -> Result<FileRecord, StorageError> {
        debug_assert!(!file.id.is_empty(), "file id must not be empty");

        self.mutate(|records| {
            records.push(file.clone());
            Some(())
        })?;
        Ok(file)
    }

    /// Merge `patch` into the record with `id`. Returns `None` for an unknown id.
    pub fn update(&self, id: &str, patch: FilePatch) -> Result<Option<FileRecord>, StorageError> {
        self.mutate(|records| {
            let file = records.iter_mut().find(|r| r.id == id)?;
            patch.apply(file);
            Some(file.clone())
        })
    }

    pub fn remove_by_id(&self, id: &str) -> Result<Option<FileRecord>, StorageError> {
        self.mutate(|records| {
            let idx = records.iter().position(|r| r.id == id)?;
            Some(records.remove(idx))
        })
    }

    pub fn remove_by_folder(&self, folder: &str) -> Result<Vec<FileRecord>, StorageError> {
        let removed = self.mutate(|records| {
            let (removed, kept): (Vec<_>, Vec<_>) =
                records.drain(..).partition(|r| r.folder == folder);
            *records = kept;
            Some(removed)
        })?;
        Ok(removed.unwrap_or_default())
    }

    /// Empty the index, returning everything it held
    pub fn clear_all(&self) -> Result<Vec<FileRecord>, StorageError> {
        let removed = self.mutate(|records| Some(std::mem::take(records)))?;
        Ok(removed.unwrap_or_default())
    }
}
