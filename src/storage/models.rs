use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Build the backend key of a payload from its folder and generated filename.
pub fn object_key(folder: &str, filename: &str) -> String {
    format!("{folder}/{filename}")
}

/// A file record as persisted in the metadata index document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub id: String,
    /// Generated storage-local name, `<millis>-<random><.ext>`
    pub filename: String,
    pub original_name: String,
    pub mimetype: String,
    pub size: u64,
    pub folder: String,
    pub url: String,
    /// Backend locator, always `<folder>/<filename>`
    #[serde(default, alias = "blobPathname")]
    pub storage_key: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl FileRecord {
    pub fn key(&self) -> String {
        object_key(&self.folder, &self.filename)
    }
}

/// Partial update merged into an existing record. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilePatch {
    pub description: Option<String>,
    pub folder: Option<String>,
    pub storage_key: Option<String>,
    pub url: Option<String>,
}

impl FilePatch {
    pub fn description(description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.description.is_none()
            && self.folder.is_none()
            && self.storage_key.is_none()
            && self.url.is_none()
    }

    pub(crate) fn apply(self, file: &mut FileRecord) {
        if let Some(d) = self.description {
            file.description = Some(d);
        }
        if let Some(f) = self.folder {
            file.folder = f;
        }
        if let Some(k) = self.storage_key {
            file.storage_key = k;
        }
        if let Some(u) = self.url {
            file.url = u;
        }
    }
}
