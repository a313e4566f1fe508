use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_address: String,
    pub storage: StorageConfig,
    pub upload: UploadConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Blob,
    Local,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Root directory for local payloads and the `.meta` index
    pub root: String,
    /// URL prefix that local payload URLs are built from
    pub public_path: String,
    /// Read/write token for the blob backend. Writes fail without it.
    pub blob_token: Option<String>,
    pub blob_api_url: String,
    /// Public base URL of the blob store (derived from the token when unset)
    pub blob_public_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Maximum payload size in bytes
    pub max_upload_size: u64,
    /// Accepted MIME subtypes, e.g. `png` for `image/png`
    pub accepted_types: Vec<String>,
}

pub const DEFAULT_BLOB_API_URL: &str = "https://blob.vercel-storage.com";

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Local,
            root: "./uploads".to_string(),
            public_path: "/uploads".to_string(),
            blob_token: None,
            blob_api_url: DEFAULT_BLOB_API_URL.to_string(),
            blob_public_url: None,
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_upload_size: 2 * 1024 * 1024,
            accepted_types: ["jpg", "jpeg", "png", "pdf"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let bind_address =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        let backend = match std::env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "local".to_string())
            .to_lowercase()
            .as_str()
        {
            "blob" => StorageBackend::Blob,
            _ => StorageBackend::Local,
        };

        let root = std::env::var("STORAGE_ROOT").unwrap_or_else(|_| "./uploads".to_string());
        let public_path =
            std::env::var("PUBLIC_PATH").unwrap_or_else(|_| "/uploads".to_string());

        let blob_token = std::env::var("BLOB_READ_WRITE_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty());
        let blob_api_url =
            std::env::var("BLOB_API_URL").unwrap_or_else(|_| DEFAULT_BLOB_API_URL.to_string());
        let blob_public_url = std::env::var("BLOB_PUBLIC_URL").ok();

        let max_upload_size = std::env::var("MAX_UPLOAD_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(2 * 1024 * 1024); // 2MB

        let accepted_types = std::env::var("ACCEPTED_MIME_TYPES")
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_lowercase())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_else(|_| UploadConfig::default().accepted_types);

        let config = Config {
            bind_address,
            storage: StorageConfig {
                backend,
                root,
                public_path: public_path.trim_end_matches('/').to_string(),
                blob_token,
                blob_api_url: blob_api_url.trim_end_matches('/').to_string(),
                blob_public_url: blob_public_url.map(|u| u.trim_end_matches('/').to_string()),
            },
            upload: UploadConfig {
                max_upload_size,
                accepted_types,
            },
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.upload.max_upload_size == 0 {
            return Err(ConfigError::ValidationError(
                "MAX_UPLOAD_SIZE must be greater than 0".to_string(),
            ));
        }

        if self.upload.accepted_types.is_empty() {
            return Err(ConfigError::ValidationError(
                "ACCEPTED_MIME_TYPES must list at least one type".to_string(),
            ));
        }

        if !self.storage.public_path.starts_with('/') {
            return Err(ConfigError::ValidationError(
                "PUBLIC_PATH must start with '/'".to_string(),
            ));
        }

        if self.storage.backend == StorageBackend::Blob && self.storage.blob_token.is_none() {
            tracing::warn!(
                "STORAGE_BACKEND=blob without BLOB_READ_WRITE_TOKEN. \
                 Uploads, relocations and deletions will be refused."
            );
        }

        Ok(())
    }

    /// Body limit for the upload route: payload ceiling plus multipart framing.
    pub fn upload_body_limit(&self) -> usize {
        (self.upload.max_upload_size as usize).saturating_add(64 * 1024)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            bind_address: "127.0.0.1:0".to_string(),
            storage: StorageConfig::default(),
            upload: UploadConfig::default(),
        }
    }

    #[test]
    fn test_defaults_validate() {
        let config = config();
        assert!(config.validate().is_ok());
        assert_eq!(config.upload.max_upload_size, 2 * 1024 * 1024);
        assert_eq!(config.upload.accepted_types, vec!["jpg", "jpeg", "png", "pdf"]);
    }

    #[test]
    fn test_rejects_zero_upload_size() {
        let mut config = config();
        config.upload.max_upload_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_relative_public_path() {
        let mut config = config();
        config.storage.public_path = "uploads".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_blob_without_token_is_not_fatal() {
        let mut config = config();
        config.storage.backend = StorageBackend::Blob;
        assert!(config.validate().is_ok());
    }
}
