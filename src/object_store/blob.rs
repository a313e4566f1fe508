use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, RequestBuilder, Response};

use super::{ObjectStore, ObjectStoreError};

const API_VERSION: &str = "7";

/// Remote blob store backend speaking the Vercel Blob HTTP API.
///
/// Reads go through the public URL of a key; every write needs the read/write token
/// and is refused before any request is sent when it is missing.
pub struct BlobStore {
    api_url: String,
    public_base: String,
    client: Client,
    token: Option<String>,
}

impl BlobStore {
    pub fn new(
        api_url: &str,
        public_url: Option<&str>,
        token: Option<&str>,
    ) -> Result<Self, anyhow::Error> {
        let client = Client::builder().build()?;
        let api_url = api_url.trim_end_matches('/').to_string();

        let public_base = public_url
            .map(|u| u.trim_end_matches('/').to_string())
            .or_else(|| token.and_then(public_base_from_token))
            .unwrap_or_else(|| api_url.clone());

        Ok(Self {
            api_url,
            public_base,
            client,
            token: token.map(|s| s.to_string()),
        })
    }

    fn token(&self) -> Result<&str, ObjectStoreError> {
        self.token.as_deref().ok_or_else(|| {
            ObjectStoreError::MissingCredential("BLOB_READ_WRITE_TOKEN is not configured".into())
        })
    }

    fn object_api_url(&self, key: &str) -> String {
        format!("{}/{key}", self.api_url)
    }

    fn delete_api_url(&self) -> String {
        format!("{}/delete", self.api_url)
    }

    fn write_request(&self, builder: RequestBuilder, token: &str, content_type: &str) -> RequestBuilder {
        builder
            .bearer_auth(token)
            .header("x-api-version", API_VERSION)
            .header("x-add-random-suffix", "0")
            .header("x-content-type", content_type)
    }

    async fn delete_with_token(&self, key: &str, token: &str) -> Result<(), ObjectStoreError> {
        let resp = self
            .client
            .post(self.delete_api_url())
            .bearer_auth(token)
            .header("x-api-version", API_VERSION)
            .json(&serde_json::json!({ "urls": [self.public_url(key)] }))
            .send()
            .await
            .map_err(|e| ObjectStoreError::Backend(e.to_string()))?;

        // 404 is fine -- blob already gone
        if !resp.status().is_success() && resp.status() != reqwest::StatusCode::NOT_FOUND {
            return Err(failure("delete", resp).await);
        }

        Ok(())
    }
}

#[async_trait]
impl ObjectStore for BlobStore {
    fn name(&self) -> &'static str {
        "blob"
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{key}", self.public_base)
    }

    fn ensure_writable(&self) -> Result<(), ObjectStoreError> {
        self.token().map(|_| ())
    }

    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<(), ObjectStoreError> {
        let token = self.token()?;

        let resp = self
            .write_request(self.client.put(self.object_api_url(key)), token, content_type)
            .body(data)
            .send()
            .await
            .map_err(|e| ObjectStoreError::Backend(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(failure("upload", resp).await);
        }

        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Bytes, ObjectStoreError> {
        let resp = self
            .client
            .get(self.public_url(key))
            .send()
            .await
            .map_err(|e| ObjectStoreError::Backend(e.to_string()))?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ObjectStoreError::NotFound(key.to_string()));
        }

        if !resp.status().is_success() {
            return Err(failure("download", resp).await);
        }

        resp.bytes()
            .await
            .map_err(|e| ObjectStoreError::Backend(e.to_string()))
    }

    async fn relocate(&self, from: &str, to: &str, content_type: &str) -> Result<(), ObjectStoreError> {
        let token = self.token()?;

        let resp = self
            .write_request(self.client.put(self.object_api_url(to)), token, content_type)
            .query(&[("fromUrl", self.public_url(from))])
            .send()
            .await
            .map_err(|e| ObjectStoreError::Backend(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(failure("copy", resp).await);
        }

        // The copy is confirmed, so a leftover source blob is only garbage
        if let Err(e) = self.delete_with_token(from, token).await {
            tracing::warn!(key = %from, error = %e, "Failed to delete relocated blob source");
        }

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), ObjectStoreError> {
        let token = self.token()?;
        self.delete_with_token(key, token).await
    }

    async fn exists(&self, key: &str) -> Result<bool, ObjectStoreError> {
        let resp = self
            .client
            .head(self.public_url(key))
            .send()
            .await
            .map_err(|e| ObjectStoreError::Backend(e.to_string()))?;

        Ok(resp.status().is_success())
    }
}

async fn failure(operation: &str, resp: Response) -> ObjectStoreError {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    ObjectStoreError::Backend(format!("Blob {operation} failed ({status}): {body}"))
}

/// Tokens look like `vercel_blob_rw_<storeId>_<secret>`.
fn public_base_from_token(token: &str) -> Option<String> {
    let store_id = token.strip_prefix("vercel_blob_rw_")?.split('_').next()?;
    if store_id.is_empty() {
        return None;
    }
    Some(format!(
        "https://{}.public.blob.vercel-storage.com",
        store_id.to_lowercase()
    ))
}
