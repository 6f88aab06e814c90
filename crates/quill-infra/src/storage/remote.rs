//! Remote object store backend.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;

use quill_core::ports::{FileStore, StagedUpload, StorageError, StoredFileRef};

use super::object_name;

/// Remote object store configuration.
#[derive(Debug, Clone)]
pub struct RemoteStorageConfig {
    pub endpoint: String,
    pub api_key: String,
    pub public_base_url: String,
}

/// Pushes uploads to an external object store over HTTP PUT and mints the
/// object's public URL as the stored reference.
pub struct RemoteFileStore {
    client: reqwest::Client,
    config: RemoteStorageConfig,
}

impl RemoteFileStore {
    pub fn new(config: RemoteStorageConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl FileStore for RemoteFileStore {
    async fn store(&self, upload: StagedUpload) -> Result<StoredFileRef, StorageError> {
        let name = object_name(&upload);
        let bytes = tokio::fs::read(upload.path()).await?;

        let mut request = self
            .client
            .put(format!(
                "{}/{}",
                self.config.endpoint.trim_end_matches('/'),
                name
            ))
            .bearer_auth(&self.config.api_key)
            .body(bytes);
        if let Some(content_type) = upload.content_type() {
            request = request.header(CONTENT_TYPE, content_type);
        }

        let response = request
            .send()
            .await
            .map_err(|e| StorageError::Remote(e.to_string()))?;

        if !response.status().is_success() {
            return Err(StorageError::Remote(format!(
                "object store replied {}",
                response.status()
            )));
        }

        Ok(StoredFileRef::new(format!(
            "{}/{}",
            self.config.public_base_url.trim_end_matches('/'),
            name
        )))
    }
}
