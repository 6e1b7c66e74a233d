use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::{error, info};

use super::{ClientError, UploadedFile, OriginalFile};
use crate::config::UploadConfig;

/// External capability that transfers a user-selected file to hosted storage.
#[async_trait]
pub trait UploadWidget: Send + Sync {
    /// Completion payload on success; `None` when the transfer was cancelled or
    /// failed.
    async fn upload(&self, path: &Path) -> Option<UploadedFile>;
}

#[derive(Debug, Deserialize)]
struct StoreResponse {
    url: String,
    #[serde(default)]
    size: Option<u64>,
    #[serde(rename = "type", default)]
    mimetype: Option<String>,
    #[serde(default)]
    filename: Option<String>,
}

/// Uploads through the Filestack store endpoint with a single POST.
#[derive(Debug, Clone)]
pub struct FilestackUploader {
    client: Client,
    api_key: String,
    store_url: String,
    max_size_bytes: u64,
}

impl FilestackUploader {
    pub fn new(config: &UploadConfig) -> Self {
        let client = Client::builder()
            .user_agent("filebox-rs/0.1")
            .timeout(Duration::from_secs(300))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            api_key: config.filestack_api_key.clone(),
            store_url: config.store_url.clone(),
            max_size_bytes: config.max_size_bytes,
        }
    }

    pub async fn store(&self, path: &Path) -> Result<UploadedFile, ClientError> {
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .ok_or_else(|| ClientError::Decode(format!("{} has no file name", path.display())))?;

        let size = tokio::fs::metadata(path).await?.len();
        if size > self.max_size_bytes {
            return Err(ClientError::TooLarge { name: filename, size, limit: self.max_size_bytes });
        }

        let guessed = mime_guess::from_path(path).first_or_octet_stream().essence_str().to_string();
        let body = tokio::fs::read(path).await?;

        let response = self
            .client
            .post(&self.store_url)
            .query(&[("key", self.api_key.as_str()), ("filename", filename.as_str())])
            .header(reqwest::header::CONTENT_TYPE, guessed.as_str())
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Http { status: status.as_u16(), body });
        }

        let stored: StoreResponse = response.json().await?;
        let handle = stored.url.rsplit('/').next().unwrap_or_default().to_string();
        let mimetype = stored.mimetype.unwrap_or_else(|| guessed.clone());

        Ok(UploadedFile {
            filename: stored.filename.unwrap_or_else(|| filename.clone()),
            handle,
            mimetype,
            original_file: Some(OriginalFile { name: filename, file_type: guessed, size }),
            original_path: path.to_string_lossy().to_string(),
            size: stored.size.unwrap_or(size),
            source: "local_file_system".to_string(),
            status: "Stored".to_string(),
            upload_id: uuid::Uuid::new_v4().to_string(),
            url: stored.url,
        })
    }
}

#[async_trait]
impl UploadWidget for FilestackUploader {
    async fn upload(&self, path: &Path) -> Option<UploadedFile> {
        match self.store(path).await {
            Ok(uploaded) => {
                info!("Uploaded {} to {}", uploaded.filename, uploaded.url);
                Some(uploaded)
            }
            Err(e) => {
                error!("Upload of {} failed: {}", path.display(), e);
                None
            }
        }
    }
}
