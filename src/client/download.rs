use reqwest::Client;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use super::ClientError;

/// Fetches stored binaries and saves them under a local directory.
#[derive(Debug, Clone)]
pub struct Downloader {
    client: Client,
    target_dir: PathBuf,
}

impl Downloader {
    pub fn new(target_dir: impl Into<PathBuf>) -> Self {
        let client = Client::builder()
            .user_agent("filebox-rs/0.1")
            .timeout(Duration::from_secs(300))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client, target_dir: target_dir.into() }
    }

    pub fn target_dir(&self) -> &Path {
        &self.target_dir
    }

    /// GETs `url` as raw bytes of any content type and saves it as `filename`.
    /// The body goes to a hidden partial file first so an interrupted write never
    /// leaves a truncated file under the final name.
    pub async fn download(&self, url: &str, filename: &str) -> Result<PathBuf, ClientError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Http { status: status.as_u16(), body });
        }

        let blob = response.bytes().await?;
        debug!("Fetched {} bytes from {}", blob.len(), url);

        let name = safe_file_name(filename);
        tokio::fs::create_dir_all(&self.target_dir).await?;
        let target = self.target_dir.join(&name);
        let partial = self.target_dir.join(format!(".{}.part", name));

        tokio::fs::write(&partial, &blob).await?;
        drop(blob);
        tokio::fs::rename(&partial, &target).await?;

        Ok(target)
    }
}

/// Last path component of `filename`, so a record name cannot escape the target
/// directory.
pub fn safe_file_name(filename: &str) -> String {
    Path::new(filename)
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "download".to_string())
}
