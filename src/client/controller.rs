use async_trait::async_trait;
use futures::future::join_all;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::list;
use super::notify::{
    Notifier, DOWNLOAD_ERROR, DOWNLOAD_LOADING, DOWNLOAD_SUCCESS, FILE_CREATED, FILE_DELETED, FILE_UPDATED,
    REFRESH_ERROR,
};
use super::reconciler::{reconcile, ReconcileOutcome, UploadedFile};
use super::upload::UploadWidget;
use super::{ClientError, Downloader, FileApi};
use crate::config::ReconcileMode;
use crate::models::File;

/// Asks the user to approve a destructive action.
#[async_trait]
pub trait Confirmation: Send + Sync {
    async fn confirm(&self, prompt: &str) -> bool;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted(File),
    Cancelled,
}

pub fn delete_prompt(filename: &str) -> String {
    format!("Are you sure you want to delete the file: {}?", filename)
}

/// State and actions of the file list.
///
/// Every successful write re-runs the list query and waits for it before the
/// action counts as settled, so the cached list always reflects the caller's
/// own last action. Writes made by other clients show up on the next refresh.
///
/// Refreshes can overlap when several uploads settle at once. Each one is
/// numbered when its query is issued, and a result older than the one
/// already cached is dropped.
pub struct FilesController {
    api: Arc<dyn FileApi>,
    notifier: Arc<dyn Notifier>,
    confirmation: Arc<dyn Confirmation>,
    downloader: Downloader,
    mode: ReconcileMode,
    issued: AtomicU64,
    cache: RwLock<CachedList>,
}

#[derive(Default)]
struct CachedList {
    sequence: u64,
    files: Vec<File>,
}

impl FilesController {
    pub fn new(
        api: Arc<dyn FileApi>,
        notifier: Arc<dyn Notifier>,
        confirmation: Arc<dyn Confirmation>,
        downloader: Downloader,
        mode: ReconcileMode,
    ) -> Self {
        Self {
            api,
            notifier,
            confirmation,
            downloader,
            mode,
            issued: AtomicU64::new(0),
            cache: RwLock::new(CachedList::default()),
        }
    }

    /// Re-runs the list query and replaces the cached list, unless a query
    /// issued later has already been applied.
    pub async fn refresh(&self) -> Result<Vec<File>, ClientError> {
        let sequence = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let files = self.api.files().await?;

        let mut cache = self.cache.write().await;
        if sequence > cache.sequence {
            debug!("Refreshed file list: {} files", files.len());
            cache.sequence = sequence;
            cache.files = files.clone();
        } else {
            debug!("Dropping list #{}, #{} is already cached", sequence, cache.sequence);
        }
        Ok(files)
    }

    /// Refresh after a committed write. A failure here is reported on its
    /// own and does not undo the write's outcome.
    async fn refresh_after_write(&self) {
        if let Err(e) = self.refresh().await {
            warn!("File list refresh failed after a write: {}", e);
            self.notifier.error(&format!("{}: {}", REFRESH_ERROR, e));
        }
    }

    pub async fn load(&self) -> Result<Vec<File>, ClientError> {
        self.refresh().await.inspect_err(|e| self.notifier.error(&e.to_string()))
    }

    pub async fn files(&self) -> Vec<File> {
        self.cache.read().await.files.clone()
    }

    pub async fn render(&self) -> String {
        list::render(&self.cache.read().await.files)
    }

    /// Handles the widget's completion payload. Each file runs its own
    /// search-then-write exchange concurrently with the others.
    pub async fn on_upload_done(&self, uploaded: &[UploadedFile]) -> Vec<Result<ReconcileOutcome, ClientError>> {
        if uploaded.is_empty() {
            return Vec::new();
        }

        join_all(uploaded.iter().map(|file| self.reconcile_one(file))).await
    }

    /// Uploads each path through `widget`, then reconciles the ones that
    /// completed. Cancelled or failed transfers are skipped.
    pub async fn upload_paths(
        &self,
        widget: &dyn UploadWidget,
        paths: &[PathBuf],
    ) -> Vec<Result<ReconcileOutcome, ClientError>> {
        let completed: Vec<UploadedFile> = join_all(paths.iter().map(|path| widget.upload(path)))
            .await
            .into_iter()
            .flatten()
            .collect();

        if completed.len() < paths.len() {
            warn!("{} of {} uploads did not complete", paths.len() - completed.len(), paths.len());
        }

        self.on_upload_done(&completed).await
    }

    async fn reconcile_one(&self, uploaded: &UploadedFile) -> Result<ReconcileOutcome, ClientError> {
        let outcome = reconcile(self.api.as_ref(), self.mode, uploaded)
            .await
            .inspect_err(|e| self.notifier.error(&e.to_string()))?;

        self.refresh_after_write().await;
        match &outcome {
            ReconcileOutcome::Created(_) => self.notifier.success(FILE_CREATED),
            ReconcileOutcome::Updated { .. } => self.notifier.success(FILE_UPDATED),
        }
        Ok(outcome)
    }

    /// Asks for confirmation, then deletes. A declined prompt issues no call.
    pub async fn request_delete(&self, id: &str, filename: &str) -> Result<DeleteOutcome, ClientError> {
        self.notifier.dismiss_all();

        if !self.confirmation.confirm(&delete_prompt(filename)).await {
            debug!("Deletion of {} cancelled", filename);
            return Ok(DeleteOutcome::Cancelled);
        }

        let file = self.api.delete_file(id).await.inspect_err(|e| self.notifier.error(&e.to_string()))?;

        self.notifier.dismiss_all();
        self.refresh_after_write().await;
        self.notifier.success(FILE_DELETED);
        info!("Deleted {}", file.name);
        Ok(DeleteOutcome::Deleted(file))
    }

    /// Saves the record's binary locally under its name.
    pub async fn download(&self, file: &File) -> Result<PathBuf, ClientError> {
        self.notifier.loading(DOWNLOAD_LOADING);

        match self.downloader.download(&file.url, &file.name).await {
            Ok(path) => {
                self.notifier.success(DOWNLOAD_SUCCESS);
                Ok(path)
            }
            Err(e) => {
                warn!("Download of {} failed: {}", file.name, e);
                self.notifier.error(DOWNLOAD_ERROR);
                Err(e)
            }
        }
    }

    pub fn download_dir(&self) -> &Path {
        self.downloader.target_dir()
    }
}
