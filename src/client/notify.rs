use tracing::{error, info};

pub const FILE_CREATED: &str = "File created";
pub const FILE_UPDATED: &str = "File updated";
pub const FILE_DELETED: &str = "File deleted";
pub const DOWNLOAD_LOADING: &str = "Downloading file...";
pub const DOWNLOAD_SUCCESS: &str = "File downloaded";
pub const DOWNLOAD_ERROR: &str = "An error occurred while downloading the file";
pub const REFRESH_ERROR: &str = "Could not refresh the file list";

/// Transient user-facing messages.
pub trait Notifier: Send + Sync {
    fn loading(&self, message: &str);
    fn success(&self, message: &str);
    fn error(&self, message: &str);
    /// Clears every message still on screen.
    fn dismiss_all(&self);
}

/// Writes notifications to the log; used by the command-line client.
#[derive(Debug, Default, Clone)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn loading(&self, message: &str) {
        info!("… {}", message);
    }

    fn success(&self, message: &str) {
        info!("✔ {}", message);
    }

    fn error(&self, message: &str) {
        error!("✖ {}", message);
    }

    fn dismiss_all(&self) {}
}
