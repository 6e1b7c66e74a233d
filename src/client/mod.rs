//! Client side of the file list: talks to the GraphQL API, reconciles upload
//! completions into record writes, and drives list, download and delete actions.

pub mod controller;
pub mod download;
pub mod graphql;
pub mod list;
pub mod notify;
pub mod reconciler;
pub mod upload;

pub use controller::*;
pub use download::*;
pub use graphql::*;
pub use list::*;
pub use notify::*;
pub use reconciler::*;
pub use upload::*;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{CreateFileInput, File, UpdateFileInput, UpsertFileInput};

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Server responded with status {status}: {body}")]
    Http { status: u16, body: String },
    #[error("{message}")]
    Graphql { message: String, code: Option<String> },
    #[error("Unexpected response: {0}")]
    Decode(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{name} is {size} bytes, above the {limit} byte upload limit")]
    TooLarge { name: String, size: u64, limit: u64 },
}

impl ClientError {
    pub fn code(&self) -> Option<&str> {
        match self {
            ClientError::Graphql { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    pub fn is_unauthenticated(&self) -> bool {
        self.code() == Some(crate::graphql::UNAUTHENTICATED)
    }
}

/// The GraphQL operations the list component issues.
#[async_trait]
pub trait FileApi: Send + Sync {
    async fn files(&self) -> Result<Vec<File>, ClientError>;
    async fn file(&self, id: &str) -> Result<Option<File>, ClientError>;
    async fn create_file(&self, input: &CreateFileInput) -> Result<File, ClientError>;
    async fn update_file(&self, id: &str, input: &UpdateFileInput) -> Result<File, ClientError>;
    async fn delete_file(&self, id: &str) -> Result<File, ClientError>;
    async fn search_files(&self, query: &str) -> Result<Vec<File>, ClientError>;
    async fn upsert_file(&self, input: &UpsertFileInput) -> Result<File, ClientError>;
}
