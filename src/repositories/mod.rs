pub mod file_repository;
pub mod sqlite_file_repository;
pub mod sqlite_user_repository;
pub mod user_repository;

pub use file_repository::*;
pub use sqlite_file_repository::*;
pub use sqlite_user_repository::*;
pub use user_repository::*;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{CreateFileInput, File, UpdateFileInput, UpsertFileInput, User};

/// Persistence of file records. Implemented once per database backend.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// All records, oldest first.
    async fn list_files(&self) -> Result<Vec<File>>;
    async fn get_file(&self, id: &str) -> Result<Option<File>>;
    async fn create_file(&self, input: &CreateFileInput) -> Result<File>;
    /// Returns `None` when `id` does not exist.
    async fn update_file(&self, id: &str, input: &UpdateFileInput) -> Result<Option<File>>;
    /// Returns the removed record, or `None` when `id` does not exist.
    async fn delete_file(&self, id: &str) -> Result<Option<File>>;
    /// Records named exactly `query` (case-sensitive), oldest first.
    async fn search_files(&self, query: &str) -> Result<Vec<File>>;
    /// Finds the oldest record named exactly `input.name` and bumps its version,
    /// or creates it at version 1, without interleaving another upsert of the
    /// same name.
    async fn upsert_file(&self, input: &UpsertFileInput) -> Result<File>;
    async fn count_files(&self) -> Result<i64>;
    async fn delete_all_files(&self) -> Result<u64>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create_user(&self, user: &User) -> Result<User>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn get_user(&self, id: &str) -> Result<Option<User>>;
    async fn count_users(&self) -> Result<i64>;
}

pub(crate) const USER_COLUMNS: &str = "id, username, email, password_hash, active, created_at, updated_at";

/// Unique user columns a lookup can go through.
#[derive(Debug, Clone, Copy)]
pub(crate) enum UserKey {
    Id,
    Username,
    Email,
}

impl UserKey {
    pub(crate) fn column(self) -> &'static str {
        match self {
            UserKey::Id => "id",
            UserKey::Username => "username",
            UserKey::Email => "email",
        }
    }
}

pub(crate) fn new_file_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
