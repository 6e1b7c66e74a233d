use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info};
use validator::Validate;

use crate::models::{CreateFileInput, File, UpdateFileInput, UpsertFileInput};
use crate::repositories::FileStore;

#[derive(Error, Debug)]
pub enum FileError {
    #[error("File not found: {0}")]
    NotFound(String),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Database error: {0}")]
    Database(String),
}

impl From<validator::ValidationErrors> for FileError {
    fn from(errors: validator::ValidationErrors) -> Self {
        FileError::Validation(errors.to_string())
    }
}

fn database_error(operation: &str, e: anyhow::Error) -> FileError {
    error!("File store {} failed: {:?}", operation, e);
    FileError::Database(e.to_string())
}

/// Validated access to file records.
#[derive(Clone)]
pub struct FileService {
    store: Arc<dyn FileStore>,
}

impl FileService {
    pub fn new(store: Arc<dyn FileStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn FileStore> {
        &self.store
    }

    pub async fn list_files(&self) -> Result<Vec<File>, FileError> {
        self.store.list_files().await.map_err(|e| database_error("list", e))
    }

    pub async fn get_file(&self, id: &str) -> Result<Option<File>, FileError> {
        self.store.get_file(id).await.map_err(|e| database_error("get", e))
    }

    pub async fn create_file(&self, input: CreateFileInput) -> Result<File, FileError> {
        input.validate()?;

        let file = self.store.create_file(&input).await.map_err(|e| database_error("create", e))?;
        info!("Created file {} ({}) at version {}", file.name, file.id, file.version);
        Ok(file)
    }

    pub async fn update_file(&self, id: &str, input: UpdateFileInput) -> Result<File, FileError> {
        input.validate()?;

        let file = self
            .store
            .update_file(id, &input)
            .await
            .map_err(|e| database_error("update", e))?
            .ok_or_else(|| FileError::NotFound(id.to_string()))?;
        info!("Updated file {} ({}) to version {}", file.name, file.id, file.version);
        Ok(file)
    }

    pub async fn delete_file(&self, id: &str) -> Result<File, FileError> {
        let file = self
            .store
            .delete_file(id)
            .await
            .map_err(|e| database_error("delete", e))?
            .ok_or_else(|| FileError::NotFound(id.to_string()))?;
        info!("Deleted file {} ({})", file.name, file.id);
        Ok(file)
    }

    pub async fn search_files(&self, query: &str) -> Result<Vec<File>, FileError> {
        let files = self.store.search_files(query).await.map_err(|e| database_error("search", e))?;
        debug!("Search for {:?} matched {} files", query, files.len());
        Ok(files)
    }

    pub async fn upsert_file(&self, input: UpsertFileInput) -> Result<File, FileError> {
        input.validate()?;

        let file = self.store.upsert_file(&input).await.map_err(|e| database_error("upsert", e))?;
        info!("Upserted file {} ({}) at version {}", file.name, file.id, file.version);
        Ok(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::create_test_database;

    async fn service() -> FileService {
        let database = create_test_database().await.unwrap();
        FileService::new(database.file_store())
    }

    fn report_input() -> CreateFileInput {
        CreateFileInput {
            name: "report.pdf".to_string(),
            url: "https://cdn.filestackcontent.com/abc".to_string(),
            file_type: "application/pdf".to_string(),
            version: 1,
        }
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_input() {
        let service = service().await;

        let mut input = report_input();
        input.url = "not a url".to_string();
        assert!(matches!(service.create_file(input).await, Err(FileError::Validation(_))));

        let mut input = report_input();
        input.name = String::new();
        assert!(matches!(service.create_file(input).await, Err(FileError::Validation(_))));

        let mut input = report_input();
        input.version = 0;
        assert!(matches!(service.create_file(input).await, Err(FileError::Validation(_))));

        assert!(service.list_files().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_and_delete_unknown_id_is_not_found() {
        let service = service().await;

        let update = service
            .update_file("missing", UpdateFileInput { version: Some(2), ..Default::default() })
            .await;
        assert!(matches!(update, Err(FileError::NotFound(id)) if id == "missing"));

        let delete = service.delete_file("missing").await;
        assert!(matches!(delete, Err(FileError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_upsert_creates_then_increments() {
        let service = service().await;
        let input = UpsertFileInput {
            name: "report.pdf".to_string(),
            url: "https://cdn.filestackcontent.com/first".to_string(),
            file_type: "application/pdf".to_string(),
        };

        let first = service.upsert_file(input.clone()).await.unwrap();
        assert_eq!(first.version, 1);

        let second = service
            .upsert_file(UpsertFileInput { url: "https://cdn.filestackcontent.com/second".to_string(), ..input })
            .await
            .unwrap();
        assert_eq!(second.id, first.id);
        assert_eq!(second.version, 2);
        assert_eq!(second.url, "https://cdn.filestackcontent.com/second");
    }

    #[tokio::test]
    async fn test_concurrent_upserts_of_one_name_never_duplicate() {
        let service = service().await;

        let tasks = (0..5).map(|i| {
            let service = service.clone();
            tokio::spawn(async move {
                service
                    .upsert_file(UpsertFileInput {
                        name: "same.png".to_string(),
                        url: format!("https://cdn.filestackcontent.com/{}", i),
                        file_type: "image/png".to_string(),
                    })
                    .await
            })
        });

        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let files = service.search_files("same.png").await.unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].version, 5);
    }
}
