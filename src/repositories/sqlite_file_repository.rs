use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Sqlite};
use tokio::sync::Mutex;

use super::{new_file_id, FileStore};
use crate::models::{CreateFileInput, File, UpdateFileInput, UpsertFileInput};

const FILE_COLUMNS: &str = r#"id, name, url, "type", version"#;

/// SQLite backend, used for local runs and by the test suite.
pub struct SqliteFileRepository {
    pool: Pool<Sqlite>,
    upsert_lock: Mutex<()>,
}

impl SqliteFileRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool, upsert_lock: Mutex::new(()) }
    }
}

#[async_trait]
impl FileStore for SqliteFileRepository {
    async fn list_files(&self) -> Result<Vec<File>> {
        let files = sqlx::query_as::<_, File>(&format!(
            "SELECT {FILE_COLUMNS} FROM files ORDER BY created_at ASC, rowid ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(files)
    }

    async fn get_file(&self, id: &str) -> Result<Option<File>> {
        let file = sqlx::query_as::<_, File>(&format!("SELECT {FILE_COLUMNS} FROM files WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(file)
    }

    async fn create_file(&self, input: &CreateFileInput) -> Result<File> {
        let now = Utc::now();
        let file = sqlx::query_as::<_, File>(&format!(
            r#"INSERT INTO files (id, name, url, "type", version, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
             RETURNING {FILE_COLUMNS}"#
        ))
        .bind(new_file_id())
        .bind(&input.name)
        .bind(&input.url)
        .bind(&input.file_type)
        .bind(input.version)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(file)
    }

    async fn update_file(&self, id: &str, input: &UpdateFileInput) -> Result<Option<File>> {
        let file = sqlx::query_as::<_, File>(&format!(
            r#"UPDATE files SET
                name = COALESCE(?2, name),
                url = COALESCE(?3, url),
                "type" = COALESCE(?4, "type"),
                version = COALESCE(?5, version),
                updated_at = ?6
             WHERE id = ?1
             RETURNING {FILE_COLUMNS}"#
        ))
        .bind(id)
        .bind(input.name.as_deref())
        .bind(input.url.as_deref())
        .bind(input.file_type.as_deref())
        .bind(input.version)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(file)
    }

    async fn delete_file(&self, id: &str) -> Result<Option<File>> {
        let file = sqlx::query_as::<_, File>(&format!("DELETE FROM files WHERE id = ?1 RETURNING {FILE_COLUMNS}"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(file)
    }

    async fn search_files(&self, query: &str) -> Result<Vec<File>> {
        let files = sqlx::query_as::<_, File>(&format!(
            "SELECT {FILE_COLUMNS} FROM files
             WHERE name = ?1
             ORDER BY created_at ASC, rowid ASC"
        ))
        .bind(query)
        .fetch_all(&self.pool)
        .await?;

        Ok(files)
    }

    async fn upsert_file(&self, input: &UpsertFileInput) -> Result<File> {
        let _guard = self.upsert_lock.lock().await;
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        let existing = sqlx::query_as::<_, File>(&format!(
            "SELECT {FILE_COLUMNS} FROM files WHERE name = ?1 ORDER BY created_at ASC, rowid ASC LIMIT 1"
        ))
        .bind(&input.name)
        .fetch_optional(&mut *tx)
        .await?;

        let file = match existing {
            Some(existing) => {
                sqlx::query_as::<_, File>(&format!(
                    r#"UPDATE files SET url = ?2, "type" = ?3, version = version + 1, updated_at = ?4
                     WHERE id = ?1
                     RETURNING {FILE_COLUMNS}"#
                ))
                .bind(&existing.id)
                .bind(&input.url)
                .bind(&input.file_type)
                .bind(now)
                .fetch_one(&mut *tx)
                .await?
            }
            None => {
                sqlx::query_as::<_, File>(&format!(
                    r#"INSERT INTO files (id, name, url, "type", version, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, 1, ?5, ?5)
                     RETURNING {FILE_COLUMNS}"#
                ))
                .bind(new_file_id())
                .bind(&input.name)
                .bind(&input.url)
                .bind(&input.file_type)
                .bind(now)
                .fetch_one(&mut *tx)
                .await?
            }
        };

        tx.commit().await?;
        Ok(file)
    }

    async fn count_files(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM files")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn delete_all_files(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM files").execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}
