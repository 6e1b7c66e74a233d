use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;

use super::{new_file_id, FileStore};
use crate::models::{CreateFileInput, File, UpdateFileInput, UpsertFileInput};

const FILE_COLUMNS: &str = r#"id, name, url, "type", version"#;

pub struct FileRepository {
    pool: PgPool,
}

impl FileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FileStore for FileRepository {
    async fn list_files(&self) -> Result<Vec<File>> {
        let files = sqlx::query_as::<_, File>(&format!(
            "SELECT {FILE_COLUMNS} FROM files ORDER BY created_at ASC, id ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(files)
    }

    async fn get_file(&self, id: &str) -> Result<Option<File>> {
        let file = sqlx::query_as::<_, File>(&format!("SELECT {FILE_COLUMNS} FROM files WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(file)
    }

    async fn create_file(&self, input: &CreateFileInput) -> Result<File> {
        let file = sqlx::query_as::<_, File>(&format!(
            r#"INSERT INTO files (id, name, url, "type", version) VALUES ($1, $2, $3, $4, $5) RETURNING {FILE_COLUMNS}"#
        ))
        .bind(new_file_id())
        .bind(&input.name)
        .bind(&input.url)
        .bind(&input.file_type)
        .bind(input.version)
        .fetch_one(&self.pool)
        .await?;

        Ok(file)
    }

    async fn update_file(&self, id: &str, input: &UpdateFileInput) -> Result<Option<File>> {
        let file = sqlx::query_as::<_, File>(&format!(
            r#"UPDATE files SET
                name = COALESCE($2, name),
                url = COALESCE($3, url),
                "type" = COALESCE($4, "type"),
                version = COALESCE($5, version),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {FILE_COLUMNS}"#
        ))
        .bind(id)
        .bind(input.name.as_deref())
        .bind(input.url.as_deref())
        .bind(input.file_type.as_deref())
        .bind(input.version)
        .fetch_optional(&self.pool)
        .await?;

        Ok(file)
    }

    async fn delete_file(&self, id: &str) -> Result<Option<File>> {
        let file = sqlx::query_as::<_, File>(&format!("DELETE FROM files WHERE id = $1 RETURNING {FILE_COLUMNS}"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(file)
    }

    async fn search_files(&self, query: &str) -> Result<Vec<File>> {
        let files = sqlx::query_as::<_, File>(&format!(
            "SELECT {FILE_COLUMNS} FROM files
             WHERE name = $1
             ORDER BY created_at ASC, id ASC"
        ))
        .bind(query)
        .fetch_all(&self.pool)
        .await?;

        Ok(files)
    }

    async fn upsert_file(&self, input: &UpsertFileInput) -> Result<File> {
        let mut tx = self.pool.begin().await?;

        // Serializes upserts of one name until commit; rows that do not exist yet
        // cannot be locked with FOR UPDATE.
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(&input.name)
            .execute(&mut *tx)
            .await?;

        let existing = sqlx::query_as::<_, File>(&format!(
            "SELECT {FILE_COLUMNS} FROM files WHERE name = $1 ORDER BY created_at ASC, id ASC LIMIT 1"
        ))
        .bind(&input.name)
        .fetch_optional(&mut *tx)
        .await?;

        let file = match existing {
            Some(existing) => {
                sqlx::query_as::<_, File>(&format!(
                    r#"UPDATE files SET url = $2, "type" = $3, version = version + 1, updated_at = NOW()
                     WHERE id = $1
                     RETURNING {FILE_COLUMNS}"#
                ))
                .bind(&existing.id)
                .bind(&input.url)
                .bind(&input.file_type)
                .fetch_one(&mut *tx)
                .await?
            }
            None => {
                sqlx::query_as::<_, File>(&format!(
                    r#"INSERT INTO files (id, name, url, "type", version) VALUES ($1, $2, $3, $4, 1) RETURNING {FILE_COLUMNS}"#
                ))
                .bind(new_file_id())
                .bind(&input.name)
                .bind(&input.url)
                .bind(&input.file_type)
                .fetch_one(&mut *tx)
                .await?
            }
        };

        tx.commit().await?;
        Ok(file)
    }

    async fn count_files(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM files")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn delete_all_files(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM files").execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}
