use async_graphql::{Context, ErrorExtensions, Object, Result};

use super::guard::require_auth;
use crate::models::{CreateFileInput, File, UpdateFileInput, UpsertFileInput};
use crate::services::FileService;

#[derive(Default)]
pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// All file records, oldest first.
    async fn files(&self, ctx: &Context<'_>) -> Result<Vec<File>> {
        require_auth(ctx)?;
        ctx.data::<FileService>()?.list_files().await.map_err(|e| e.extend())
    }

    async fn file(&self, ctx: &Context<'_>, id: String) -> Result<Option<File>> {
        require_auth(ctx)?;
        ctx.data::<FileService>()?.get_file(&id).await.map_err(|e| e.extend())
    }
}

#[derive(Default)]
pub struct MutationRoot;

#[Object]
impl MutationRoot {
    async fn create_file(&self, ctx: &Context<'_>, input: CreateFileInput) -> Result<File> {
        require_auth(ctx)?;
        ctx.data::<FileService>()?.create_file(input).await.map_err(|e| e.extend())
    }

    /// Changes only the fields present in `input`.
    async fn update_file(&self, ctx: &Context<'_>, id: String, input: UpdateFileInput) -> Result<File> {
        require_auth(ctx)?;
        ctx.data::<FileService>()?.update_file(&id, input).await.map_err(|e| e.extend())
    }

    /// Returns the record as it was before removal.
    async fn delete_file(&self, ctx: &Context<'_>, id: String) -> Result<File> {
        require_auth(ctx)?;
        ctx.data::<FileService>()?.delete_file(&id).await.map_err(|e| e.extend())
    }

    /// Records named exactly `query`, oldest first.
    async fn search_files(&self, ctx: &Context<'_>, query: String) -> Result<Vec<File>> {
        require_auth(ctx)?;
        ctx.data::<FileService>()?.search_files(&query).await.map_err(|e| e.extend())
    }

    /// Creates `name` at version 1 or bumps the oldest record with that exact
    /// name, in one serialized step.
    async fn upsert_file(&self, ctx: &Context<'_>, input: UpsertFileInput) -> Result<File> {
        require_auth(ctx)?;
        ctx.data::<FileService>()?.upsert_file(input).await.map_err(|e| e.extend())
    }
}
