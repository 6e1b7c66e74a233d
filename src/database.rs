use anyhow::Result;
use sqlx::{postgres::PgPoolOptions, sqlite::SqlitePoolOptions, PgPool, Pool, Sqlite};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::repositories::{
    FileRepository, FileStore, SqliteFileRepository, SqliteUserRepository, UserRepository, UserStore,
};

/// Connection pool for whichever backend `DATABASE_URL` names.
#[derive(Clone)]
pub enum Database {
    Postgres(PgPool),
    Sqlite(Pool<Sqlite>),
}

impl Database {
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        if database_url.starts_with("sqlite:") {
            let pool = SqlitePoolOptions::new()
                .max_connections(max_connections)
                .acquire_timeout(Duration::from_secs(10))
                .connect(database_url)
                .await?;
            info!("Using SQLite backend");
            return Self::from_sqlite(pool).await;
        }

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(10))
            .connect(database_url)
            .await?;

        // Run migrations
        sqlx::migrate!("./migrations/postgres").run(&pool).await?;

        Ok(Self::Postgres(pool))
    }

    pub async fn from_sqlite(pool: Pool<Sqlite>) -> Result<Self> {
        sqlx::migrate!("./migrations/sqlite").run(&pool).await?;
        Ok(Self::Sqlite(pool))
    }

    pub fn file_store(&self) -> Arc<dyn FileStore> {
        match self {
            Self::Postgres(pool) => Arc::new(FileRepository::new(pool.clone())),
            Self::Sqlite(pool) => Arc::new(SqliteFileRepository::new(pool.clone())),
        }
    }

    pub fn user_store(&self) -> Arc<dyn UserStore> {
        match self {
            Self::Postgres(pool) => Arc::new(UserRepository::new(pool.clone())),
            Self::Sqlite(pool) => Arc::new(SqliteUserRepository::new(pool.clone())),
        }
    }

    pub fn backend(&self) -> &'static str {
        match self {
            Self::Postgres(_) => "postgres",
            Self::Sqlite(_) => "sqlite",
        }
    }

    pub async fn health_check(&self) -> Result<()> {
        match self {
            Self::Postgres(pool) => {
                sqlx::query("SELECT 1").execute(pool).await?;
            }
            Self::Sqlite(pool) => {
                sqlx::query("SELECT 1").execute(pool).await?;
            }
        }
        Ok(())
    }
}
