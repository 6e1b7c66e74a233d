use anyhow::Result;
use chrono::Utc;
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::api::auth::hash_password;
use crate::auth::extractors::AppState;
use crate::config::AppConfig;
use crate::database::Database;
use crate::models::User;

static TEST_DB_COUNTER: AtomicUsize = AtomicUsize::new(0);

pub const TEST_JWT_SECRET: &str = "test-secret-key-for-jwt-authentication";

/// Create an isolated in-memory SQLite database for testing
pub async fn create_test_database() -> Result<Database> {
    let counter = TEST_DB_COUNTER.fetch_add(1, Ordering::SeqCst);
    let db_name = format!("file:filebox_test_db_{}?mode=memory&cache=shared", counter);

    let pool = SqlitePoolOptions::new()
        .max_connections(1) // SQLite in-memory works best with single connection
        .connect(&db_name)
        .await?;

    Database::from_sqlite(pool).await
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::defaults();
    config.database.url = "sqlite::memory:".to_string();
    config.auth.jwt_secret = TEST_JWT_SECRET.to_string();
    config.auth.jwt_expires_in = "1h".to_string();
    config
}

/// Application state over a fresh in-memory database.
pub async fn create_test_app_state() -> Result<AppState> {
    let database = create_test_database().await?;
    AppState::new(database, &test_config())
}

/// Inserts an active user and returns it with a bearer token for it.
pub async fn create_test_user(app_state: &AppState, username: &str) -> Result<(User, String)> {
    let now = Utc::now();
    let user = User {
        id: uuid::Uuid::new_v4().to_string(),
        username: username.to_string(),
        email: format!("{}@filebox.test", username),
        password_hash: hash_password("password123")?,
        active: true,
        created_at: now,
        updated_at: now,
    };
    let user = app_state.users.create_user(&user).await?;
    let token = app_state.tokens.issue(&user)?;
    Ok((user, token))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_isolated_databases() {
        let db1 = create_test_database().await.unwrap();
        let db2 = create_test_database().await.unwrap();

        let store1 = db1.file_store();
        let store2 = db2.file_store();

        store1
            .create_file(&crate::models::CreateFileInput {
                name: "one.txt".to_string(),
                url: "https://cdn.example.com/one".to_string(),
                file_type: "text/plain".to_string(),
                version: 1,
            })
            .await
            .unwrap();

        assert_eq!(store1.count_files().await.unwrap(), 1);
        assert_eq!(store2.count_files().await.unwrap(), 0);
    }
}
