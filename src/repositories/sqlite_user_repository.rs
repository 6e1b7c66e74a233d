use anyhow::Result;
use async_trait::async_trait;
use sqlx::{Pool, Sqlite};

use super::{UserKey, UserStore, USER_COLUMNS};
use crate::models::User;

pub struct SqliteUserRepository {
    pool: Pool<Sqlite>,
}

impl SqliteUserRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    async fn find_one(&self, key: UserKey, value: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE {} = ?1",
            key.column()
        ))
        .bind(value)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }
}

#[async_trait]
impl UserStore for SqliteUserRepository {
    async fn create_user(&self, user: &User) -> Result<User> {
        sqlx::query(&format!("INSERT INTO users ({USER_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"))
            .bind(&user.id)
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.active)
            .bind(user.created_at)
            .bind(user.updated_at)
            .execute(&self.pool)
            .await?;

        self.find_one(UserKey::Id, &user.id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("User {} vanished after insert", user.id))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        self.find_one(UserKey::Username, username).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        self.find_one(UserKey::Email, email).await
    }

    async fn get_user(&self, id: &str) -> Result<Option<User>> {
        self.find_one(UserKey::Id, id).await
    }

    async fn count_users(&self) -> Result<i64> {
        Ok(sqlx::query_scalar("SELECT COUNT(*) FROM users").fetch_one(&self.pool).await?)
    }
}
