use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;

use super::{UserKey, UserStore, USER_COLUMNS};
use crate::models::User;

pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_one(&self, key: UserKey, value: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE {} = $1",
            key.column()
        ))
        .bind(value)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn create_user(&self, user: &User) -> Result<User> {
        let created = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users ({USER_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {USER_COLUMNS}"
        ))
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.active)
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
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
