use anyhow::{anyhow, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::auth::{AppState, AuthError, CurrentUser};
use crate::models::User;

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Body of both `/register` and the first-account `/setup`.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 50))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6))]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SetupCheckResponse {
    pub needs_setup: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub token: String,
    pub user: Profile,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub username: String,
    pub email: String,
}

impl From<User> for Profile {
    fn from(user: User) -> Self {
        Self { id: user.id, username: user.username, email: user.email }
    }
}

pub async fn create_router() -> Result<Router<AppState>> {
    let router = Router::new()
        .route("/setup/check", get(setup_check))
        .route("/setup", post(setup))
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/profile", get(profile));

    Ok(router)
}

async fn setup_check(State(state): State<AppState>) -> Result<Json<SetupCheckResponse>, AuthError> {
    let needs_setup = state.users.count_users().await? == 0;
    Ok(Json(SetupCheckResponse { needs_setup }))
}

/// Creates the first account; refused once any user exists.
async fn setup(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<SessionResponse>, AuthError> {
    if state.users.count_users().await? > 0 {
        return Err(AuthError::SetupDone);
    }

    let user = create_account(&state, req).await?;
    info!("Setup created first account {}", user.username);
    session(&state, user)
}

async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<SessionResponse>, AuthError> {
    let user = create_account(&state, req).await?;
    info!("Registered {}", user.username);
    session(&state, user)
}

async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, AuthError> {
    let Some(user) = state.users.find_by_username(&req.username).await? else {
        warn!("Login for unknown user {}", req.username);
        return Err(AuthError::BadCredentials);
    };

    if !verify_password(&req.password, &user.password_hash).unwrap_or(false) {
        warn!("Wrong password for {}", req.username);
        return Err(AuthError::BadCredentials);
    }
    if !user.active {
        return Err(AuthError::Disabled);
    }

    session(&state, user)
}

async fn profile(current: CurrentUser) -> Json<Profile> {
    Json(Profile::from(current.user))
}

async fn create_account(state: &AppState, req: RegisterRequest) -> Result<User, AuthError> {
    req.validate().map_err(|e| AuthError::BadRequest(e.to_string()))?;

    if state.users.find_by_username(&req.username).await?.is_some() {
        return Err(AuthError::Conflict("Username"));
    }
    if state.users.find_by_email(&req.email).await?.is_some() {
        return Err(AuthError::Conflict("Email"));
    }

    let now = Utc::now();
    let user = User {
        id: Uuid::new_v4().to_string(),
        username: req.username,
        email: req.email,
        password_hash: hash_password(&req.password)?,
        active: true,
        created_at: now,
        updated_at: now,
    };

    Ok(state.users.create_user(&user).await?)
}

fn session(state: &AppState, user: User) -> Result<Json<SessionResponse>, AuthError> {
    let token = state.tokens.issue(&user)?;
    Ok(Json(SessionResponse { token, user: Profile::from(user) }))
}

pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| anyhow!("Password hashing failed: {}", e))
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| anyhow!("Stored password hash is malformed: {}", e))?;
    Ok(Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_verifies_only_original() {
        let hash = hash_password("correct horse").unwrap();
        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("battery staple", &hash).unwrap());
    }

    #[test]
    fn test_verify_rejects_malformed_hash() {
        assert!(verify_password("anything", "not-a-phc-string").is_err());
    }

    #[test]
    fn test_register_request_validation() {
        let request = RegisterRequest {
            username: "ab".to_string(),
            email: "not-an-email".to_string(),
            password: "123".to_string(),
        };
        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("username"));
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }
}
