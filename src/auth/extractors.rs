use axum::extract::FromRequestParts;
use axum::http::{header::AUTHORIZATION, request::Parts, HeaderMap};
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

use crate::auth::{claims::SessionClaims, errors::AuthError, jwt::TokenService};
use crate::config::AppConfig;
use crate::database::Database;
use crate::graphql::{build_schema, FileSchema};
use crate::models::User;
use crate::repositories::UserStore;
use crate::services::FileService;

/// Shared state of the HTTP application.
#[derive(Clone)]
pub struct AppState {
    pub database: Database,
    pub file_service: FileService,
    pub users: Arc<dyn UserStore>,
    pub schema: FileSchema,
    pub tokens: TokenService,
    pub startup_time: Instant,
}

impl AppState {
    pub fn new(database: Database, config: &AppConfig) -> anyhow::Result<Self> {
        let tokens = TokenService::new(&config.auth)?;
        // One store instance per process so backend-level locks are shared.
        let file_service = FileService::new(database.file_store());

        Ok(Self {
            schema: build_schema(file_service.clone()),
            users: database.user_store(),
            database,
            file_service,
            tokens,
            startup_time: Instant::now(),
        })
    }
}

/// The caller behind a valid bearer token. Rejects the request otherwise.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
    pub claims: SessionClaims,
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;
        resolve_session(state, token).await
    }
}

/// Like [`CurrentUser`], but leaves the rejection to the handler.
pub struct MaybeUser(pub Option<CurrentUser>);

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Ok(token) = bearer_token(&parts.headers) else {
            return Ok(MaybeUser(None));
        };

        match resolve_session(state, token).await {
            Ok(user) => Ok(MaybeUser(Some(user))),
            Err(e) => {
                debug!("Ignoring bearer token: {}", e);
                Ok(MaybeUser(None))
            }
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::MalformedHeader)?;

    value.strip_prefix("Bearer ").map(str::trim).filter(|token| !token.is_empty()).ok_or(AuthError::MalformedHeader)
}

/// A token only counts while its subject exists and is active.
async fn resolve_session(state: &AppState, token: &str) -> Result<CurrentUser, AuthError> {
    let claims = state.tokens.verify(token)?;

    let user = state.users.get_user(&claims.sub).await?.ok_or_else(|| {
        warn!("Token presented for unknown user {}", claims.sub);
        AuthError::UnknownUser
    })?;

    if !user.active {
        warn!("Disabled account {} presented a token", user.username);
        return Err(AuthError::Disabled);
    }

    Ok(CurrentUser { user, claims })
}
