use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::graphql::{BAD_USER_INPUT, INTERNAL_SERVER_ERROR, UNAUTHENTICATED};

/// Failures of the REST auth endpoints and the bearer-token extractors.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Missing bearer token")]
    MissingToken,
    #[error("Authorization header is not a bearer token")]
    MalformedHeader,
    #[error("Invalid token: {0}")]
    InvalidToken(String),
    #[error("Token expired")]
    Expired,
    #[error("Token subject no longer exists")]
    UnknownUser,
    #[error("Account is disabled")]
    Disabled,
    #[error("Invalid username or password")]
    BadCredentials,
    #[error("{0}")]
    BadRequest(String),
    #[error("{0} already exists")]
    Conflict(&'static str),
    #[error("Setup already completed")]
    SetupDone,
    #[error("Store error: {0}")]
    Store(String),
}

impl From<anyhow::Error> for AuthError {
    fn from(e: anyhow::Error) -> Self {
        error!("User store failed: {:?}", e);
        AuthError::Store(e.to_string())
    }
}

impl AuthError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AuthError::MissingToken
            | AuthError::MalformedHeader
            | AuthError::InvalidToken(_)
            | AuthError::Expired
            | AuthError::UnknownUser
            | AuthError::Disabled
            | AuthError::BadCredentials => (StatusCode::UNAUTHORIZED, UNAUTHENTICATED),
            AuthError::BadRequest(_) => (StatusCode::BAD_REQUEST, BAD_USER_INPUT),
            AuthError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            AuthError::SetupDone => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            AuthError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_SERVER_ERROR),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        // Token details stay in the logs.
        let message = match &self {
            AuthError::InvalidToken(_) | AuthError::Expired | AuthError::UnknownUser => {
                "Invalid or expired token".to_string()
            }
            AuthError::Store(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };

        (status, Json(json!({ "error": message, "code": code }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statuses() {
        assert_eq!(AuthError::BadCredentials.status_and_code().0, StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::Conflict("Username").status_and_code().0, StatusCode::CONFLICT);
        assert_eq!(AuthError::SetupDone.status_and_code().0, StatusCode::FORBIDDEN);
        assert_eq!(AuthError::BadRequest("x".into()).status_and_code().1, BAD_USER_INPUT);
    }

    #[test]
    fn test_conflict_message_names_field() {
        assert_eq!(AuthError::Conflict("Email").to_string(), "Email already exists");
    }
}
