use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::models::User;

/// JWT payload of a signed-in session.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SessionClaims {
    /// User id.
    pub sub: String,
    pub username: String,
    pub iat: i64,
    pub exp: i64,
}

impl SessionClaims {
    pub fn for_user(user: &User, ttl: Duration) -> Self {
        let now = Utc::now();
        Self { sub: user.id.clone(), username: user.username.clone(), iat: now.timestamp(), exp: (now + ttl).timestamp() }
    }
}
