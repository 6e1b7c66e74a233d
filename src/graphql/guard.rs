use async_graphql::{Context, Error, ErrorExtensions};

use crate::auth::extractors::CurrentUser;

pub const UNAUTHENTICATED: &str = "UNAUTHENTICATED";

/// Identity attached to an executing request.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: String,
    pub username: String,
}

impl From<&CurrentUser> for Session {
    fn from(user: &CurrentUser) -> Self {
        Self { user_id: user.user.id.clone(), username: user.claims.username.clone() }
    }
}

pub fn unauthenticated_error() -> Error {
    Error::new("You don't have permission to do that.").extend_with(|_, e| e.set("code", UNAUTHENTICATED))
}

/// Every resolver calls this before touching the file service.
pub fn require_auth<'a>(ctx: &'a Context<'_>) -> Result<&'a Session, Error> {
    ctx.data_opt::<Session>().ok_or_else(unauthenticated_error)
}
