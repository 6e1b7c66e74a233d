//! Bearer-token sessions: signing, verification and the axum extractors that
//! resolve a token to an active user.

pub mod claims;
pub mod errors;
pub mod extractors;
pub mod jwt;

pub use claims::SessionClaims;
pub use errors::AuthError;
pub use extractors::{AppState, CurrentUser, MaybeUser};
pub use jwt::TokenService;
