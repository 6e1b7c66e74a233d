use anyhow::{anyhow, bail, Result};
use chrono::Duration;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

use crate::auth::claims::SessionClaims;
use crate::auth::errors::AuthError;
use crate::config::AuthConfig;
use crate::models::User;

/// Signs and verifies HS256 session tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    pub fn new(config: &AuthConfig) -> Result<Self> {
        if config.jwt_secret.is_empty() {
            bail!("JWT_SECRET must not be empty");
        }
        let secret = config.jwt_secret.as_bytes();

        let mut validation = Validation::default();
        validation.leeway = 0;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl: parse_ttl(&config.jwt_expires_in)?,
        })
    }

    pub fn issue(&self, user: &User) -> Result<String> {
        encode(&Header::default(), &SessionClaims::for_user(user, self.ttl), &self.encoding_key)
            .map_err(|e| anyhow!("Failed to sign token: {}", e))
    }

    pub fn verify(&self, token: &str) -> Result<SessionClaims, AuthError> {
        decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::InvalidToken(e.to_string()),
            })
    }
}

/// Parses lifetimes such as `24h`, `7d`, `30m` or `45s`; a bare number is hours.
fn parse_ttl(value: &str) -> Result<Duration> {
    let value = value.trim();
    let (amount, unit) = match value.char_indices().last() {
        Some((index, unit)) if unit.is_ascii_alphabetic() => (&value[..index], unit),
        _ => (value, 'h'),
    };
    let amount: i64 = amount.parse().map_err(|_| anyhow!("Invalid token lifetime: {:?}", value))?;

    match unit {
        's' => Ok(Duration::seconds(amount)),
        'm' => Ok(Duration::minutes(amount)),
        'h' => Ok(Duration::hours(amount)),
        'd' => Ok(Duration::days(amount)),
        _ => bail!("Invalid token lifetime unit in {:?}", value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn tokens(secret: &str, expires_in: &str) -> TokenService {
        TokenService::new(&AuthConfig { jwt_secret: secret.to_string(), jwt_expires_in: expires_in.to_string() })
            .unwrap()
    }

    fn alice() -> User {
        User {
            id: "user-1".to_string(),
            username: "alice".to_string(),
            email: "alice@filebox.test".to_string(),
            password_hash: String::new(),
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_issued_token_verifies() {
        let service = tokens("unit-test-secret", "2h");
        let claims = service.verify(&service.issue(&alice()).unwrap()).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.exp - claims.iat, 2 * 3600);
    }

    #[test]
    fn test_other_secret_is_rejected() {
        let token = tokens("unit-test-secret", "1h").issue(&alice()).unwrap();
        assert!(matches!(tokens("another-secret", "1h").verify(&token), Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn test_expired_token_is_reported() {
        let service = tokens("unit-test-secret", "-5m");
        let token = service.issue(&alice()).unwrap();
        assert!(matches!(service.verify(&token), Err(AuthError::Expired)));
    }

    #[test]
    fn test_parse_ttl_units() {
        assert_eq!(parse_ttl("30m").unwrap(), Duration::minutes(30));
        assert_eq!(parse_ttl("7d").unwrap(), Duration::days(7));
        assert_eq!(parse_ttl("45s").unwrap(), Duration::seconds(45));
        assert_eq!(parse_ttl("3").unwrap(), Duration::hours(3));
        assert!(parse_ttl("soon").is_err());
        assert!(parse_ttl("5w").is_err());
    }

    #[test]
    fn test_empty_secret_is_refused() {
        assert!(TokenService::new(&AuthConfig { jwt_secret: String::new(), jwt_expires_in: "1h".to_string() }).is_err());
    }
}
