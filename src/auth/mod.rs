use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::config;

/// Claims carried by a dashboard session token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: Uuid,
    pub email: String,
    pub exp: i64,
    pub iat: i64,
}

impl SessionClaims {
    /// Claims expiring after the configured session lifetime
    pub fn new(user_id: Uuid, email: impl Into<String>) -> Self {
        Self::with_expiry_hours(user_id, email, config().security.session_expiry_hours)
    }

    pub fn with_expiry_hours(user_id: Uuid, email: impl Into<String>, expiry_hours: u64) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            sub: user_id,
            email: email.into(),
            exp,
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session secret not configured")]
    MissingSecret,

    #[error("Session token generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid session token: {0}")]
    InvalidToken(String),
}

/// Sign a session token (HS256)
pub fn issue_session_token(claims: &SessionClaims, secret: &str) -> Result<String, SessionError> {
    if secret.is_empty() {
        return Err(SessionError::MissingSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key).map_err(|e| SessionError::TokenGeneration(e.to_string()))
}

/// Validate signature and expiry of a session token
pub fn verify_session_token(token: &str, secret: &str) -> Result<SessionClaims, SessionError> {
    if secret.is_empty() {
        return Err(SessionError::MissingSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let token_data = decode::<SessionClaims>(token, &decoding_key, &Validation::default())
        .map_err(|e| SessionError::InvalidToken(e.to_string()))?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn lifetime_defaults_to_configured_expiry() {
        let claims = SessionClaims::new(Uuid::new_v4(), "user@nextmail.com");
        let hours = config().security.session_expiry_hours as i64;
        assert_eq!(claims.exp - claims.iat, hours * 3600);

        let short = SessionClaims::with_expiry_hours(Uuid::new_v4(), "user@nextmail.com", 2);
        assert_eq!(short.exp - short.iat, 2 * 3600);
    }

    #[test]
    fn issued_token_verifies() {
        let claims = SessionClaims::new(Uuid::new_v4(), "user@nextmail.com");
        let token = issue_session_token(&claims, SECRET).unwrap();
        assert_eq!(verify_session_token(&token, SECRET).unwrap(), claims);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let claims = SessionClaims::new(Uuid::new_v4(), "user@nextmail.com");
        let token = issue_session_token(&claims, SECRET).unwrap();
        assert!(matches!(
            verify_session_token(&token, "other"),
            Err(SessionError::InvalidToken(_))
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let mut claims = SessionClaims::new(Uuid::new_v4(), "user@nextmail.com");
        claims.exp = Utc::now().timestamp() - 3600;
        let token = issue_session_token(&claims, SECRET).unwrap();
        assert!(verify_session_token(&token, SECRET).is_err());
    }

    #[test]
    fn empty_secret_is_refused() {
        let claims = SessionClaims::new(Uuid::new_v4(), "user@nextmail.com");
        assert!(matches!(issue_session_token(&claims, ""), Err(SessionError::MissingSecret)));
        assert!(matches!(verify_session_token("x.y.z", ""), Err(SessionError::MissingSecret)));
    }
}
