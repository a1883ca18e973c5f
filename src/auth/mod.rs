use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config;

/// Session claims issued by the external identity provider. The subject is
/// the provider-side user id; profile fields ride along for user resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(sub: String, email: Option<String>, name: Option<String>) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(24)).timestamp();

        Self {
            sub,
            email,
            name,
            avatar_url: None,
            exp,
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("Token generation error: {0}")]
    Generation(String),
    #[error("Invalid token: {0}")]
    Invalid(String),
    #[error("Identity secret not configured")]
    MissingSecret,
}

/// Issue a session token. Used by tests and local tooling; in deployment the
/// identity provider mints these.
pub fn issue_token(claims: &Claims) -> Result<String, TokenError> {
    let secret = &config::config().security.identity_jwt_secret;

    if secret.is_empty() {
        return Err(TokenError::MissingSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key)
        .map_err(|e| TokenError::Generation(e.to_string()))
}

/// Validate a bearer token against the identity provider's signing secret
/// and extract its claims.
pub fn verify_token(token: &str) -> Result<Claims, TokenError> {
    let secret = &config::config().security.identity_jwt_secret;

    if secret.is_empty() {
        return Err(TokenError::MissingSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::default();

    let token_data = decode::<Claims>(token, &decoding_key, &validation)
        .map_err(|e| TokenError::Invalid(e.to_string()))?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_and_verify_roundtrip() {
        let claims = Claims::new(
            "user_ext_1".to_string(),
            Some("a@example.com".to_string()),
            Some("Ada".to_string()),
        );
        let token = issue_token(&claims).expect("token");
        let decoded = verify_token(&token).expect("claims");

        assert_eq!(decoded.sub, "user_ext_1");
        assert_eq!(decoded.email.as_deref(), Some("a@example.com"));
    }

    #[test]
    fn rejects_garbage_token() {
        assert!(verify_token("not-a-jwt").is_err());
    }

    #[test]
    fn rejects_expired_token() {
        let mut claims = Claims::new("user_ext_2".to_string(), None, None);
        claims.exp = (Utc::now() - Duration::hours(2)).timestamp();
        claims.iat = (Utc::now() - Duration::hours(3)).timestamp();

        let token = issue_token(&claims).expect("token");
        assert!(verify_token(&token).is_err());
    }
}
