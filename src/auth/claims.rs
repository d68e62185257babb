use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AuthError, Identity};

/// Audience carried by access tokens issued to signed-in users.
pub const AUTHENTICATED_AUDIENCE: &str = "authenticated";

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub aud: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(identity: &Identity, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: identity.id,
            email: identity.email.clone(),
            aud: AUTHENTICATED_AUDIENCE.to_string(),
            role: AUTHENTICATED_AUDIENCE.to_string(),
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
        }
    }
}

/// Sign an access token with the project's shared secret.
pub fn generate_token(identity: &Identity, secret: &str, ttl: Duration) -> Result<String, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::InvalidToken("JWT secret not configured".to_string()));
    }
    let key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::new(Algorithm::HS256), &Claims::new(identity, ttl), &key)
        .map_err(|e| AuthError::InvalidToken(format!("token generation failed: {}", e)))
}

/// Verify an access token locally and return the identity it names.
pub fn validate_access_token(token: &str, secret: &str) -> Result<Identity, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::InvalidToken("JWT secret not configured".to_string()));
    }
    let key = DecodingKey::from_secret(secret.as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[AUTHENTICATED_AUDIENCE]);

    let data = decode::<Claims>(token, &key, &validation).map_err(|e| AuthError::InvalidToken(e.to_string()))?;
    Ok(Identity { id: data.claims.sub, email: data.claims.email })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> Identity {
        Identity { id: Uuid::new_v4(), email: Some("fan@rgfamily.com".to_string()) }
    }

    #[test]
    fn signed_tokens_verify_with_the_same_secret() {
        let who = identity();
        let token = generate_token(&who, "secret", Duration::hours(1)).unwrap();
        assert_eq!(validate_access_token(&token, "secret").unwrap(), who);
    }

    #[test]
    fn wrong_secret_and_expired_tokens_are_rejected() {
        let who = identity();
        let token = generate_token(&who, "secret", Duration::hours(1)).unwrap();
        assert!(matches!(validate_access_token(&token, "other"), Err(AuthError::InvalidToken(_))));

        let expired = generate_token(&who, "secret", Duration::hours(-2)).unwrap();
        assert!(validate_access_token(&expired, "secret").is_err());
    }

    #[test]
    fn empty_secret_is_refused() {
        assert!(generate_token(&identity(), "", Duration::hours(1)).is_err());
        assert!(validate_access_token("a.b.c", "").is_err());
    }
}
