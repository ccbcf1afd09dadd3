//! JWT service for session token issuance and validation
//!
//! Session tokens are HS256 JWTs signed with the shared `TOKEN_SECRET`.
//! Refresh tokens are opaque random strings; their persistence lifecycle
//! lives in [`crate::services::sessions`].

use base64::{Engine, engine::general_purpose::URL_SAFE};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::{RngCore, rngs::OsRng};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};

/// Issuer stamped into every session token
pub const ISSUER: &str = "chirpy";

/// Number of random bytes behind a refresh token
pub const REFRESH_TOKEN_BYTES: usize = 32;

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Issuer
    pub iss: String,
    /// User ID
    pub sub: Uuid,
    /// Issued at time
    pub iat: i64,
    /// Expiration time
    pub exp: i64,
}

/// JWT service
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtService {
    /// Initialize a new JWT service from the shared signing secret
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        validation.set_issuer(&[ISSUER]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        JwtService {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Issue a session token for `user_id` that expires after `ttl`
    pub fn issue_session_token(&self, user_id: Uuid, ttl: Duration) -> ApiResult<String> {
        let now = Utc::now().timestamp();
        let exp = now
            .checked_add(ttl.num_seconds())
            .ok_or_else(|| ApiError::Validation("Token lifetime is out of range".to_string()))?;
        let claims = Claims {
            iss: ISSUER.to_string(),
            sub: user_id,
            iat: now,
            exp,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| ApiError::Signing(e.to_string()))
    }

    /// Validate a session token and return its subject
    ///
    /// A token is expired from the second its `exp` is reached.
    pub fn validate_session_token(&self, token: &str) -> ApiResult<Uuid> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| ApiError::InvalidToken(e.to_string()))?;

        if Utc::now().timestamp() >= token_data.claims.exp {
            return Err(ApiError::InvalidToken("ExpiredSignature".to_string()));
        }

        Ok(token_data.claims.sub)
    }
}

/// Generate an opaque refresh token: 32 bytes from the OS RNG, base64url encoded
pub fn generate_refresh_token() -> ApiResult<String> {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| ApiError::Randomness(e.to_string()))?;

    Ok(URL_SAFE.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    fn encode_claims(claims: &Claims, secret: &str) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_issue_then_validate_returns_subject() {
        let service = JwtService::new(SECRET);
        let user_id = Uuid::new_v4();

        let token = service
            .issue_session_token(user_id, Duration::seconds(3600))
            .unwrap();

        assert_eq!(service.validate_session_token(&token).unwrap(), user_id);
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = JwtService::new(SECRET)
            .issue_session_token(Uuid::new_v4(), Duration::seconds(3600))
            .unwrap();

        let result = JwtService::new("another-secret").validate_session_token(&token);
        assert!(matches!(result, Err(ApiError::InvalidToken(_))));
    }

    #[test]
    fn test_zero_ttl_token_is_already_expired() {
        let service = JwtService::new(SECRET);
        let token = service
            .issue_session_token(Uuid::new_v4(), Duration::zero())
            .unwrap();

        let result = service.validate_session_token(&token);
        assert!(matches!(result, Err(ApiError::InvalidToken(_))));
    }

    #[test]
    fn test_elapsed_token_is_rejected() {
        let now = Utc::now().timestamp();
        let token = encode_claims(
            &Claims {
                iss: ISSUER.to_string(),
                sub: Uuid::new_v4(),
                iat: now - 120,
                exp: now - 60,
            },
            SECRET,
        );

        let result = JwtService::new(SECRET).validate_session_token(&token);
        assert!(matches!(result, Err(ApiError::InvalidToken(_))));
    }

    #[test]
    fn test_foreign_issuer_is_rejected() {
        let now = Utc::now().timestamp();
        let token = encode_claims(
            &Claims {
                iss: "someone-else".to_string(),
                sub: Uuid::new_v4(),
                iat: now,
                exp: now + 60,
            },
            SECRET,
        );

        let result = JwtService::new(SECRET).validate_session_token(&token);
        assert!(matches!(result, Err(ApiError::InvalidToken(_))));
    }

    #[test]
    fn test_garbage_is_rejected() {
        let result = JwtService::new(SECRET).validate_session_token("not.a.jwt");
        assert!(matches!(result, Err(ApiError::InvalidToken(_))));
    }

    #[test]
    fn test_refresh_tokens_are_random_and_url_safe() {
        let first = generate_refresh_token().unwrap();
        let second = generate_refresh_token().unwrap();

        assert_ne!(first, second);
        assert_eq!(first.len(), 44);
        assert!(
            first
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '=')
        );
        assert_eq!(URL_SAFE.decode(&first).unwrap().len(), REFRESH_TOKEN_BYTES);
    }
}
