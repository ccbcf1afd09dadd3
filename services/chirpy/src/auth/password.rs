//! One-way password hashing with Argon2id

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{self, SaltString},
};
use rand::rngs::OsRng;

use crate::error::{ApiError, ApiResult};

/// Hash a password into a self-describing PHC string
pub fn hash_password(password: &str) -> ApiResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ApiError::Hashing(format!("Failed to hash password: {}", e)))?
        .to_string();

    Ok(password_hash)
}

/// Check a password against a stored hash
///
/// A mismatch is `Ok(false)`; only a hash that cannot be parsed or
/// evaluated is an error.
pub fn verify_password(password: &str, hash: &str) -> ApiResult<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| ApiError::Hashing(format!("Failed to parse password hash: {}", e)))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(ApiError::Hashing(format!(
            "Failed to verify password: {}",
            e
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let hash = hash_password("04234").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("04234", &hash).unwrap());
    }

    #[test]
    fn test_wrong_password_does_not_match() {
        let hash = hash_password("correct horse").unwrap();
        assert!(!verify_password("battery staple", &hash).unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        let first = hash_password("same").unwrap();
        let second = hash_password("same").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        let result = verify_password("anything", "not-a-phc-string");
        assert!(matches!(result, Err(ApiError::Hashing(_))));
    }
}
