//! Custom error types for the Chirpy service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::error::DatabaseError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Custom error type for the Chirpy service
///
/// Every handler failure is rendered as `{"error": "<message>"}`.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Malformed, missing or oversized input
    #[error("{0}")]
    Validation(String),

    /// Credentials were supplied but do not identify anyone
    #[error("{0}")]
    Unauthorized(String),

    /// Session token failed signature, format or expiry checks
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Authorization header missing or in the wrong scheme
    #[error("{0}")]
    AuthHeader(String),

    /// Authenticated, but not the owner of the resource
    #[error("{0}")]
    Forbidden(String),

    /// Record does not exist
    #[error("{0}")]
    NotFound(String),

    /// Refresh token is past its expiry
    #[error("{0}")]
    Expired(String),

    /// Refresh token was revoked
    #[error("{0}")]
    Revoked(String),

    /// Persistence failure
    #[error("Database error: {0}")]
    Storage(#[from] DatabaseError),

    /// Password hashing or verification failure
    #[error("Hashing error: {0}")]
    Hashing(String),

    /// The secure RNG could not supply entropy
    #[error("Randomness error: {0}")]
    Randomness(String),

    /// Session token could not be signed
    #[error("Signing error: {0}")]
    Signing(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_)
            | ApiError::InvalidToken(_)
            | ApiError::AuthHeader(_)
            | ApiError::Expired(_)
            | ApiError::Revoked(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Storage(_)
            | ApiError::Hashing(_)
            | ApiError::Randomness(_)
            | ApiError::Signing(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_message = match &self {
            ApiError::Storage(e) => {
                error!("Storage failure: {}", e);
                "Database error".to_string()
            }
            ApiError::Hashing(e) => {
                error!("Password hashing failure: {}", e);
                "Internal server error".to_string()
            }
            ApiError::Randomness(e) => {
                error!("Random token generation failure: {}", e);
                "Internal server error".to_string()
            }
            ApiError::Signing(e) => {
                error!("Failed to sign session token: {}", e);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
