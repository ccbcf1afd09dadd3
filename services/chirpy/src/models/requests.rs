//! Request and response bodies of the HTTP API

use serde::{Deserialize, Serialize};

use crate::services::SessionTokens;

/// Request body for creating a user
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
}

/// Request body for changing the caller's email and/or password
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl UpdateUserRequest {
    pub fn is_empty(&self) -> bool {
        self.email.as_deref().is_none_or(str::is_empty)
            && self.password.as_deref().is_none_or(str::is_empty)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    /// Session lifetime; absent or non-positive means the configured default
    #[serde(default)]
    pub expires_in_seconds: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenResponse {
    pub token: String,
    pub refresh_token: String,
}

impl From<SessionTokens> for TokenResponse {
    fn from(tokens: SessionTokens) -> Self {
        Self {
            token: tokens.token,
            refresh_token: tokens.refresh_token,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChirpBody {
    pub body: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateChirpRequest {
    pub id: String,
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CleanedChirp {
    pub cleaned_body: String,
}

/// Query string of `GET /api/chirps`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChirpListQuery {
    pub author_id: Option<String>,
    pub sort: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookData {
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Payment provider event
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookRequest {
    pub event: String,
    #[serde(default)]
    pub data: WebhookData,
}
