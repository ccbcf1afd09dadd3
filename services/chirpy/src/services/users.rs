//! User account management

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    auth::{hash_password, verify_password},
    error::{ApiError, ApiResult},
    models::{UpdateUser, User},
    repositories::UserRepository,
    services::sessions::{SessionService, SessionTokens},
};

/// User account manager
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
    sessions: SessionService,
    default_ttl: Duration,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl UserService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        sessions: SessionService,
        default_ttl: Duration,
    ) -> Self {
        Self {
            users,
            sessions,
            default_ttl,
        }
    }

    /// Register a new user with a hashed password
    pub async fn register(&self, email: &str, password: &str) -> ApiResult<User> {
        let hashed_password = hash_password(password)?;
        let user = self
            .users
            .create(&User::new(email.to_string(), hashed_password))
            .await?;

        info!("Registered user {} ({})", user.id, user.email);
        Ok(user)
    }

    /// Check credentials and start a session
    ///
    /// `ttl_seconds` that is absent or not positive falls back to the
    /// configured default.
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
        ttl_seconds: Option<i64>,
    ) -> ApiResult<(User, SessionTokens)> {
        info!("Login attempt for user: {}", email);

        let ttl = match ttl_seconds.filter(|secs| *secs > 0) {
            Some(secs) => Duration::try_seconds(secs).ok_or_else(|| {
                ApiError::Validation("expires_in_seconds is out of range".to_string())
            })?,
            None => self.default_ttl,
        };

        for user in self.users.find_by_email(email).await? {
            if verify_password(password, &user.hashed_password)? {
                let tokens = self.sessions.start_session(user.id, ttl).await?;
                return Ok((user, tokens));
            }
        }

        warn!("Rejected login for user: {}", email);
        Err(ApiError::Unauthorized(
            "Invalid email or password".to_string(),
        ))
    }

    /// Change the caller's email and/or password
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        email: Option<String>,
        password: Option<String>,
    ) -> ApiResult<User> {
        let email = non_empty(email);
        let password = non_empty(password);
        if email.is_none() && password.is_none() {
            return Err(ApiError::Validation(
                "Email or password are required".to_string(),
            ));
        }

        self.find_by_id(user_id).await?;

        let hashed_password = password.as_deref().map(hash_password).transpose()?;
        let changes = UpdateUser {
            email,
            hashed_password,
            updated_at: Some(Utc::now()),
        };

        let user = self
            .users
            .update(user_id, &changes)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        info!("Updated profile of user: {}", user.id);
        Ok(user)
    }

    /// Mark a user as a paying subscriber
    pub async fn set_subscription_flag(&self, user_id: Uuid) -> ApiResult<User> {
        let user = self
            .users
            .set_chirpy_red(user_id, Utc::now())
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        info!("User {} upgraded to Chirpy Red", user.id);
        Ok(user)
    }

    pub async fn find_by_id(&self, user_id: Uuid) -> ApiResult<User> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
    }

    /// Delete every user; chirps and refresh tokens go with them
    pub async fn delete_all(&self) -> ApiResult<u64> {
        let deleted = self.users.delete_all().await?;
        warn!("Deleted all {} users", deleted);
        Ok(deleted)
    }
}
