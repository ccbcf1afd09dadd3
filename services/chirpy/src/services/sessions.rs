//! Session issuance and the refresh token lifecycle

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    auth::{JwtService, generate_refresh_token},
    error::{ApiError, ApiResult},
    models::RefreshToken,
    repositories::RefreshTokenRepository,
};

/// A freshly minted session token and its companion refresh token
#[derive(Debug, Clone)]
pub struct SessionTokens {
    pub token: String,
    pub refresh_token: String,
}

/// Session manager backed by persisted refresh tokens
#[derive(Clone)]
pub struct SessionService {
    refresh_tokens: Arc<dyn RefreshTokenRepository>,
    jwt_service: JwtService,
}

impl SessionService {
    pub fn new(refresh_tokens: Arc<dyn RefreshTokenRepository>, jwt_service: JwtService) -> Self {
        Self {
            refresh_tokens,
            jwt_service,
        }
    }

    /// Persist a refresh token for `user_id`, valid for `ttl` from now
    pub async fn create_refresh_token_record(
        &self,
        token: &str,
        user_id: Uuid,
        ttl: Duration,
    ) -> ApiResult<RefreshToken> {
        let record = RefreshToken::new(token.to_string(), user_id, ttl)
            .ok_or_else(|| ApiError::Validation("Token lifetime is out of range".to_string()))?;
        Ok(self.refresh_tokens.create(&record).await?)
    }

    pub async fn lookup_refresh_token(&self, token: &str) -> ApiResult<RefreshToken> {
        self.refresh_tokens
            .find_by_token(token)
            .await?
            .ok_or_else(|| ApiError::NotFound("Refresh token not found".to_string()))
    }

    /// Look the token up and require it to be neither expired nor revoked
    async fn usable_refresh_token(&self, token: &str) -> ApiResult<RefreshToken> {
        let record = self.lookup_refresh_token(token).await?;

        if record.is_expired_at(Utc::now()) {
            warn!("Refresh token for user {} has expired", record.user_id);
            return Err(ApiError::Expired("Refresh token expired".to_string()));
        }
        if record.is_revoked() {
            warn!("Refresh token for user {} was revoked", record.user_id);
            return Err(ApiError::Revoked("Refresh token revoked".to_string()));
        }

        Ok(record)
    }

    /// Issue a session token and a persisted refresh token, both living `ttl`
    pub async fn start_session(&self, user_id: Uuid, ttl: Duration) -> ApiResult<SessionTokens> {
        let token = self.jwt_service.issue_session_token(user_id, ttl)?;
        let refresh_token = generate_refresh_token()?;
        self.create_refresh_token_record(&refresh_token, user_id, ttl)
            .await?;

        info!("Started session for user: {}", user_id);
        Ok(SessionTokens {
            token,
            refresh_token,
        })
    }

    /// Exchange a usable refresh token for a new token pair
    ///
    /// Both new tokens get the old record's total lifetime. The presented
    /// refresh token stays active.
    pub async fn refresh_session(&self, refresh_token: &str) -> ApiResult<SessionTokens> {
        let record = self.usable_refresh_token(refresh_token).await?;

        info!("Refreshing session for user: {}", record.user_id);
        self.start_session(record.user_id, record.lifetime()).await
    }

    /// Revoke a usable refresh token; revoking twice is rejected
    pub async fn revoke_refresh_token(&self, refresh_token: &str) -> ApiResult<()> {
        let record = self.usable_refresh_token(refresh_token).await?;

        self.refresh_tokens
            .revoke(&record.token, Utc::now())
            .await?
            .ok_or_else(|| ApiError::NotFound("Refresh token not found".to_string()))?;

        info!("Revoked refresh token for user: {}", record.user_id);
        Ok(())
    }
}
