//! Refresh token repository for database operations

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::error::{DatabaseError, DatabaseResult};
use sqlx::PgPool;

use super::RefreshTokenRepository;
use crate::models::RefreshToken;

const TOKEN_COLUMNS: &str = "token, user_id, created_at, updated_at, expires_at, revoked_at";

/// Refresh token repository for database operations
#[derive(Clone)]
pub struct PgRefreshTokenRepository {
    pool: PgPool,
}

impl PgRefreshTokenRepository {
    /// Create a new refresh token repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RefreshTokenRepository for PgRefreshTokenRepository {
    async fn create(&self, token: &RefreshToken) -> DatabaseResult<RefreshToken> {
        sqlx::query_as::<_, RefreshToken>(&format!(
            r#"
            INSERT INTO refresh_tokens (token, user_id, created_at, updated_at, expires_at, revoked_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {TOKEN_COLUMNS}
            "#
        ))
        .bind(&token.token)
        .bind(token.user_id)
        .bind(token.created_at)
        .bind(token.updated_at)
        .bind(token.expires_at)
        .bind(token.revoked_at)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_query)
    }

    async fn find_by_token(&self, token: &str) -> DatabaseResult<Option<RefreshToken>> {
        sqlx::query_as::<_, RefreshToken>(&format!(
            "SELECT {TOKEN_COLUMNS} FROM refresh_tokens WHERE token = $1"
        ))
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::Query)
    }

    async fn revoke(&self, token: &str, at: DateTime<Utc>) -> DatabaseResult<Option<RefreshToken>> {
        sqlx::query_as::<_, RefreshToken>(&format!(
            r#"
            UPDATE refresh_tokens
            SET revoked_at = $2, updated_at = $2
            WHERE token = $1
            RETURNING {TOKEN_COLUMNS}
            "#
        ))
        .bind(token)
        .bind(at)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::Query)
    }
}
