//! Refresh token model and related functionality

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Persisted refresh token
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RefreshToken {
    pub token: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl RefreshToken {
    /// Build a new record valid for `ttl` starting now
    ///
    /// `None` when the expiry falls outside the representable date range.
    pub fn new(token: String, user_id: Uuid, ttl: Duration) -> Option<Self> {
        let now = Utc::now();
        let expires_at = now.checked_add_signed(ttl)?;
        Some(Self {
            token,
            user_id,
            created_at: now,
            updated_at: now,
            expires_at,
            revoked_at: None,
        })
    }

    /// Total lifetime the record was issued with
    pub fn lifetime(&self) -> Duration {
        self.expires_at - self.created_at
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }
}
