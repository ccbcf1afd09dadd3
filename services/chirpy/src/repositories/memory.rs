//! In-process implementation of every repository trait
//!
//! Mirrors the PostgreSQL schema: unique emails, and deleting a user
//! removes their chirps and refresh tokens.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::error::{DatabaseError, DatabaseResult};
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use super::{ChirpRepository, RefreshTokenRepository, UserRepository};
use crate::models::{Chirp, RefreshToken, UpdateUser, User};

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    /// Insertion order, so listings are stable for equal timestamps
    chirps: Vec<Chirp>,
    refresh_tokens: HashMap<String, RefreshToken>,
}

impl Tables {
    fn email_taken(&self, email: &str, except: Option<Uuid>) -> bool {
        self.users
            .values()
            .any(|u| u.email == email && Some(u.id) != except)
    }
}

/// In-memory store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, user: &User) -> DatabaseResult<User> {
        let mut tables = self.tables.write().await;

        if tables.users.contains_key(&user.id) {
            return Err(DatabaseError::Conflict("users_pkey".to_string()));
        }
        if tables.email_taken(&user.email, None) {
            return Err(DatabaseError::Conflict("users_email_key".to_string()));
        }

        info!("Creating new user: {}", user.email);
        tables.users.insert(user.id, user.clone());
        Ok(user.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> DatabaseResult<Vec<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .filter(|u| u.email == email)
            .cloned()
            .collect())
    }

    async fn update(&self, id: Uuid, changes: &UpdateUser) -> DatabaseResult<Option<User>> {
        let mut tables = self.tables.write().await;

        if let Some(email) = &changes.email {
            if tables.email_taken(email, Some(id)) {
                return Err(DatabaseError::Conflict("users_email_key".to_string()));
            }
        }

        let Some(user) = tables.users.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(email) = &changes.email {
            user.email = email.clone();
        }
        if let Some(hashed_password) = &changes.hashed_password {
            user.hashed_password = hashed_password.clone();
        }
        user.updated_at = changes.updated_at.unwrap_or_else(Utc::now);

        Ok(Some(user.clone()))
    }

    async fn set_chirpy_red(&self, id: Uuid, at: DateTime<Utc>) -> DatabaseResult<Option<User>> {
        let mut tables = self.tables.write().await;
        Ok(tables.users.get_mut(&id).map(|user| {
            user.is_chirpy_red = true;
            user.updated_at = at;
            user.clone()
        }))
    }

    async fn delete_all(&self) -> DatabaseResult<u64> {
        let mut tables = self.tables.write().await;
        let deleted = tables.users.len() as u64;

        tables.users.clear();
        tables.chirps.clear();
        tables.refresh_tokens.clear();

        Ok(deleted)
    }
}

#[async_trait]
impl ChirpRepository for MemoryStore {
    async fn create(&self, chirp: &Chirp) -> DatabaseResult<Chirp> {
        let mut tables = self.tables.write().await;

        if !tables.users.contains_key(&chirp.user_id) {
            return Err(DatabaseError::Conflict("chirps_user_id_fkey".to_string()));
        }

        tables.chirps.push(chirp.clone());
        Ok(chirp.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<Chirp>> {
        let tables = self.tables.read().await;
        Ok(tables.chirps.iter().find(|c| c.id == id).cloned())
    }

    async fn list(&self) -> DatabaseResult<Vec<Chirp>> {
        let mut chirps = self.tables.read().await.chirps.clone();
        chirps.sort_by_key(|c| c.created_at);
        Ok(chirps)
    }

    async fn update_body(
        &self,
        id: Uuid,
        body: &str,
        at: DateTime<Utc>,
    ) -> DatabaseResult<Option<Chirp>> {
        let mut tables = self.tables.write().await;
        Ok(tables.chirps.iter_mut().find(|c| c.id == id).map(|chirp| {
            chirp.body = body.to_string();
            chirp.updated_at = at;
            chirp.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> DatabaseResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.chirps.len();
        tables.chirps.retain(|c| c.id != id);
        Ok(tables.chirps.len() < before)
    }
}

#[async_trait]
impl RefreshTokenRepository for MemoryStore {
    async fn create(&self, token: &RefreshToken) -> DatabaseResult<RefreshToken> {
        let mut tables = self.tables.write().await;

        if tables.refresh_tokens.contains_key(&token.token) {
            return Err(DatabaseError::Conflict("refresh_tokens_pkey".to_string()));
        }
        if !tables.users.contains_key(&token.user_id) {
            return Err(DatabaseError::Conflict(
                "refresh_tokens_user_id_fkey".to_string(),
            ));
        }

        tables
            .refresh_tokens
            .insert(token.token.clone(), token.clone());
        Ok(token.clone())
    }

    async fn find_by_token(&self, token: &str) -> DatabaseResult<Option<RefreshToken>> {
        Ok(self.tables.read().await.refresh_tokens.get(token).cloned())
    }

    async fn revoke(&self, token: &str, at: DateTime<Utc>) -> DatabaseResult<Option<RefreshToken>> {
        let mut tables = self.tables.write().await;
        Ok(tables.refresh_tokens.get_mut(token).map(|record| {
            record.revoked_at = Some(at);
            record.updated_at = at;
            record.clone()
        }))
    }
}
