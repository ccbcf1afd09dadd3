//! Persistence interface for users, chirps and refresh tokens
//!
//! Each table has a trait and a PostgreSQL implementation; [`memory`]
//! implements all three traits over in-process maps.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::error::DatabaseResult;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Chirp, RefreshToken, UpdateUser, User};

pub mod chirp;
pub mod memory;
pub mod refresh_token;
pub mod user;

pub use chirp::PgChirpRepository;
pub use memory::MemoryStore;
pub use refresh_token::PgRefreshTokenRepository;
pub use user::PgUserRepository;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: &User) -> DatabaseResult<User>;
    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<User>>;
    /// Every user stored under `email`
    async fn find_by_email(&self, email: &str) -> DatabaseResult<Vec<User>>;
    async fn update(&self, id: Uuid, changes: &UpdateUser) -> DatabaseResult<Option<User>>;
    async fn set_chirpy_red(&self, id: Uuid, at: DateTime<Utc>) -> DatabaseResult<Option<User>>;
    /// Remove every user together with their chirps and refresh tokens
    async fn delete_all(&self) -> DatabaseResult<u64>;
}

#[async_trait]
pub trait ChirpRepository: Send + Sync {
    async fn create(&self, chirp: &Chirp) -> DatabaseResult<Chirp>;
    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<Chirp>>;
    /// All chirps, oldest first
    async fn list(&self) -> DatabaseResult<Vec<Chirp>>;
    async fn update_body(
        &self,
        id: Uuid,
        body: &str,
        at: DateTime<Utc>,
    ) -> DatabaseResult<Option<Chirp>>;
    async fn delete(&self, id: Uuid) -> DatabaseResult<bool>;
}

#[async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    async fn create(&self, token: &RefreshToken) -> DatabaseResult<RefreshToken>;
    async fn find_by_token(&self, token: &str) -> DatabaseResult<Option<RefreshToken>>;
    async fn revoke(&self, token: &str, at: DateTime<Utc>) -> DatabaseResult<Option<RefreshToken>>;
}

/// The repositories the service runs against
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub chirps: Arc<dyn ChirpRepository>,
    pub refresh_tokens: Arc<dyn RefreshTokenRepository>,
}

impl Repositories {
    /// Repositories backed by PostgreSQL
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            chirps: Arc::new(PgChirpRepository::new(pool.clone())),
            refresh_tokens: Arc::new(PgRefreshTokenRepository::new(pool)),
        }
    }

    /// Repositories sharing one in-process store
    pub fn in_memory() -> Self {
        let store = MemoryStore::new();
        Self {
            users: Arc::new(store.clone()),
            chirps: Arc::new(store.clone()),
            refresh_tokens: Arc::new(store),
        }
    }
}
