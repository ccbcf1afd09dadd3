//! Chirp repository for database operations

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::error::{DatabaseError, DatabaseResult};
use sqlx::PgPool;
use uuid::Uuid;

use super::ChirpRepository;
use crate::models::Chirp;

const CHIRP_COLUMNS: &str = "id, body, user_id, created_at, updated_at";

/// Chirp repository for database operations
#[derive(Clone)]
pub struct PgChirpRepository {
    pool: PgPool,
}

impl PgChirpRepository {
    /// Create a new chirp repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ChirpRepository for PgChirpRepository {
    async fn create(&self, chirp: &Chirp) -> DatabaseResult<Chirp> {
        sqlx::query_as::<_, Chirp>(&format!(
            r#"
            INSERT INTO chirps (id, body, user_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {CHIRP_COLUMNS}
            "#
        ))
        .bind(chirp.id)
        .bind(&chirp.body)
        .bind(chirp.user_id)
        .bind(chirp.created_at)
        .bind(chirp.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_query)
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<Chirp>> {
        sqlx::query_as::<_, Chirp>(&format!("SELECT {CHIRP_COLUMNS} FROM chirps WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::Query)
    }

    async fn list(&self) -> DatabaseResult<Vec<Chirp>> {
        sqlx::query_as::<_, Chirp>(&format!(
            "SELECT {CHIRP_COLUMNS} FROM chirps ORDER BY created_at ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::Query)
    }

    async fn update_body(
        &self,
        id: Uuid,
        body: &str,
        at: DateTime<Utc>,
    ) -> DatabaseResult<Option<Chirp>> {
        sqlx::query_as::<_, Chirp>(&format!(
            r#"
            UPDATE chirps
            SET body = $2, updated_at = $3
            WHERE id = $1
            RETURNING {CHIRP_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(body)
        .bind(at)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::Query)
    }

    async fn delete(&self, id: Uuid) -> DatabaseResult<bool> {
        let result = sqlx::query("DELETE FROM chirps WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        Ok(result.rows_affected() > 0)
    }
}
