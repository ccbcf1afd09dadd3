//! Custom error types for the common library
//!
//! This module defines the persistence error type shared by every
//! repository implementation in the workspace.

use sqlx::Error as SqlxError;
use thiserror::Error;

/// Custom error type for database operations
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error occurred during database connection
    #[error("Database connection error: {0}")]
    Connection(#[source] SqlxError),

    /// Error occurred during database query execution
    #[error("Database query error: {0}")]
    Query(#[source] SqlxError),

    /// Error occurred during database migration
    #[error("Database migration error: {0}")]
    Migration(String),

    /// Configuration error
    #[error("Database configuration error: {0}")]
    Configuration(String),

    /// A uniqueness constraint rejected the write
    #[error("Database conflict: {0}")]
    Conflict(String),
}

impl DatabaseError {
    /// Classify a query error, surfacing unique violations as [`DatabaseError::Conflict`]
    pub fn from_query(err: SqlxError) -> Self {
        match &err {
            SqlxError::Database(db_err) if db_err.is_unique_violation() => {
                DatabaseError::Conflict(db_err.message().to_string())
            }
            _ => DatabaseError::Query(err),
        }
    }
}

/// Type alias for Result with DatabaseError
pub type DatabaseResult<T> = Result<T, DatabaseError>;
