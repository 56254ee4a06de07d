//! Store error taxonomy shared by every service
//!
//! Services never match on raw sqlx errors; the single `From` impl in
//! this module classifies them into kinds callers can act on (retry
//! `Transient`, map `Conflict` to a 409, and so on).

use sqlx::Error as SqlxError;
use thiserror::Error;

/// PostgreSQL error code for unique constraint violations
const UNIQUE_VIOLATION: &str = "23505";

/// Error kinds for record store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// The requested record does not exist
    #[error("record not found")]
    NotFound,

    /// A unique constraint was violated (duplicate record)
    #[error("duplicate record")]
    Conflict,

    /// The store timed out or was unreachable; safe to retry
    #[error("store unavailable: {0}")]
    Transient(#[source] SqlxError),

    /// The store rejected or failed the operation; not retried
    #[error("store query failed: {0}")]
    Query(#[source] SqlxError),

    /// A stored record could not be decoded into its model
    #[error("corrupt record: {0}")]
    Corrupt(String),

    /// Configuration error
    #[error("store configuration error: {0}")]
    Configuration(String),
}

impl From<SqlxError> for StoreError {
    fn from(err: SqlxError) -> Self {
        match err {
            SqlxError::RowNotFound => StoreError::NotFound,
            SqlxError::PoolTimedOut | SqlxError::PoolClosed | SqlxError::Io(_) => {
                StoreError::Transient(err)
            }
            SqlxError::Database(ref db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                StoreError::Conflict
            }
            _ => StoreError::Query(err),
        }
    }
}

/// Type alias for Result with StoreError
pub type StoreResult<T> = Result<T, StoreError>;
