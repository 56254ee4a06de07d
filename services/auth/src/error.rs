//! Custom error types for the authentication service
//!
//! Lockout and credential mismatch are distinct kinds internally but
//! the external message for bad credentials never says whether the
//! account exists.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::error::StoreError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Custom error type for authentication operations
#[derive(Error, Debug)]
pub enum AuthError {
    /// Unknown identifier or wrong password (indistinguishable on purpose)
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The account is locked out after repeated failures
    #[error("account locked, retry after {retry_after_seconds}s")]
    Locked { retry_after_seconds: i64 },

    /// A user with this email already exists
    #[error("user already exists")]
    AlreadyExists,

    /// The request payload failed validation
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Record store failure
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Unexpected internal failure
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, kind, message, retry_after) = match self {
            AuthError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                "Invalid email or password".to_string(),
                None,
            ),
            AuthError::Locked {
                retry_after_seconds,
            } => (
                StatusCode::TOO_MANY_REQUESTS,
                "LOCKED",
                format!("Account locked. Try again in {}s", retry_after_seconds),
                Some(retry_after_seconds),
            ),
            AuthError::AlreadyExists => (
                StatusCode::CONFLICT,
                "ALREADY_EXISTS",
                "User with this email already exists".to_string(),
                None,
            ),
            AuthError::InvalidInput(msg) => {
                (StatusCode::BAD_REQUEST, "INVALID_INPUT", msg, None)
            }
            AuthError::Store(StoreError::Conflict) => (
                StatusCode::CONFLICT,
                "ALREADY_EXISTS",
                "User with this email already exists".to_string(),
                None,
            ),
            AuthError::Store(StoreError::Transient(e)) => {
                error!("Store temporarily unavailable: {}", e);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "TRANSIENT",
                    "Service temporarily unavailable".to_string(),
                    None,
                )
            }
            AuthError::Store(e) => {
                error!("Store failure during auth operation: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "Internal server error".to_string(),
                    None,
                )
            }
            AuthError::Internal(msg) => {
                error!("Internal auth failure: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "Internal server error".to_string(),
                    None,
                )
            }
        };

        let mut body = json!({
            "error": kind,
            "message": message,
        });
        if let Some(seconds) = retry_after {
            body["retryAfterSeconds"] = json!(seconds);
        }

        (status, Json(body)).into_response()
    }
}
