//! Credential record model and related payloads

use chrono::{DateTime, Utc};
use common::token::Role;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Credential record for one user
///
/// `failed_attempts` and `lock_until` drive the brute-force lockout:
/// `lock_until` is set only when the failure count crosses the
/// threshold and both are cleared on the next successful login.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub failed_attempts: i32,
    pub lock_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New credential record payload (password already hashed)
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

/// Subject summary returned to clients after login or signup
#[derive(Debug, Clone, Serialize)]
pub struct SubjectSummary {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: Role,
}

impl From<&User> for SubjectSummary {
    fn from(user: &User) -> Self {
        SubjectSummary {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

/// Signup request payload
#[derive(Debug, Clone, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Login request payload
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}
