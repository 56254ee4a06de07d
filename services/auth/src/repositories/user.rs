//! Credential store adapter over the users table
//!
//! The authenticator talks to the store through the `CredentialStore`
//! trait; `PgCredentialStore` is the PostgreSQL implementation. The
//! lockout counter transitions run inside single UPDATE statements so
//! concurrent failed logins for the same identifier cannot lose
//! updates.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::error::{StoreError, StoreResult};
use common::token::Role;
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use crate::models::{NewUser, User};

/// Port for credential record persistence
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Look up a credential record by (normalized) email
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Insert a new credential record; duplicate email is `Conflict`
    async fn insert(&self, new_user: &NewUser) -> StoreResult<User>;

    /// Record one failed login attempt
    ///
    /// Increments the failure counter and, when the incremented count
    /// reaches `threshold`, sets the lock expiry to `lock_until` — all
    /// in one atomic store operation.
    async fn record_failure(
        &self,
        id: Uuid,
        threshold: i32,
        lock_until: DateTime<Utc>,
    ) -> StoreResult<()>;

    /// Reset the failure counter and clear any lock expiry
    async fn clear_lockout(&self, id: Uuid) -> StoreResult<()>;
}

/// PostgreSQL credential store
#[derive(Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    /// Create a new credential store over a connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_row(row: &PgRow) -> StoreResult<User> {
        let role: String = row.get("role");
        let role = Role::parse(&role)
            .ok_or_else(|| StoreError::Corrupt(format!("unknown role: {}", role)))?;

        Ok(User {
            id: row.get("id"),
            username: row.get("username"),
            email: row.get("email"),
            password_hash: row.get("password_hash"),
            role,
            failed_attempts: row.get("failed_attempts"),
            lock_until: row.get("lock_until"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, username, email, password_hash, role,
                   failed_attempts, lock_until, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(Self::map_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn insert(&self, new_user: &NewUser) -> StoreResult<User> {
        info!("Creating new user: {}", new_user.username);

        let row = sqlx::query(
            r#"
            INSERT INTO users (username, email, password_hash, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, email, password_hash, role,
                      failed_attempts, lock_until, created_at, updated_at
            "#,
        )
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(new_user.role.as_str())
        .fetch_one(&self.pool)
        .await?;

        Self::map_row(&row)
    }

    async fn record_failure(
        &self,
        id: Uuid,
        threshold: i32,
        lock_until: DateTime<Utc>,
    ) -> StoreResult<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET failed_attempts = failed_attempts + 1,
                lock_until = CASE
                    WHEN failed_attempts + 1 >= $2 THEN $3
                    ELSE lock_until
                END,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(threshold)
        .bind(lock_until)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn clear_lockout(&self, id: Uuid) -> StoreResult<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET failed_attempts = 0,
                lock_until = NULL,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
