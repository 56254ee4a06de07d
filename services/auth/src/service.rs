//! The authenticator: login and signup orchestration
//!
//! Composes the credential store, the lockout policy, the password
//! hasher, and the token service. Password hashing runs on the
//! blocking pool so the CPU-bound work never stalls request dispatch.

use chrono::{DateTime, Utc};
use common::error::StoreError;
use common::token::{Role, TokenService};
use std::sync::Arc;
use tracing::info;

use crate::error::AuthError;
use crate::lockout::{Admission, LockoutConfig};
use crate::models::{NewUser, SignupRequest, SubjectSummary, User};
use crate::password;
use crate::repositories::CredentialStore;
use crate::validation;

/// Successful login result
#[derive(Debug)]
pub struct LoginSuccess {
    pub token: String,
    pub user: SubjectSummary,
}

/// Authenticator service
#[derive(Clone)]
pub struct Authenticator {
    store: Arc<dyn CredentialStore>,
    lockout: LockoutConfig,
    tokens: TokenService,
}

impl Authenticator {
    /// Create a new authenticator
    pub fn new(store: Arc<dyn CredentialStore>, lockout: LockoutConfig, tokens: TokenService) -> Self {
        Self {
            store,
            lockout,
            tokens,
        }
    }

    /// Authenticate a user and issue a session token
    ///
    /// An unknown email and a wrong password produce the same error so
    /// the endpoint cannot be used to enumerate accounts. A locked
    /// account is rejected before the password hash is touched.
    pub async fn login(
        &self,
        email: &str,
        plaintext: &str,
        now: DateTime<Utc>,
    ) -> Result<LoginSuccess, AuthError> {
        let email = normalize_email(email);
        info!("Login attempt for {}", email);

        let Some(user) = self.store.find_by_email(&email).await? else {
            return Err(AuthError::InvalidCredentials);
        };

        if let Admission::Reject {
            retry_after_seconds,
        } = self.lockout.admission(user.lock_until, now)
        {
            info!("Login rejected, account locked for {}s", retry_after_seconds);
            return Err(AuthError::Locked {
                retry_after_seconds,
            });
        }

        if !self.verify_password(plaintext, &user.password_hash).await? {
            self.store
                .record_failure(user.id, self.lockout.threshold, self.lockout.lock_candidate(now))
                .await?;
            return Err(AuthError::InvalidCredentials);
        }

        if LockoutConfig::needs_reset(user.failed_attempts, user.lock_until) {
            self.store.clear_lockout(user.id).await?;
        }

        let token = self.issue_token(&user)?;
        info!("Login successful for user {}", user.id);

        Ok(LoginSuccess {
            token,
            user: SubjectSummary::from(&user),
        })
    }

    /// Create a new account with the given role and issue a token
    ///
    /// The uniqueness pre-check keeps the common duplicate case
    /// friendly; the store's unique constraint still catches the race
    /// and maps to the same error.
    pub async fn signup(
        &self,
        request: SignupRequest,
        role: Role,
    ) -> Result<LoginSuccess, AuthError> {
        validation::validate_username(&request.username).map_err(AuthError::InvalidInput)?;
        validation::validate_email(&request.email).map_err(AuthError::InvalidInput)?;
        validation::validate_password(&request.password).map_err(AuthError::InvalidInput)?;

        let email = normalize_email(&request.email);

        if self.store.find_by_email(&email).await?.is_some() {
            return Err(AuthError::AlreadyExists);
        }

        let plaintext = request.password;
        let password_hash = tokio::task::spawn_blocking(move || password::hash(&plaintext))
            .await
            .map_err(|e| AuthError::Internal(format!("hashing task failed: {}", e)))?
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        let new_user = NewUser {
            username: request.username.trim().to_string(),
            email,
            password_hash,
            role,
        };

        let user = match self.store.insert(&new_user).await {
            Ok(user) => user,
            Err(StoreError::Conflict) => return Err(AuthError::AlreadyExists),
            Err(e) => return Err(AuthError::Store(e)),
        };

        let token = self.issue_token(&user)?;
        info!("Created {} account {}", user.role.as_str(), user.id);

        Ok(LoginSuccess {
            token,
            user: SubjectSummary::from(&user),
        })
    }

    async fn verify_password(&self, plaintext: &str, digest: &str) -> Result<bool, AuthError> {
        let plaintext = plaintext.to_string();
        let digest = digest.to_string();
        tokio::task::spawn_blocking(move || password::verify(&plaintext, &digest))
            .await
            .map_err(|e| AuthError::Internal(format!("hashing task failed: {}", e)))
    }

    fn issue_token(&self, user: &User) -> Result<String, AuthError> {
        self.tokens
            .issue(user.id, user.role)
            .map_err(|e| AuthError::Internal(format!("failed to issue token: {}", e)))
    }
}

/// Normalize an identifier: trim whitespace, lowercase
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Duration;
    use common::error::StoreResult;
    use common::token::TokenConfig;
    use std::sync::Mutex;
    use uuid::Uuid;

    /// In-memory credential store mirroring the Pg transition semantics
    #[derive(Default)]
    struct MemoryStore {
        users: Mutex<Vec<User>>,
    }

    #[async_trait]
    impl CredentialStore for MemoryStore {
        async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
            let users = self.users.lock().unwrap();
            Ok(users.iter().find(|u| u.email == email).cloned())
        }

        async fn insert(&self, new_user: &NewUser) -> StoreResult<User> {
            let mut users = self.users.lock().unwrap();
            if users.iter().any(|u| u.email == new_user.email) {
                return Err(StoreError::Conflict);
            }
            let now = Utc::now();
            let user = User {
                id: Uuid::new_v4(),
                username: new_user.username.clone(),
                email: new_user.email.clone(),
                password_hash: new_user.password_hash.clone(),
                role: new_user.role,
                failed_attempts: 0,
                lock_until: None,
                created_at: now,
                updated_at: now,
            };
            users.push(user.clone());
            Ok(user)
        }

        async fn record_failure(
            &self,
            id: Uuid,
            threshold: i32,
            lock_until: DateTime<Utc>,
        ) -> StoreResult<()> {
            let mut users = self.users.lock().unwrap();
            if let Some(user) = users.iter_mut().find(|u| u.id == id) {
                user.failed_attempts += 1;
                if user.failed_attempts >= threshold {
                    user.lock_until = Some(lock_until);
                }
            }
            Ok(())
        }

        async fn clear_lockout(&self, id: Uuid) -> StoreResult<()> {
            let mut users = self.users.lock().unwrap();
            if let Some(user) = users.iter_mut().find(|u| u.id == id) {
                user.failed_attempts = 0;
                user.lock_until = None;
            }
            Ok(())
        }
    }

    fn token_service() -> TokenService {
        TokenService::new(&TokenConfig {
            secret: "test-secret".to_string(),
            ttl_seconds: 86400,
        })
    }

    fn authenticator() -> (Authenticator, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::default());
        let auth = Authenticator::new(
            store.clone(),
            LockoutConfig::default(),
            token_service(),
        );
        (auth, store)
    }

    fn signup_request(email: &str) -> SignupRequest {
        SignupRequest {
            username: "guest".to_string(),
            email: email.to_string(),
            password: "hunter22".to_string(),
        }
    }

    async fn signed_up(auth: &Authenticator, email: &str) {
        auth.signup(signup_request(email), Role::Customer)
            .await
            .expect("signup failed");
    }

    #[tokio::test]
    async fn test_signup_then_login() {
        let (auth, _) = authenticator();
        signed_up(&auth, "guest@example.com").await;

        let result = auth
            .login("guest@example.com", "hunter22", Utc::now())
            .await
            .expect("login failed");

        assert_eq!(result.user.email, "guest@example.com");
        assert_eq!(result.user.role, Role::Customer);

        let claims = token_service().verify(&result.token).unwrap();
        assert_eq!(claims.sub, result.user.id);
        assert_eq!(claims.role, Role::Customer);
    }

    #[tokio::test]
    async fn test_login_normalizes_identifier() {
        let (auth, _) = authenticator();
        signed_up(&auth, "Guest@Example.COM").await;

        let result = auth
            .login("  GUEST@example.com ", "hunter22", Utc::now())
            .await
            .expect("login failed");
        assert_eq!(result.user.email, "guest@example.com");
    }

    #[tokio::test]
    async fn test_unknown_email_is_invalid_credentials() {
        let (auth, _) = authenticator();
        let result = auth.login("nobody@example.com", "hunter22", Utc::now()).await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_wrong_password_is_invalid_credentials_and_counted() {
        let (auth, store) = authenticator();
        signed_up(&auth, "guest@example.com").await;

        let result = auth.login("guest@example.com", "wrong", Utc::now()).await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));

        let user = store
            .find_by_email("guest@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.failed_attempts, 1);
        assert!(user.lock_until.is_none());
    }

    #[tokio::test]
    async fn test_fifth_failure_locks_the_account() {
        let (auth, store) = authenticator();
        signed_up(&auth, "guest@example.com").await;
        let now = Utc::now();

        for _ in 0..5 {
            let result = auth.login("guest@example.com", "wrong", now).await;
            assert!(matches!(result, Err(AuthError::InvalidCredentials)));
        }

        let user = store
            .find_by_email("guest@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.failed_attempts, 5);
        assert!(user.lock_until.is_some());

        // Sixth attempt is rejected even with the correct password.
        let result = auth.login("guest@example.com", "hunter22", now).await;
        match result {
            Err(AuthError::Locked {
                retry_after_seconds,
            }) => {
                assert!(retry_after_seconds > 0);
                assert!(retry_after_seconds <= 900);
            }
            other => panic!("expected Locked, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_successful_login_resets_counters() {
        let (auth, store) = authenticator();
        signed_up(&auth, "guest@example.com").await;
        let now = Utc::now();

        for _ in 0..3 {
            let _ = auth.login("guest@example.com", "wrong", now).await;
        }

        auth.login("guest@example.com", "hunter22", now)
            .await
            .expect("login failed");

        let user = store
            .find_by_email("guest@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.failed_attempts, 0);
        assert!(user.lock_until.is_none());
    }

    #[tokio::test]
    async fn test_expired_lock_admits_and_resets_on_success() {
        let (auth, store) = authenticator();
        signed_up(&auth, "guest@example.com").await;
        let locked_at = Utc::now() - Duration::seconds(1000);

        for _ in 0..5 {
            let _ = auth.login("guest@example.com", "wrong", locked_at).await;
        }

        // The 15 minute lock placed at `locked_at` has expired by now.
        let result = auth
            .login("guest@example.com", "hunter22", Utc::now())
            .await;
        assert!(result.is_ok());

        let user = store
            .find_by_email("guest@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.failed_attempts, 0);
        assert!(user.lock_until.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_signup_is_conflict() {
        let (auth, _) = authenticator();
        signed_up(&auth, "guest@example.com").await;

        let result = auth
            .signup(signup_request("guest@example.com"), Role::Customer)
            .await;
        assert!(matches!(result, Err(AuthError::AlreadyExists)));

        // Same identifier in a different case is still a duplicate.
        let result = auth
            .signup(signup_request("GUEST@EXAMPLE.COM"), Role::Customer)
            .await;
        assert!(matches!(result, Err(AuthError::AlreadyExists)));
    }

    #[tokio::test]
    async fn test_signup_rejects_invalid_input() {
        let (auth, _) = authenticator();

        let mut request = signup_request("guest@example.com");
        request.password = "short".to_string();
        let result = auth.signup(request, Role::Customer).await;
        assert!(matches!(result, Err(AuthError::InvalidInput(_))));

        let mut request = signup_request("not-an-email");
        request.email = "not-an-email".to_string();
        let result = auth.signup(request, Role::Customer).await;
        assert!(matches!(result, Err(AuthError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_admin_signup_issues_admin_token() {
        let (auth, _) = authenticator();

        let result = auth
            .signup(signup_request("admin@example.com"), Role::Admin)
            .await
            .expect("signup failed");
        assert_eq!(result.user.role, Role::Admin);

        let claims = token_service().verify(&result.token).unwrap();
        assert_eq!(claims.role, Role::Admin);
    }
}
