//! Brute-force lockout policy
//!
//! Pure decision logic over a credential record's failure counter and
//! lock expiry. The state transitions themselves are applied
//! atomically by the credential store (a single in-database update),
//! so this module never assumes it is the only writer.

use chrono::{DateTime, Duration, Utc};
use std::env;

/// Lockout policy configuration
#[derive(Debug, Clone, Copy)]
pub struct LockoutConfig {
    /// Consecutive failures before the account is locked
    pub threshold: i32,
    /// Lock duration in seconds
    pub duration_seconds: i64,
}

impl Default for LockoutConfig {
    fn default() -> Self {
        Self {
            threshold: 5,
            duration_seconds: 900, // 15 minutes
        }
    }
}

impl LockoutConfig {
    /// Create a new LockoutConfig from environment variables
    ///
    /// # Environment Variables
    /// - `LOCKOUT_THRESHOLD`: Failures before locking (default: 5)
    /// - `LOCKOUT_DURATION_SECONDS`: Lock duration (default: 900)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let threshold = env::var("LOCKOUT_THRESHOLD")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.threshold);

        let duration_seconds = env::var("LOCKOUT_DURATION_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.duration_seconds);

        Self {
            threshold,
            duration_seconds,
        }
    }

    /// Lockout state of a credential record at `now`
    pub fn state(
        &self,
        failed_attempts: i32,
        lock_until: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> LockState {
        match lock_until {
            Some(expiry) if now < expiry => LockState::Locked,
            Some(_) => LockState::ExpiredLock,
            None if failed_attempts >= self.threshold => LockState::ExpiredLock,
            None => LockState::Open,
        }
    }

    /// Decide whether a login attempt may proceed
    ///
    /// Rejects only while the lock is active; an expired lock admits
    /// the attempt with its counters still in place until reset.
    pub fn admission(&self, lock_until: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Admission {
        match lock_until {
            Some(expiry) if now < expiry => {
                let millis = (expiry - now).num_milliseconds();
                Admission::Reject {
                    retry_after_seconds: (millis + 999) / 1000,
                }
            }
            _ => Admission::Allow,
        }
    }

    /// Lock expiry to apply if the next recorded failure crosses the threshold
    pub fn lock_candidate(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now + Duration::seconds(self.duration_seconds)
    }

    /// Whether a successful login must reset the record
    ///
    /// Skips the write when both counter and lock are already default.
    pub fn needs_reset(failed_attempts: i32, lock_until: Option<DateTime<Utc>>) -> bool {
        failed_attempts > 0 || lock_until.is_some()
    }
}

/// Lockout state of a credential record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockState {
    /// Below the failure threshold
    Open,
    /// Locked; attempts are rejected until the expiry passes
    Locked,
    /// The lock expired but counters have not been reset yet
    ExpiredLock,
}

/// Admission decision for one login attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Allow,
    Reject { retry_after_seconds: i64 },
}
