//! Authentication service models

pub mod user;

// Re-export for convenience
pub use user::{LoginRequest, NewUser, SignupRequest, SubjectSummary, User};
