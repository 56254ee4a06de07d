//! Credential store adapter

pub mod user;

pub use user::{CredentialStore, PgCredentialStore};
