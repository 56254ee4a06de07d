//! Common library for the Stayhub marketplace
//!
//! This crate provides shared functionality used across the Stayhub
//! services: database connectivity, the store error taxonomy, and the
//! session token issuer/verifier.

pub mod database;
pub mod error;
pub mod token;
