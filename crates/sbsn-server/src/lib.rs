//! SBSN Server Library
//!
//! Core functionality for the SBSN backend:
//! - Credential authentication and argon2id secret hashing
//! - Bearer token issuance and verification
//! - SQLite storage for users and authorities
//! - axum HTTP boundary with per-request security context

pub mod auth;
pub mod server;
pub mod storage;
