//! `SBSN` Core Library
//!
//! Shared functionality for `SBSN` components:
//! - Configuration resolution and hierarchy
//! - `SQLite` pool helpers and the `define_database!` macro
//! - Tracing initialisation
//! - Common error types

pub mod config;
pub mod db;
pub mod error;
pub mod tracing_init;

pub use config::{AuthConfig, Config, ServerConfig};
pub use error::{Error, Result};
