//! Error types for `SBSN` core library.

use thiserror::Error;

/// Result type alias using `SBSN` Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for `SBSN` operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
