//! Principal lookup collaborator and its deadline enforcement.

use std::time::Duration;

use async_trait::async_trait;

use super::error::AuthError;
use super::principal::PrincipalRecord;

/// Failure reported by a principal store backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("login already taken")]
    Conflict,

    #[error("{0}")]
    Backend(String),
}

/// Resolves a login handle to its stored principal record.
#[async_trait]
pub trait PrincipalStore: Send + Sync {
    async fn find_by_login(&self, login: &str) -> Result<Option<PrincipalRecord>, StoreError>;
}

/// Look `login` up, failing with `DependencyTimeout` if the store does not
/// answer within `timeout`.
pub async fn lookup_principal(
    store: &dyn PrincipalStore,
    login: &str,
    timeout: Duration,
) -> Result<PrincipalRecord, AuthError> {
    match tokio::time::timeout(timeout, store.find_by_login(login)).await {
        Err(_) => Err(AuthError::DependencyTimeout),
        Ok(Err(e)) => Err(AuthError::Store(e.to_string())),
        Ok(Ok(None)) => Err(AuthError::NotFound),
        Ok(Ok(Some(record))) => Ok(record),
    }
}
