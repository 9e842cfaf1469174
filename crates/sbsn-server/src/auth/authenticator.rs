//! Credential validation against the principal store.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use super::error::AuthError;
use super::lookup::{PrincipalStore, lookup_principal};
use super::password;
use super::principal::{Credentials, Principal};

/// Checks a login/secret pair and yields the stored principal.
#[derive(Clone)]
pub struct CredentialAuthenticator {
    store: Arc<dyn PrincipalStore>,
    lookup_timeout: Duration,
}

impl CredentialAuthenticator {
    pub fn new(store: Arc<dyn PrincipalStore>, lookup_timeout: Duration) -> Self {
        Self {
            store,
            lookup_timeout,
        }
    }

    /// Consume `credentials` and return the matching principal.
    ///
    /// The secret is dropped, and therefore zeroed, before this returns on
    /// every path. No token is issued here.
    pub async fn authenticate(&self, credentials: Credentials) -> Result<Principal, AuthError> {
        let Credentials { login, secret } = credentials;

        if login.is_empty() || secret.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        let record = match lookup_principal(self.store.as_ref(), &login, self.lookup_timeout).await
        {
            Ok(record) => record,
            Err(AuthError::NotFound) => {
                password::verify_against_dummy(secret.expose());
                warn!(login = %login, kind = "not_found", "Authentication failed");
                return Err(AuthError::NotFound);
            }
            Err(e) => {
                warn!(login = %login, kind = e.kind(), "Principal lookup failed");
                return Err(e);
            }
        };

        if !password::verify_password(secret.expose(), &record.secret_hash)? {
            warn!(login = %login, kind = "invalid_credentials", "Authentication failed");
            return Err(AuthError::InvalidCredentials);
        }

        debug!(user_id = record.principal.id, "Credentials accepted");
        Ok(record.principal)
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::auth::lookup::test_support::{MapStore, StalledStore};
    use crate::auth::principal::PrincipalRecord;

    fn alice_record() -> PrincipalRecord {
        PrincipalRecord {
            principal: Principal {
                id: 42,
                login: "alice".into(),
                first_name: "Alice".into(),
                last_name: "Liddell".into(),
                authorities: BTreeSet::from(["ROLE_USER".to_string()]),
            },
            secret_hash: password::hash_password(b"correct-secret").unwrap(),
        }
    }

    fn authenticator(store: Arc<dyn PrincipalStore>) -> CredentialAuthenticator {
        CredentialAuthenticator::new(store, Duration::from_secs(1))
    }

    #[tokio::test]
    async fn valid_credentials_return_stored_principal() {
        let auth = authenticator(Arc::new(MapStore::with([alice_record()])));
        let principal = auth
            .authenticate(Credentials::new("alice", "correct-secret"))
            .await
            .unwrap();
        assert_eq!(principal.id, 42);
        assert_eq!(principal.login, "alice");
        assert!(principal.has_authority("ROLE_USER"));
    }

    #[tokio::test]
    async fn wrong_secret_is_invalid_credentials() {
        let auth = authenticator(Arc::new(MapStore::with([alice_record()])));
        let err = auth
            .authenticate(Credentials::new("alice", "wrong-secret"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn unknown_login_is_not_found() {
        let auth = authenticator(Arc::new(MapStore::with([alice_record()])));
        let err = auth
            .authenticate(Credentials::new("mallory", "correct-secret"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::NotFound));
    }

    #[tokio::test]
    async fn empty_inputs_rejected_without_lookup() {
        let store = Arc::new(MapStore::with([alice_record()]));
        let auth = authenticator(store.clone());

        for creds in [
            Credentials::new("", "correct-secret"),
            Credentials::new("alice", ""),
        ] {
            let err = auth.authenticate(creds).await.unwrap_err();
            assert!(matches!(err, AuthError::InvalidCredentials));
        }
        assert_eq!(store.lookups(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_store_is_dependency_timeout() {
        let auth = CredentialAuthenticator::new(Arc::new(StalledStore), Duration::from_millis(100));
        let err = auth
            .authenticate(Credentials::new("alice", "correct-secret"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::DependencyTimeout));
    }
}
