//! Account registration.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{info, warn};

use super::error::AuthError;
use super::lookup::StoreError;
use super::password;
use super::principal::{Principal, Secret};

const MIN_LOGIN_LEN: usize = 3;
const MAX_LOGIN_LEN: usize = 64;
const MIN_SECRET_LEN: usize = 8;

/// Sign-up request.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAccount {
    pub login: String,
    #[serde(rename = "password")]
    pub secret: Secret,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

impl fmt::Debug for NewAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewAccount")
            .field("login", &self.login)
            .field("secret", &self.secret)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .finish()
    }
}

/// Persists new principals.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Store a new account; `StoreError::Conflict` if the login is taken.
    async fn create_account(
        &self,
        login: &str,
        first_name: &str,
        last_name: &str,
        secret_hash: &str,
    ) -> Result<Principal, StoreError>;
}

/// Validates sign-up input, hashes the secret and stores the account.
#[derive(Clone)]
pub struct Registrar {
    store: Arc<dyn AccountStore>,
}

impl Registrar {
    pub fn new(store: Arc<dyn AccountStore>) -> Self {
        Self { store }
    }

    pub async fn register(&self, account: NewAccount) -> Result<Principal, AuthError> {
        let NewAccount {
            login,
            secret,
            first_name,
            last_name,
        } = account;

        validate_login(&login)?;
        if secret.len() < MIN_SECRET_LEN {
            return Err(AuthError::InvalidInput(format!(
                "Password must be at least {MIN_SECRET_LEN} characters"
            )));
        }

        let hash = password::hash_password(secret.expose())?;
        drop(secret);

        let principal = self
            .store
            .create_account(&login, first_name.trim(), last_name.trim(), &hash)
            .await
            .map_err(|e| match e {
                StoreError::Conflict => {
                    warn!(login = %login, kind = "conflict", "Registration rejected");
                    AuthError::Conflict("Login already taken".to_string())
                }
                StoreError::Backend(msg) => AuthError::Store(msg),
            })?;

        info!(user_id = principal.id, login = %principal.login, "Account registered");
        Ok(principal)
    }
}

fn validate_login(login: &str) -> Result<(), AuthError> {
    if !(MIN_LOGIN_LEN..=MAX_LOGIN_LEN).contains(&login.len()) {
        return Err(AuthError::InvalidInput(format!(
            "Login must be {MIN_LOGIN_LEN} to {MAX_LOGIN_LEN} characters"
        )));
    }
    if !login
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
    {
        return Err(AuthError::InvalidInput(
            "Login may only contain letters, digits, '_', '.' and '-'".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use std::collections::{BTreeSet, HashMap};
    use std::sync::Mutex;

    use super::*;

    /// Keeps created accounts in memory, remembering the stored hash.
    #[derive(Default)]
    struct MemoryAccounts {
        hashes: Mutex<HashMap<String, String>>,
    }

    #[async_trait]
    impl AccountStore for MemoryAccounts {
        async fn create_account(
            &self,
            login: &str,
            first_name: &str,
            last_name: &str,
            secret_hash: &str,
        ) -> Result<Principal, StoreError> {
            let mut hashes = self.hashes.lock().unwrap();
            if hashes.contains_key(login) {
                return Err(StoreError::Conflict);
            }
            hashes.insert(login.to_string(), secret_hash.to_string());
            Ok(Principal {
                id: i64::try_from(hashes.len()).unwrap(),
                login: login.to_string(),
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
                authorities: BTreeSet::new(),
            })
        }
    }

    fn account(login: &str, secret: &str) -> NewAccount {
        NewAccount {
            login: login.into(),
            secret: secret.into(),
            first_name: " Alice ".into(),
            last_name: "Liddell".into(),
        }
    }

    #[tokio::test]
    async fn register_stores_hash_not_secret() {
        let store = Arc::new(MemoryAccounts::default());
        let registrar = Registrar::new(store.clone());

        let principal = registrar
            .register(account("alice", "password123"))
            .await
            .unwrap();
        assert_eq!(principal.login, "alice");
        assert_eq!(principal.first_name, "Alice");

        let hash = store.hashes.lock().unwrap()["alice"].clone();
        assert_ne!(hash, "password123");
        assert!(password::verify_password(b"password123", &hash).unwrap());
    }

    #[tokio::test]
    async fn duplicate_login_is_conflict() {
        let registrar = Registrar::new(Arc::new(MemoryAccounts::default()));
        registrar
            .register(account("alice", "password123"))
            .await
            .unwrap();
        let err = registrar
            .register(account("alice", "password456"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Conflict(_)));
    }

    #[tokio::test]
    async fn short_password_rejected() {
        let registrar = Registrar::new(Arc::new(MemoryAccounts::default()));
        let err = registrar
            .register(account("alice", "short"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidInput(_)));
    }

    #[test]
    fn login_rules() {
        assert!(validate_login("alice.w-2_").is_ok());
        assert!(validate_login("ab").is_err());
        assert!(validate_login(&"a".repeat(65)).is_err());
        assert!(validate_login("alice smith").is_err());
        assert!(validate_login("ālice").is_err());
    }
}
