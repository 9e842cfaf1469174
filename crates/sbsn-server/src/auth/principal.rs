//! Authenticated identities and the credentials that produce them.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use zeroize::Zeroizing;

/// An authenticated actor.
///
/// `id` is assigned by the store once and never handed to another user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub id: i64,
    pub login: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub authorities: BTreeSet<String>,
}

impl Principal {
    pub fn has_authority(&self, authority: &str) -> bool {
        self.authorities.contains(authority)
    }
}

/// What the lookup collaborator returns: the principal plus its secret hash.
#[derive(Clone)]
pub struct PrincipalRecord {
    pub principal: Principal,
    /// argon2id PHC string.
    pub secret_hash: String,
}

impl fmt::Debug for PrincipalRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrincipalRecord")
            .field("principal", &self.principal)
            .field("secret_hash", &"[REDACTED]")
            .finish()
    }
}

/// A user-supplied secret. The backing buffer is wiped on drop.
pub struct Secret(Zeroizing<Vec<u8>>);

impl Secret {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(Zeroizing::new(bytes.into()))
    }

    pub fn expose(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret([REDACTED])")
    }
}

impl From<&str> for Secret {
    fn from(value: &str) -> Self {
        Self::new(value.as_bytes())
    }
}

impl From<String> for Secret {
    fn from(value: String) -> Self {
        Self::new(value.into_bytes())
    }
}

impl<'de> Deserialize<'de> for Secret {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::from)
    }
}

/// A login handle and its secret, consumed by a single authentication call.
#[derive(Deserialize)]
pub struct Credentials {
    pub login: String,
    #[serde(rename = "password")]
    pub secret: Secret,
}

impl Credentials {
    pub fn new(login: impl Into<String>, secret: impl Into<Secret>) -> Self {
        Self {
            login: login.into(),
            secret: secret.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("login", &self.login)
            .field("secret", &self.secret)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_never_contains_secret() {
        let creds = Credentials::new("alice", "hunter2-hunter2");
        let rendered = format!("{creds:?}");
        assert!(rendered.contains("alice"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn credentials_deserialize_from_sign_in_body() {
        let creds: Credentials =
            serde_json::from_str(r#"{"login":"alice","password":"s3cret"}"#).unwrap();
        assert_eq!(creds.login, "alice");
        assert_eq!(creds.secret.expose(), b"s3cret");
    }

    #[test]
    fn principal_serializes_camel_case() {
        let principal = Principal {
            id: 7,
            login: "alice".into(),
            first_name: "Alice".into(),
            last_name: "Liddell".into(),
            authorities: BTreeSet::from(["ROLE_USER".to_string()]),
        };
        let json = serde_json::to_value(&principal).unwrap();
        assert_eq!(json["firstName"], "Alice");
        assert_eq!(json["authorities"][0], "ROLE_USER");
        assert!(principal.has_authority("ROLE_USER"));
    }
}
