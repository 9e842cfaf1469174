//! Secret hashing and verification using argon2id.

use std::sync::OnceLock;

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};

use super::error::AuthError;

/// Hash a secret using argon2id with a random salt.
pub fn hash_password(secret: &[u8]) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(secret, &salt)
        .map_err(|e| AuthError::Store(format!("secret hashing failed: {e}")))?;
    Ok(hash.to_string())
}

/// Verify a secret against a stored argon2id hash.
///
/// The digest comparison inside `argon2` is constant-time.
pub fn verify_password(secret: &[u8], hash: &str) -> Result<bool, AuthError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AuthError::Store(format!("stored secret hash is unreadable: {e}")))?;
    Ok(Argon2::default()
        .verify_password(secret, &parsed_hash)
        .is_ok())
}

/// Burn the same work as a real verification when the login is unknown.
pub fn verify_against_dummy(secret: &[u8]) {
    static DUMMY_HASH: OnceLock<Option<String>> = OnceLock::new();
    if let Some(hash) = DUMMY_HASH.get_or_init(|| hash_password(b"sbsn-dummy-secret").ok()) {
        let _ = verify_password(secret, hash);
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify() {
        let hash = hash_password(b"mysecret").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password(b"mysecret", &hash).unwrap());
        assert!(!verify_password(b"wrongpassword", &hash).unwrap());
    }

    #[test]
    fn same_secret_gets_distinct_salts() {
        let h1 = hash_password(b"password1").unwrap();
        let h2 = hash_password(b"password1").unwrap();
        assert_ne!(h1, h2);
    }

    #[test]
    fn garbage_hash_is_store_error() {
        let err = verify_password(b"mysecret", "plaintext").unwrap_err();
        assert!(matches!(err, AuthError::Store(_)));
    }

    #[test]
    fn dummy_verification_does_not_panic() {
        verify_against_dummy(b"anything");
        verify_against_dummy(b"");
    }
}
