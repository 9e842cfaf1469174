//! JWT signing material and token issuance.

use std::fmt;
use std::sync::Arc;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header};
use tracing::debug;
use zeroize::Zeroize;

use super::claims::Claims;
use super::clock::Clock;
use super::error::AuthError;
use super::principal::Principal;

/// Minimum length of the shared HMAC secret.
pub const MIN_SECRET_LEN: usize = 32;

/// Algorithm used for every token this process issues or accepts.
pub const TOKEN_ALGORITHM: Algorithm = Algorithm::HS256;

/// Process-wide signing material. Read-only once built.
pub struct SigningKey {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl SigningKey {
    /// Build the key pair from a shared secret.
    ///
    /// The caller's buffer is zeroed once the keys are derived.
    pub fn from_secret(secret: &mut [u8]) -> Result<Self, AuthError> {
        if secret.len() < MIN_SECRET_LEN {
            let len = secret.len();
            secret.zeroize();
            return Err(AuthError::Signing(format!(
                "signing secret must be at least {MIN_SECRET_LEN} bytes, got {len}"
            )));
        }
        let key = Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        };
        secret.zeroize();
        Ok(key)
    }

    pub(crate) const fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("algorithm", &TOKEN_ALGORITHM)
            .finish_non_exhaustive()
    }
}

/// A freshly signed bearer token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub issued_at: i64,
    pub expires_at: i64,
    pub expires_in_secs: i64,
}

/// Turns authenticated principals into signed, time-bounded tokens.
#[derive(Clone)]
pub struct TokenIssuer {
    key: Arc<SigningKey>,
    clock: Arc<dyn Clock>,
    ttl_secs: i64,
}

impl TokenIssuer {
    pub fn new(key: Arc<SigningKey>, clock: Arc<dyn Clock>, ttl_secs: i64) -> Self {
        Self {
            key,
            clock,
            ttl_secs,
        }
    }

    /// Issue an access token for an already authenticated principal.
    pub fn issue(&self, principal: &Principal) -> Result<IssuedToken, AuthError> {
        let now = self.clock.now();
        let exp = now
            .checked_add(self.ttl_secs)
            .ok_or_else(|| AuthError::Signing("token expiry overflows".to_string()))?;

        let claims = Claims {
            jti: uuid::Uuid::new_v4().to_string(),
            sub: principal.login.clone(),
            uid: principal.id,
            iat: now,
            exp,
        };

        let token = jsonwebtoken::encode(
            &Header::new(TOKEN_ALGORITHM),
            &claims,
            &self.key.encoding_key,
        )
        .map_err(|e| AuthError::Signing(e.to_string()))?;

        debug!(user_id = principal.id, exp, "Issued access token");

        Ok(IssuedToken {
            token,
            issued_at: now,
            expires_at: exp,
            expires_in_secs: self.ttl_secs,
        })
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::auth::clock::ManualClock;

    fn alice() -> Principal {
        Principal {
            id: 1,
            login: "alice".into(),
            first_name: "Alice".into(),
            last_name: "Liddell".into(),
            authorities: BTreeSet::new(),
        }
    }

    fn key() -> Arc<SigningKey> {
        let mut secret = b"test-secret-key-for-testing-0123456789".to_vec();
        Arc::new(SigningKey::from_secret(&mut secret).unwrap())
    }

    #[test]
    fn short_secret_is_signing_error() {
        let mut secret = b"too-short".to_vec();
        let err = SigningKey::from_secret(&mut secret).unwrap_err();
        assert!(matches!(err, AuthError::Signing(_)));
        assert!(secret.iter().all(|b| *b == 0));
    }

    #[test]
    fn secret_buffer_is_zeroed_after_use() {
        let mut secret = vec![b'k'; MIN_SECRET_LEN];
        SigningKey::from_secret(&mut secret).unwrap();
        assert!(secret.iter().all(|b| *b == 0));
    }

    #[test]
    fn issued_token_has_three_segments_and_ttl() {
        let clock = Arc::new(ManualClock::new(1_700_000_000));
        let issuer = TokenIssuer::new(key(), clock, 3600);
        let issued = issuer.issue(&alice()).unwrap();

        assert_eq!(issued.token.split('.').count(), 3);
        assert_eq!(issued.issued_at, 1_700_000_000);
        assert_eq!(issued.expires_at, 1_700_003_600);
        assert_eq!(issued.expires_in_secs, 3600);
    }

    #[test]
    fn reissue_produces_distinct_tokens() {
        let clock = Arc::new(ManualClock::new(1_700_000_000));
        let issuer = TokenIssuer::new(key(), clock, 3600);
        let a = issuer.issue(&alice()).unwrap();
        let b = issuer.issue(&alice()).unwrap();
        assert_ne!(a.token, b.token);
    }

    #[test]
    fn overflowing_expiry_is_signing_error() {
        let clock = Arc::new(ManualClock::new(i64::MAX - 10));
        let issuer = TokenIssuer::new(key(), clock, 3600);
        assert!(matches!(issuer.issue(&alice()), Err(AuthError::Signing(_))));
    }
}
