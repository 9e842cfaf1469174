//! Bearer token verification.
//!
//! Checks run in a fixed order so that nothing inside a token is trusted
//! before its signature holds:
//! 1. structure (three base64url segments, JSON header and payload)
//! 2. HS256 signature
//! 3. claim shape
//! 4. expiry against the injected clock, with bounded skew
//! 5. re-resolution of the subject through the principal store

use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use jsonwebtoken::Validation;
use jsonwebtoken::errors::ErrorKind;
use sbsn_core::config::MAX_CLOCK_SKEW_SECS;
use tracing::{debug, warn};

use super::claims::Claims;
use super::clock::Clock;
use super::error::AuthError;
use super::jwt::{SigningKey, TOKEN_ALGORITHM};
use super::lookup::{PrincipalStore, lookup_principal};
use super::principal::Principal;

/// Validates bearer tokens and re-hydrates their principal.
///
/// Holds no mutable state; one instance is shared by every request.
#[derive(Clone)]
pub struct TokenVerifier {
    key: Arc<SigningKey>,
    clock: Arc<dyn Clock>,
    store: Arc<dyn PrincipalStore>,
    skew_secs: i64,
    lookup_timeout: Duration,
    validation: Validation,
}

impl TokenVerifier {
    /// `skew_secs` is clamped to `0..=60`.
    pub fn new(
        key: Arc<SigningKey>,
        clock: Arc<dyn Clock>,
        store: Arc<dyn PrincipalStore>,
        skew_secs: i64,
        lookup_timeout: Duration,
    ) -> Self {
        let mut validation = Validation::new(TOKEN_ALGORITHM);
        // Expiry is checked against our own clock after the signature.
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        Self {
            key,
            clock,
            store,
            skew_secs: skew_secs.clamp(0, MAX_CLOCK_SKEW_SECS),
            lookup_timeout,
            validation,
        }
    }

    /// Verify `token` and resolve the principal it was issued to.
    pub async fn verify(&self, token: &str) -> Result<Principal, AuthError> {
        let claims = self.decode(token).inspect_err(|e| {
            warn!(kind = e.kind(), "Token rejected");
        })?;

        let record = lookup_principal(self.store.as_ref(), &claims.sub, self.lookup_timeout)
            .await
            .inspect_err(|e| {
                warn!(login = %claims.sub, kind = e.kind(), "Token subject did not resolve");
            })?;

        // Same login, different account: the original was removed.
        if record.principal.id != claims.uid {
            warn!(login = %claims.sub, kind = "not_found", "Token subject was replaced");
            return Err(AuthError::NotFound);
        }

        debug!(user_id = claims.uid, "Token verified");
        Ok(record.principal)
    }

    /// Check structure, signature and expiry and return the signed claims.
    ///
    /// Touches neither the store nor any shared state.
    pub fn decode(&self, token: &str) -> Result<Claims, AuthError> {
        check_structure(token)?;

        let data = jsonwebtoken::decode::<Claims>(token, self.key.decoding_key(), &self.validation)
            .map_err(|e| classify(e.kind()))?;
        let claims = data.claims;

        if claims.is_expired_at(self.clock.now(), self.skew_secs) {
            return Err(AuthError::ExpiredToken);
        }
        Ok(claims)
    }
}

/// Reject anything that is not `header.payload.signature` with a JSON
/// header and payload.
///
/// Everything after the second `.` is the signature, so a stray `.` there
/// is a signature failure rather than a shape failure.
fn check_structure(token: &str) -> Result<(), AuthError> {
    let mut segments = token.splitn(3, '.');
    let (Some(header), Some(payload), Some(signature)) =
        (segments.next(), segments.next(), segments.next())
    else {
        return Err(AuthError::MalformedToken);
    };
    if header.is_empty() || payload.is_empty() || signature.is_empty() {
        return Err(AuthError::MalformedToken);
    }

    let header = URL_SAFE_NO_PAD
        .decode(header)
        .map_err(|_| AuthError::MalformedToken)?;
    serde_json::from_slice::<jsonwebtoken::Header>(&header)
        .map_err(|_| AuthError::MalformedToken)?;

    let payload = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|_| AuthError::MalformedToken)?;
    serde_json::from_slice::<serde_json::Map<String, serde_json::Value>>(&payload)
        .map_err(|_| AuthError::MalformedToken)?;

    if signature.contains('.') {
        return Err(AuthError::InvalidSignature);
    }
    Ok(())
}

/// Map a decode failure that happened after the structure check passed.
///
/// Header and payload already decoded cleanly at this point, so anything
/// other than a claim-shape problem comes from the signature segment.
fn classify(kind: &ErrorKind) -> AuthError {
    match kind {
        ErrorKind::Json(_)
        | ErrorKind::Utf8(_)
        | ErrorKind::InvalidToken
        | ErrorKind::MissingRequiredClaim(_) => AuthError::MalformedToken,
        _ => AuthError::InvalidSignature,
    }
}
