//! JWT claims structure for SBSN bearer tokens.

use serde::{Deserialize, Serialize};

/// JWT claims embedded in access tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// JWT ID (unique per token).
    pub jti: String,
    /// Subject (login handle).
    pub sub: String,
    /// Numeric user identity.
    pub uid: i64,
    /// Issued at (unix timestamp).
    pub iat: i64,
    /// Expiration (unix timestamp).
    pub exp: i64,
}

impl Claims {
    /// Expired at `exp` itself; `skew_secs` pushes the cut-off later.
    pub const fn is_expired_at(&self, now: i64, skew_secs: i64) -> bool {
        now >= self.exp.saturating_add(skew_secs)
    }
}
