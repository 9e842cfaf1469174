//! Error taxonomy for the authentication core.

/// Failures raised by credential checks, token handling and registration.
///
/// Every variant for which [`AuthError::is_unauthenticated`] holds is shown
/// to clients as one indistinguishable "unauthenticated" outcome; the
/// precise kind only reaches logs.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Principal not found")]
    NotFound,

    #[error("Malformed token")]
    MalformedToken,

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Token expired")]
    ExpiredToken,

    #[error("Token signing failed: {0}")]
    Signing(String),

    #[error("Principal lookup timed out")]
    DependencyTimeout,

    #[error("Principal store failure: {0}")]
    Store(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Conflict: {0}")]
    Conflict(String),
}

impl AuthError {
    /// Stable name for logs and metrics.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "invalid_credentials",
            Self::NotFound => "not_found",
            Self::MalformedToken => "malformed_token",
            Self::InvalidSignature => "invalid_signature",
            Self::ExpiredToken => "expired_token",
            Self::Signing(_) => "signing",
            Self::DependencyTimeout => "dependency_timeout",
            Self::Store(_) => "store",
            Self::InvalidInput(_) => "invalid_input",
            Self::Conflict(_) => "conflict",
        }
    }

    /// Whether this failure collapses into the uniform unauthenticated outcome.
    pub const fn is_unauthenticated(&self) -> bool {
        matches!(
            self,
            Self::InvalidCredentials
                | Self::NotFound
                | Self::MalformedToken
                | Self::InvalidSignature
                | Self::ExpiredToken
                | Self::DependencyTimeout
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_and_credential_failures_are_unauthenticated() {
        for err in [
            AuthError::InvalidCredentials,
            AuthError::NotFound,
            AuthError::MalformedToken,
            AuthError::InvalidSignature,
            AuthError::ExpiredToken,
            AuthError::DependencyTimeout,
        ] {
            assert!(err.is_unauthenticated(), "{}", err.kind());
        }
    }

    #[test]
    fn configuration_and_input_failures_are_not() {
        assert!(!AuthError::Signing("no key".into()).is_unauthenticated());
        assert!(!AuthError::Store("io".into()).is_unauthenticated());
        assert!(!AuthError::InvalidInput("short".into()).is_unauthenticated());
        assert!(!AuthError::Conflict("taken".into()).is_unauthenticated());
    }
}
