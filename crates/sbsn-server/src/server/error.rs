//! HTTP error responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::error;

use crate::auth::AuthError;

/// Message shared by every authentication failure, whatever the cause.
pub const UNAUTHENTICATED_MESSAGE: &str = "Invalid credentials or token";

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

/// An error as the client sees it.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    pub fn unauthenticated() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            code: "UNAUTHENTICATED",
            message: UNAUTHENTICATED_MESSAGE.to_string(),
        }
    }

    fn internal() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "INTERNAL",
            message: "Internal server error".to_string(),
        }
    }

    pub const fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        if e.is_unauthenticated() {
            return Self::unauthenticated();
        }
        match e {
            AuthError::InvalidInput(message) => Self {
                status: StatusCode::BAD_REQUEST,
                code: "INVALID_INPUT",
                message,
            },
            AuthError::Conflict(message) => Self {
                status: StatusCode::CONFLICT,
                code: "CONFLICT",
                message,
            },
            other => {
                error!(kind = other.kind(), error = %other, "Request failed");
                Self::internal()
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                code: self.code,
                message: self.message,
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_auth_failure_looks_the_same() {
        let statuses: Vec<_> = [
            AuthError::InvalidCredentials,
            AuthError::NotFound,
            AuthError::ExpiredToken,
            AuthError::DependencyTimeout,
        ]
        .into_iter()
        .map(ApiError::from)
        .map(|e| (e.status, e.code, e.message))
        .collect();

        assert!(statuses.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(statuses[0].0, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn signing_failure_hides_detail() {
        let err = ApiError::from(AuthError::Signing("key material missing".into()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.message.contains("key"));
    }

    #[test]
    fn input_and_conflict_keep_their_message() {
        let err = ApiError::from(AuthError::InvalidInput("Login too short".into()));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Login too short");

        let err = ApiError::from(AuthError::Conflict("Login already taken".into()));
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }
}
