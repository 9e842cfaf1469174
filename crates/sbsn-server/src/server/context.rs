//! Per-request security context populated from the bearer token.

use std::convert::Infallible;

use axum::extract::{FromRequestParts, Request, State};
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use tracing::debug;

use super::AppState;
use super::error::ApiError;
use crate::auth::Principal;

/// Who is making the current request. Lives only as long as the request.
#[derive(Debug, Clone, Default)]
pub struct SecurityContext {
    principal: Option<Principal>,
}

impl SecurityContext {
    pub const fn anonymous() -> Self {
        Self { principal: None }
    }

    pub const fn authenticated(principal: Principal) -> Self {
        Self {
            principal: Some(principal),
        }
    }

    pub const fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    pub const fn is_authenticated(&self) -> bool {
        self.principal.is_some()
    }
}

/// Extract the token from `Authorization: Bearer <token>`.
///
/// `Ok(None)` when the header is absent; any other scheme is rejected.
fn bearer_token(headers: &HeaderMap) -> Result<Option<&str>, ApiError> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return Ok(None);
    };
    value
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(Some)
        .ok_or_else(ApiError::unauthenticated)
}

/// Middleware: verify any presented bearer token and attach a fresh
/// [`SecurityContext`] to the request.
pub async fn security_context(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let context = match bearer_token(req.headers())? {
        Some(token) => SecurityContext::authenticated(state.verifier.verify(token).await?),
        None => SecurityContext::anonymous(),
    };
    debug!(
        authenticated = context.is_authenticated(),
        "Security context established"
    );
    req.extensions_mut().insert(context);
    Ok(next.run(req).await)
}

impl<S: Send + Sync> FromRequestParts<S> for SecurityContext {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<Self>()
            .cloned()
            .unwrap_or_default())
    }
}

/// Extractor that only succeeds for authenticated requests.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Principal);

impl<S: Send + Sync> FromRequestParts<S> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SecurityContext>()
            .and_then(SecurityContext::principal)
            .cloned()
            .map(Self)
            .ok_or_else(ApiError::unauthenticated)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn missing_header_is_anonymous() {
        assert!(bearer_token(&HeaderMap::new()).unwrap().is_none());
    }

    #[test]
    fn bearer_token_passed_verbatim() {
        let h = headers("Bearer abc.def.ghi");
        assert_eq!(bearer_token(&h).unwrap(), Some("abc.def.ghi"));

        let h = headers("Bearer  padded ");
        assert_eq!(bearer_token(&h).unwrap(), Some(" padded "));
    }

    #[test]
    fn other_schemes_rejected() {
        for value in ["Basic YWxpY2U6c2VjcmV0", "bearer abc", "Bearerabc"] {
            let err = bearer_token(&headers(value)).unwrap_err();
            assert_eq!(err.status(), axum::http::StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn context_accessors() {
        assert!(!SecurityContext::anonymous().is_authenticated());
        let ctx = SecurityContext::authenticated(Principal {
            id: 1,
            login: "alice".into(),
            first_name: String::new(),
            last_name: String::new(),
            authorities: std::collections::BTreeSet::new(),
        });
        assert_eq!(ctx.principal().unwrap().login, "alice");
    }
}
