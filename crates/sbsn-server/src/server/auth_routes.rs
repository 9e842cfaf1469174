//! Sign-up, sign-in and current-user handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Serialize;
use tracing::{info, instrument};

use super::AppState;
use super::context::AuthenticatedUser;
use super::error::ApiError;
use crate::auth::{Credentials, IssuedToken, NewAccount, Principal};

/// Body returned after a successful sign-up or sign-in.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub token: String,
    pub expires_at: i64,
    pub expires_in: i64,
    pub user: Principal,
}

impl TokenResponse {
    fn new(issued: IssuedToken, user: Principal) -> Self {
        Self {
            token: issued.token,
            expires_at: issued.expires_at,
            expires_in: issued.expires_in_secs,
            user,
        }
    }
}

/// `POST /v1/signUp`
#[instrument(skip_all, fields(route = "signUp"))]
pub async fn sign_up(
    State(state): State<AppState>,
    Json(account): Json<NewAccount>,
) -> Result<(StatusCode, Json<TokenResponse>), ApiError> {
    let principal = state.registrar.register(account).await?;
    let issued = state.issuer.issue(&principal)?;
    Ok((
        StatusCode::CREATED,
        Json(TokenResponse::new(issued, principal)),
    ))
}

/// `POST /v1/signIn`
#[instrument(skip_all, fields(route = "signIn"))]
pub async fn sign_in(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<TokenResponse>, ApiError> {
    let principal = state.authenticator.authenticate(credentials).await?;
    let issued = state.issuer.issue(&principal)?;

    info!(user_id = principal.id, login = %principal.login, "User signed in");
    Ok(Json(TokenResponse::new(issued, principal)))
}

/// `GET /v1/users/me`
pub async fn me(AuthenticatedUser(principal): AuthenticatedUser) -> Json<Principal> {
    Json(principal)
}

/// `GET /healthz`
pub async fn healthz() -> &'static str {
    "ok"
}
