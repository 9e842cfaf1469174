//! HTTP boundary for SBSN.
//!
//! Builds the axum router, the shared [`AppState`], and the middleware that
//! turns bearer tokens into a per-request [`SecurityContext`].

pub mod auth_routes;
pub mod context;
pub mod error;


use std::sync::Arc;

use axum::Router;
use axum::middleware;
use axum::routing::{get, post};
use sbsn_core::AuthConfig;

use crate::auth::{
    AccountStore, Clock, CredentialAuthenticator, PrincipalStore, Registrar, SigningKey,
    TokenIssuer, TokenVerifier,
};

pub use context::{AuthenticatedUser, SecurityContext};
pub use error::ApiError;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub authenticator: CredentialAuthenticator,
    pub issuer: TokenIssuer,
    pub verifier: Arc<TokenVerifier>,
    pub registrar: Registrar,
}

impl AppState {
    /// Wire the auth components to one store, one key and one clock.
    pub fn new<S>(
        store: Arc<S>,
        key: Arc<SigningKey>,
        clock: Arc<dyn Clock>,
        config: &AuthConfig,
    ) -> Self
    where
        S: PrincipalStore + AccountStore + 'static,
    {
        let lookup: Arc<dyn PrincipalStore> = store.clone();
        let accounts: Arc<dyn AccountStore> = store;
        let timeout = config.lookup_timeout();

        Self {
            authenticator: CredentialAuthenticator::new(Arc::clone(&lookup), timeout),
            issuer: TokenIssuer::new(Arc::clone(&key), Arc::clone(&clock), config.token_ttl_secs),
            verifier: Arc::new(TokenVerifier::new(
                key,
                clock,
                lookup,
                config.clock_skew_secs,
                timeout,
            )),
            registrar: Registrar::new(accounts),
        }
    }
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(auth_routes::healthz))
        .route("/v1/signUp", post(auth_routes::sign_up))
        .route("/v1/signIn", post(auth_routes::sign_in))
        .route("/v1/users/me", get(auth_routes::me))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            context::security_context,
        ))
        .with_state(state)
}
