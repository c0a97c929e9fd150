//! Auth Router
//!
//! Routes carry absolute paths so the public-path check sees the same path
//! the client sent; merge this router rather than nesting it.

use axum::{
    Router, middleware,
    routing::{get, post, put},
};
use platform::token::TokenService;
use std::sync::Arc;

use crate::application::authenticate::RequestAuthenticator;
use crate::application::config::AuthConfig;
use crate::domain::repository::IdentityStore;
use crate::infra::postgres::PgIdentityStore;
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::{
    AuthMiddlewareState, authenticate_request, require_admin, require_authenticated,
};

/// Create the Auth router with the PostgreSQL store
pub fn auth_router(store: PgIdentityStore, tokens: Arc<TokenService>, config: AuthConfig) -> Router {
    auth_router_generic(store, tokens, config)
}

/// Create the Auth router for any store implementation
pub fn auth_router_generic<S>(store: S, tokens: Arc<TokenService>, config: AuthConfig) -> Router
where
    S: IdentityStore + Send + Sync + 'static,
{
    let store = Arc::new(store);
    let config = Arc::new(config);

    let state = AuthAppState {
        store: store.clone(),
        tokens: tokens.clone(),
        config: config.clone(),
    };
    let authn = AuthMiddlewareState {
        authenticator: Arc::new(RequestAuthenticator::new(store, tokens, config)),
    };

    let public = Router::new()
        .route("/api/auth/register", post(handlers::register::<S>))
        .route("/api/auth/login", post(handlers::login::<S>))
        .route("/api/auth/oauth2/callback", get(handlers::oauth2_callback::<S>))
        .route("/error", get(handlers::error_page))
        .route("/api/auth/logout", post(handlers::logout::<S>))
        .route("/api/auth/status", get(handlers::status));

    let authenticated = Router::new()
        .route("/api/auth/me", get(handlers::me::<S>))
        .route("/api/auth/password", put(handlers::change_password::<S>))
        .route_layer(middleware::from_fn(require_authenticated));

    let admin = Router::new()
        .route(
            "/api/admin/accounts/{id}/role",
            put(handlers::update_role::<S>),
        )
        .route_layer(middleware::from_fn(require_admin));

    public
        .merge(authenticated)
        .merge(admin)
        .layer(middleware::from_fn_with_state(
            authn,
            authenticate_request::<S>,
        ))
        .with_state(state)
}
