//! Auth Middleware
//!
//! `authenticate_request` runs on every auth route and stores the request's
//! [`Principal`] in the request extensions. The `require_*` layers then
//! enforce a capability on their route group.

use std::convert::Infallible;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{FromRequestParts, State};
use axum::http::Request;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::application::authenticate::RequestAuthenticator;
use crate::domain::policy::{Capability, authorize};
use crate::domain::principal::{AuthenticatedContext, Principal};
use crate::domain::repository::IdentityStore;
use crate::error::AuthError;

/// Middleware state
pub struct AuthMiddlewareState<S>
where
    S: IdentityStore,
{
    pub authenticator: Arc<RequestAuthenticator<S>>,
}

impl<S> Clone for AuthMiddlewareState<S>
where
    S: IdentityStore,
{
    fn clone(&self) -> Self {
        Self {
            authenticator: self.authenticator.clone(),
        }
    }
}

/// Resolve the principal, or reject the request when its token is invalid
pub async fn authenticate_request<S>(
    State(state): State<AuthMiddlewareState<S>>,
    mut req: Request<Body>,
    next: Next,
) -> Response
where
    S: IdentityStore + Send + Sync + 'static,
{
    let path = req.uri().path().to_owned();

    match state.authenticator.authenticate(&path, req.headers()).await {
        Ok(principal) => {
            req.extensions_mut().insert(principal);
            next.run(req).await
        }
        Err(e) => e.into_response(),
    }
}

/// Route layer: any authenticated principal
pub async fn require_authenticated(req: Request<Body>, next: Next) -> Response {
    require_capability(Capability::AnyAuthenticated, req, next).await
}

/// Route layer: admins only
pub async fn require_admin(req: Request<Body>, next: Next) -> Response {
    require_capability(Capability::AdminOnly, req, next).await
}

async fn require_capability(capability: Capability, req: Request<Body>, next: Next) -> Response {
    let decision = match req.extensions().get::<Principal>() {
        Some(principal) => authorize(principal, capability),
        None => authorize(&Principal::Anonymous, capability),
    };

    match decision {
        Ok(()) => next.run(req).await,
        Err(e) => e.into_response(),
    }
}

// ============================================================================
// Extractors
// ============================================================================

/// Missing principal (route outside `authenticate_request`) is anonymous
impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<Principal>().cloned().unwrap_or_default())
    }
}

impl<S> FromRequestParts<S> for AuthenticatedContext
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<Principal>() {
            Some(Principal::Authenticated(ctx)) => Ok(ctx.clone()),
            _ => Err(AuthError::Unauthenticated),
        }
    }
}
