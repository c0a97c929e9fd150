//! HTTP Handlers

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Redirect, Response};
use platform::cookie::set_cookie_header;
use platform::token::TokenService;
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::{
    AccountSettingsUseCase, ChangePasswordInput, ExternalIdentity, ExternalSignInUseCase,
    SignInInput, SignInUseCase, SignUpInput, SignUpUseCase,
};
use crate::domain::principal::{AuthenticatedContext, Principal};
use crate::domain::repository::IdentityStore;
use crate::domain::value_object::AccountId;
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{
    AccountResponse, AuthStatusResponse, ChangePasswordRequest, LoginRequest, LoginResponse,
    RegisterRequest, UpdateRoleRequest,
};

/// Identity headers set by the fronting OAuth2 proxy (oauth2-proxy convention)
pub const EXTERNAL_EMAIL_HEADER: &str = "x-auth-request-email";
pub const EXTERNAL_USER_HEADER: &str = "x-auth-request-user";
pub const EXTERNAL_PREFERRED_USERNAME_HEADER: &str = "x-auth-request-preferred-username";
pub const EXTERNAL_PROVIDER_HEADER: &str = "x-auth-request-provider";

/// Shared state for auth handlers
pub struct AuthAppState<S> {
    pub store: Arc<S>,
    pub tokens: Arc<TokenService>,
    pub config: Arc<AuthConfig>,
}

impl<S> Clone for AuthAppState<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            tokens: self.tokens.clone(),
            config: self.config.clone(),
        }
    }
}

// ============================================================================
// Register
// ============================================================================

/// POST /api/auth/register
pub async fn register<S>(
    State(state): State<AuthAppState<S>>,
    Json(req): Json<RegisterRequest>,
) -> AuthResult<impl IntoResponse>
where
    S: IdentityStore + Send + Sync + 'static,
{
    let use_case = SignUpUseCase::new(state.store.clone(), state.config.clone());

    let account = use_case
        .execute(SignUpInput {
            user_name: req.username,
            password: req.password,
            email: req.email,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(AccountResponse::from(&account))))
}

// ============================================================================
// Login / Logout
// ============================================================================

/// POST /api/auth/login
///
/// The token is returned in the body and also set as the `jwtToken` cookie.
pub async fn login<S>(
    State(state): State<AuthAppState<S>>,
    Json(req): Json<LoginRequest>,
) -> AuthResult<Response>
where
    S: IdentityStore + Send + Sync + 'static,
{
    let use_case = SignInUseCase::new(
        state.store.clone(),
        state.tokens.clone(),
        state.config.clone(),
    );

    let output = use_case
        .execute(SignInInput {
            user_name: req.username,
            password: req.password,
        })
        .await?;

    let cookie = state.config.token_cookie().build_set_cookie(&output.token);

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, set_cookie_header(&cookie))],
        Json(LoginResponse {
            token: output.token,
            token_type: "Bearer",
            expires_in: state.tokens.lifetime().as_secs(),
            username: output.account.user_name.into_db(),
            role: output.account.role,
        }),
    )
        .into_response())
}

/// POST /api/auth/logout
///
/// Clears the cookie only; the token itself stays valid until it expires.
pub async fn logout<S>(State(state): State<AuthAppState<S>>) -> impl IntoResponse
where
    S: IdentityStore + Send + Sync + 'static,
{
    let cookie = state.config.token_cookie().build_delete_cookie();
    (
        StatusCode::NO_CONTENT,
        [(header::SET_COOKIE, set_cookie_header(&cookie))],
    )
}

// ============================================================================
// Status / Current account
// ============================================================================

/// GET /api/auth/status
pub async fn status(principal: Principal) -> Json<AuthStatusResponse> {
    Json(AuthStatusResponse::from(&principal))
}

/// GET /api/auth/me
pub async fn me<S>(
    State(state): State<AuthAppState<S>>,
    ctx: AuthenticatedContext,
) -> AuthResult<Json<AccountResponse>>
where
    S: IdentityStore + Send + Sync + 'static,
{
    let use_case = AccountSettingsUseCase::new(state.store.clone(), state.config.clone());
    let account = use_case.current_account(&ctx).await?;
    Ok(Json(AccountResponse::from(&account)))
}

/// PUT /api/auth/password
pub async fn change_password<S>(
    State(state): State<AuthAppState<S>>,
    ctx: AuthenticatedContext,
    Json(req): Json<ChangePasswordRequest>,
) -> AuthResult<StatusCode>
where
    S: IdentityStore + Send + Sync + 'static,
{
    let use_case = AccountSettingsUseCase::new(state.store.clone(), state.config.clone());
    use_case
        .change_password(
            &ctx,
            ChangePasswordInput {
                current_password: req.current_password,
                new_password: req.new_password,
            },
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Administration
// ============================================================================

/// PUT /api/admin/accounts/{id}/role
pub async fn update_role<S>(
    State(state): State<AuthAppState<S>>,
    ctx: AuthenticatedContext,
    Path(account_id): Path<i64>,
    Json(req): Json<UpdateRoleRequest>,
) -> AuthResult<Json<AccountResponse>>
where
    S: IdentityStore + Send + Sync + 'static,
{
    let use_case = AccountSettingsUseCase::new(state.store.clone(), state.config.clone());
    let account = use_case
        .assign_role(&ctx, AccountId::from_i64(account_id), req.role)
        .await?;
    Ok(Json(AccountResponse::from(&account)))
}

// ============================================================================
// External sign-in
// ============================================================================

/// GET /api/auth/oauth2/callback
///
/// Reached after the proxy has completed the provider handshake. Sets the
/// token cookie and redirects to the front end with the token in the query.
pub async fn oauth2_callback<S>(
    State(state): State<AuthAppState<S>>,
    headers: HeaderMap,
) -> AuthResult<Response>
where
    S: IdentityStore + Send + Sync + 'static,
{
    if !state.config.trust_proxy_identity {
        tracing::warn!("External sign-in attempted but proxy identity headers are not trusted");
        return Err(AuthError::Unauthenticated);
    }

    let identity = external_identity(&headers, &state.config.default_external_provider);
    let use_case = ExternalSignInUseCase::new(state.store.clone(), state.tokens.clone());
    let output = use_case.execute(&identity).await?;

    let cookie = state.config.token_cookie().build_set_cookie(&output.token);
    let target = state.config.external_redirect_url(&output.token);

    Ok((
        [(header::SET_COOKIE, set_cookie_header(&cookie))],
        Redirect::to(&target),
    )
        .into_response())
}

fn external_identity(headers: &HeaderMap, default_provider: &str) -> ExternalIdentity {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    ExternalIdentity {
        email: header(EXTERNAL_EMAIL_HEADER),
        display_name: header(EXTERNAL_PREFERRED_USERNAME_HEADER)
            .or_else(|| header(EXTERNAL_USER_HEADER)),
        provider: header(EXTERNAL_PROVIDER_HEADER).unwrap_or_else(|| default_provider.to_string()),
    }
}

// ============================================================================
// Error page
// ============================================================================

/// GET /error
pub async fn error_page() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "error",
        "message": "An error occurred",
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_external_identity_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(EXTERNAL_EMAIL_HEADER, HeaderValue::from_static("bob@x.com"));
        headers.insert(EXTERNAL_USER_HEADER, HeaderValue::from_static("12345"));
        headers.insert(
            EXTERNAL_PREFERRED_USERNAME_HEADER,
            HeaderValue::from_static("Bob"),
        );

        let identity = external_identity(&headers, "oauth2");
        assert_eq!(identity.email.as_deref(), Some("bob@x.com"));
        assert_eq!(identity.display_name.as_deref(), Some("Bob"));
        assert_eq!(identity.provider, "oauth2");
    }

    #[test]
    fn test_blank_headers_are_absent() {
        let mut headers = HeaderMap::new();
        headers.insert(EXTERNAL_EMAIL_HEADER, HeaderValue::from_static("  "));
        headers.insert(EXTERNAL_PROVIDER_HEADER, HeaderValue::from_static("github"));

        let identity = external_identity(&headers, "oauth2");
        assert!(identity.email.is_none());
        assert!(identity.display_name.is_none());
        assert_eq!(identity.provider, "github");
    }
}
