//! Request Authentication
//!
//! Turns a request's path and headers into a [`Principal`].
//!
//! 1. Public paths are anonymous without looking at any token.
//! 2. The token is taken from the `jwtToken` cookie, else from
//!    `Authorization: Bearer`. Neither present → anonymous.
//! 3. An invalid token is an error (401), never a silent downgrade.
//! 4. A valid token whose subject no longer exists → anonymous.

use std::sync::Arc;

use axum::http::HeaderMap;
use platform::bearer::extract_bearer_token;
use platform::cookie::extract_cookie;
use platform::token::TokenService;

use crate::application::config::AuthConfig;
use crate::domain::principal::{AuthenticatedContext, Principal};
use crate::domain::repository::IdentityStore;
use crate::domain::value_object::UserName;
use crate::error::{AuthError, AuthResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    Cookie,
    AuthorizationHeader,
}

/// Locate the request token; the cookie wins when both are present
pub fn extract_token(headers: &HeaderMap, cookie_name: &str) -> Option<(String, TokenSource)> {
    extract_cookie(headers, cookie_name)
        .map(|token| (token, TokenSource::Cookie))
        .or_else(|| {
            extract_bearer_token(headers).map(|token| (token, TokenSource::AuthorizationHeader))
        })
}

pub struct RequestAuthenticator<S>
where
    S: IdentityStore,
{
    store: Arc<S>,
    tokens: Arc<TokenService>,
    config: Arc<AuthConfig>,
}

impl<S> RequestAuthenticator<S>
where
    S: IdentityStore,
{
    pub fn new(store: Arc<S>, tokens: Arc<TokenService>, config: Arc<AuthConfig>) -> Self {
        Self {
            store,
            tokens,
            config,
        }
    }

    pub async fn authenticate(&self, path: &str, headers: &HeaderMap) -> AuthResult<Principal> {
        if self.config.is_public_path(path) {
            return Ok(Principal::Anonymous);
        }

        let Some((token, source)) = extract_token(headers, &self.config.token_cookie_name) else {
            return Ok(Principal::Anonymous);
        };

        let subject = self.tokens.validate(&token).map_err(|e| {
            tracing::debug!(?source, path, reason = %e, "Token validation failed");
            AuthError::Token(e)
        })?;

        let user_name = UserName::from_db(subject);
        match self.store.find_by_user_name(&user_name).await? {
            Some(account) => Ok(Principal::Authenticated(AuthenticatedContext::from(&account))),
            None => {
                tracing::info!(
                    user_name = %user_name,
                    "Valid token for unknown account; treating request as anonymous"
                );
                Ok(Principal::Anonymous)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, header};
    use chrono::Utc;
    use platform::token::{DEFAULT_TOKEN_LIFETIME, TokenError};

    use crate::domain::entity::NewAccount;
    use crate::domain::value_object::{CredentialRecord, Email, Role};
    use crate::infra::memory::InMemoryIdentityStore;

    const SECRET: &[u8] = b"authenticator-test-secret-0123456789";

    struct Fixture {
        store: Arc<InMemoryIdentityStore>,
        tokens: Arc<TokenService>,
        authenticator: RequestAuthenticator<InMemoryIdentityStore>,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(InMemoryIdentityStore::new());
        store
            .insert(
                &NewAccount::local(
                    UserName::new("alice").unwrap(),
                    Email::new("alice@x.com").unwrap(),
                    CredentialRecord::new("c2FsdA==", "aGFzaA=="),
                )
                .with_role(Role::Admin),
            )
            .await
            .unwrap();
        let tokens = Arc::new(TokenService::new(SECRET, DEFAULT_TOKEN_LIFETIME));
        let authenticator = RequestAuthenticator::new(
            store.clone(),
            tokens.clone(),
            Arc::new(AuthConfig::development()),
        );
        Fixture {
            store,
            tokens,
            authenticator,
        }
    }

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        headers
    }

    fn cookie(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("jwtToken={token}")).unwrap(),
        );
        headers
    }

    #[tokio::test]
    async fn test_no_token_is_anonymous() {
        let f = fixture().await;
        let principal = f
            .authenticator
            .authenticate("/api/courses", &HeaderMap::new())
            .await
            .unwrap();
        assert_eq!(principal, Principal::Anonymous);
    }

    #[tokio::test]
    async fn test_bearer_and_cookie_tokens() {
        let f = fixture().await;
        let token = f.tokens.issue("alice").unwrap();

        for headers in [bearer(&token), cookie(&token)] {
            let principal = f
                .authenticator
                .authenticate("/api/courses", &headers)
                .await
                .unwrap();
            let ctx = principal.context().unwrap();
            assert_eq!(ctx.user_name, "alice");
            assert_eq!(ctx.role, Role::Admin);
        }
    }

    #[tokio::test]
    async fn test_cookie_takes_precedence() {
        let f = fixture().await;
        let good = f.tokens.issue("alice").unwrap();

        let mut headers = cookie(&good);
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer garbage"),
        );
        let principal = f
            .authenticator
            .authenticate("/api/courses", &headers)
            .await
            .unwrap();
        assert!(principal.is_authenticated());
        assert_eq!(
            extract_token(&headers, "jwtToken").map(|(_, s)| s),
            Some(TokenSource::Cookie)
        );
    }

    #[tokio::test]
    async fn test_invalid_tokens_are_rejected() {
        let f = fixture().await;
        let expired = f
            .tokens
            .issue_at("alice", Utc::now() - chrono::Duration::hours(25))
            .unwrap();

        let err = f
            .authenticator
            .authenticate("/api/courses", &bearer(&expired))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Token(TokenError::Expired)));

        let err = f
            .authenticator
            .authenticate("/api/courses", &bearer("not.a.token"))
            .await
            .unwrap_err();
        assert!(err.is_unauthenticated());
    }

    #[tokio::test]
    async fn test_public_path_ignores_token() {
        let f = fixture().await;
        let principal = f
            .authenticator
            .authenticate("/api/auth/login", &bearer("not.a.token"))
            .await
            .unwrap();
        assert_eq!(principal, Principal::Anonymous);
    }

    #[tokio::test]
    async fn test_unknown_subject_is_anonymous() {
        let f = fixture().await;
        let token = f.tokens.issue("ghost").unwrap();
        let principal = f
            .authenticator
            .authenticate("/api/courses", &bearer(&token))
            .await
            .unwrap();
        assert_eq!(principal, Principal::Anonymous);
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let f = fixture().await;
        let token = f.tokens.issue("alice").unwrap();
        f.store.set_unavailable(true);

        let err = f
            .authenticator
            .authenticate("/api/courses", &bearer(&token))
            .await
            .unwrap_err();
        assert!(err.kind().is_server_error());
    }
}
