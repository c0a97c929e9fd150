//! Application Configuration
//!
//! Configuration for the Auth application layer.

use std::time::Duration;

use platform::cookie::CookieConfig;
use platform::password::CredentialHasher;
use platform::token::DEFAULT_TOKEN_LIFETIME;

/// Re-export SameSite from platform
pub use platform::cookie::SameSite;

/// Paths that skip token processing entirely
pub const DEFAULT_PUBLIC_PATH_PREFIXES: &[&str] = &[
    "/api/auth/login",
    "/api/auth/register",
    "/api/auth/oauth2",
    "/error",
];

/// Provider tag used when the proxy does not name one
pub const DEFAULT_EXTERNAL_PROVIDER: &str = "oauth2";

#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Token cookie name
    pub token_cookie_name: String,
    /// Token lifetime; also the cookie Max-Age
    pub token_lifetime: Duration,
    pub cookie_secure: bool,
    pub cookie_same_site: SameSite,
    /// Path prefixes bypassing authentication (matched on segment boundaries)
    pub public_path_prefixes: Vec<String>,
    /// Front-end base URL the external sign-in callback redirects to
    pub frontend_url: String,
    /// Accept `X-Auth-Request-*` identity headers on the external callback.
    /// Only safe behind a proxy that strips them from client requests.
    pub trust_proxy_identity: bool,
    pub default_external_provider: String,
    pub hasher: CredentialHasher,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_cookie_name: "jwtToken".to_string(),
            token_lifetime: DEFAULT_TOKEN_LIFETIME,
            cookie_secure: true,
            cookie_same_site: SameSite::Lax,
            public_path_prefixes: DEFAULT_PUBLIC_PATH_PREFIXES
                .iter()
                .map(|p| p.to_string())
                .collect(),
            frontend_url: "http://localhost:3000".to_string(),
            trust_proxy_identity: false,
            default_external_provider: DEFAULT_EXTERNAL_PROVIDER.to_string(),
            hasher: CredentialHasher::default(),
        }
    }
}

impl AuthConfig {
    /// Create config for development (insecure cookie, trusted proxy headers)
    pub fn development() -> Self {
        Self {
            cookie_secure: false,
            trust_proxy_identity: true,
            ..Default::default()
        }
    }

    /// Whether `path` bypasses authentication
    ///
    /// `/api/auth/login` matches itself and `/api/auth/login/...`, but not
    /// `/api/auth/loginx`.
    pub fn is_public_path(&self, path: &str) -> bool {
        self.public_path_prefixes.iter().any(|prefix| {
            let prefix = prefix.trim_end_matches('/');
            match path.strip_prefix(prefix) {
                Some(rest) => rest.is_empty() || rest.starts_with('/'),
                None => false,
            }
        })
    }

    /// Cookie attributes for the token cookie
    pub fn token_cookie(&self) -> CookieConfig {
        CookieConfig {
            name: self.token_cookie_name.clone(),
            secure: self.cookie_secure,
            http_only: true,
            same_site: self.cookie_same_site,
            path: "/".to_string(),
            max_age_secs: Some(self.token_lifetime.as_secs()),
        }
    }

    /// Where the external sign-in callback sends the browser
    pub fn external_redirect_url(&self, token: &str) -> String {
        format!(
            "{}/oauth2/redirect?token={}",
            self.frontend_url.trim_end_matches('/'),
            token
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_path_matching() {
        let config = AuthConfig::default();
        assert!(config.is_public_path("/api/auth/login"));
        assert!(config.is_public_path("/api/auth/register"));
        assert!(config.is_public_path("/api/auth/oauth2/callback"));
        assert!(config.is_public_path("/error"));

        assert!(!config.is_public_path("/api/auth/loginx"));
        assert!(!config.is_public_path("/api/auth/status"));
        assert!(!config.is_public_path("/api/admin/accounts/1/role"));
        assert!(!config.is_public_path("/"));
    }

    #[test]
    fn test_token_cookie_matches_lifetime() {
        let config = AuthConfig::development();
        let cookie = config.token_cookie();
        assert_eq!(cookie.name, "jwtToken");
        assert_eq!(cookie.max_age_secs, Some(86_400));
        assert!(!cookie.secure);
        assert!(cookie.http_only);
    }

    #[test]
    fn test_external_redirect_url() {
        let config = AuthConfig {
            frontend_url: "https://learn.example.com/".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.external_redirect_url("a.b.c"),
            "https://learn.example.com/oauth2/redirect?token=a.b.c"
        );
    }
}
