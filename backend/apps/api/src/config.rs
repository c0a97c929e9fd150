//! Server configuration from the environment
//!
//! `.env` is loaded by `main` before this runs.

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use auth::AuthConfig;
use auth::application::BootstrapAdmin;
use platform::token::{DEFAULT_TOKEN_LIFETIME, MAX_TOKEN_LIFETIME};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_FRONTEND_URL: &str = "http://localhost:3000";
const DEFAULT_FRONTEND_ORIGINS: &str = "http://localhost:3000,http://127.0.0.1:3000";

pub struct ServerConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub jwt_secret: Option<String>,
    pub frontend_origins: Vec<String>,
    pub bootstrap_admin: Option<BootstrapAdmin>,
    pub auth: AuthConfig,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url =
            env::var("DATABASE_URL").context("DATABASE_URL must be set in environment")?;

        let bind_addr = optional("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .context("BIND_ADDR must be a socket address such as 0.0.0.0:8080")?;

        let token_lifetime = match optional("JWT_LIFETIME_SECS") {
            Some(secs) => token_lifetime(&secs)?,
            None => DEFAULT_TOKEN_LIFETIME,
        };

        // Secure cookies and untrusted proxy headers unless running a debug build
        let cookie_secure = flag("COOKIE_SECURE")?.unwrap_or(!cfg!(debug_assertions));
        let trust_proxy_identity = flag("TRUST_PROXY_IDENTITY")?.unwrap_or(cfg!(debug_assertions));

        let bootstrap_admin = match optional("BOOTSTRAP_ADMIN") {
            Some(raw) => Some(
                BootstrapAdmin::parse(&raw)
                    .context("BOOTSTRAP_ADMIN must look like username:password:email")?,
            ),
            None => None,
        };

        let frontend_origins = optional("FRONTEND_ORIGINS")
            .unwrap_or_else(|| DEFAULT_FRONTEND_ORIGINS.to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let auth = AuthConfig {
            token_lifetime,
            cookie_secure,
            trust_proxy_identity,
            frontend_url: optional("FRONTEND_URL")
                .unwrap_or_else(|| DEFAULT_FRONTEND_URL.to_string()),
            ..AuthConfig::default()
        };

        Ok(Self {
            database_url,
            bind_addr,
            jwt_secret: optional("JWT_SECRET"),
            frontend_origins,
            bootstrap_admin,
            auth,
        })
    }
}

/// Unset and blank are the same
fn optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn flag(name: &str) -> anyhow::Result<Option<bool>> {
    match optional(name).as_deref().map(str::trim) {
        None => Ok(None),
        Some("1" | "true" | "TRUE" | "yes") => Ok(Some(true)),
        Some("0" | "false" | "FALSE" | "no") => Ok(Some(false)),
        Some(other) => anyhow::bail!("{name} must be true or false, got {other:?}"),
    }
}

fn token_lifetime(raw: &str) -> anyhow::Result<Duration> {
    let secs: u64 = raw
        .trim()
        .parse()
        .context("JWT_LIFETIME_SECS must be a whole number of seconds")?;
    let lifetime = Duration::from_secs(secs);

    anyhow::ensure!(secs > 0, "JWT_LIFETIME_SECS must be positive");
    anyhow::ensure!(
        lifetime <= MAX_TOKEN_LIFETIME,
        "JWT_LIFETIME_SECS must be at most {} seconds",
        MAX_TOKEN_LIFETIME.as_secs()
    );
    Ok(lifetime)
}
