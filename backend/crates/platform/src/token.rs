//! Stateless Signed Tokens
//!
//! HS256 JWTs carrying a subject (user name), issue time and expiry.
//!
//! ## Security Model
//! - One symmetric signing key per process, injected at startup
//! - Signature is checked before expiry
//! - No revocation: a token stays valid until `exp`, even after the
//!   account's password or role changes
//! - The built-in fallback key is for local development only

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default token lifetime (24 hours)
pub const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(24 * 3600);

/// Longest lifetime a token may be issued with (10 years)
pub const MAX_TOKEN_LIFETIME: Duration = Duration::from_secs(10 * 365 * 24 * 3600);

/// Development-only signing secret used when none is configured.
///
/// Anyone who reads this source can mint valid tokens for a server running
/// with it. Always set `JWT_SECRET` outside local development.
pub const DEV_FALLBACK_SIGNING_SECRET: &str =
    "learning-platform-dev-signing-secret-change-me-0123456789abcdef";

/// Minimum secret length recommended for HS256
const RECOMMENDED_SECRET_LEN: usize = 32;

// ============================================================================
// Errors
// ============================================================================

/// Token issuance and validation errors
///
/// Kept distinct for logging; the request boundary collapses every
/// validation variant into a single "unauthenticated" outcome.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Token (or subject) was empty
    #[error("Token is empty")]
    InvalidInput,

    /// Token could not be parsed
    #[error("Token is malformed")]
    Malformed,

    /// Signature does not match the signing key
    #[error("Token signature is invalid")]
    InvalidSignature,

    /// `now` is past the token's expiry
    #[error("Token has expired")]
    Expired,

    /// Encoding failed while issuing
    #[error("Token signing failed: {0}")]
    Signing(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                TokenError::InvalidSignature
            }
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Malformed,
        }
    }
}

// ============================================================================
// Claims
// ============================================================================

/// Registered claims embedded in every token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: the account's user name
    pub sub: String,
    /// Issued at (Unix seconds)
    pub iat: i64,
    /// Expires at (Unix seconds), always `iat + lifetime`
    pub exp: i64,
}

// ============================================================================
// Signing secret resolution
// ============================================================================

/// Where the signing secret came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretSource {
    Configured,
    DevelopmentFallback,
}

/// Pick the configured secret or fall back to [`DEV_FALLBACK_SIGNING_SECRET`]
///
/// Blank values count as unset. The fallback is logged at `warn`.
pub fn resolve_signing_secret(configured: Option<String>) -> (Vec<u8>, SecretSource) {
    match configured {
        Some(secret) if !secret.trim().is_empty() => {
            if secret.len() < RECOMMENDED_SECRET_LEN {
                tracing::warn!(
                    length = secret.len(),
                    recommended = RECOMMENDED_SECRET_LEN,
                    "JWT signing secret is shorter than recommended"
                );
            }
            (secret.into_bytes(), SecretSource::Configured)
        }
        _ => {
            tracing::warn!(
                "JWT_SECRET is not set; using the built-in development signing secret. \
                 Tokens can be forged by anyone with access to the source. \
                 Never run like this outside local development."
            );
            (
                DEV_FALLBACK_SIGNING_SECRET.as_bytes().to_vec(),
                SecretSource::DevelopmentFallback,
            )
        }
    }
}

// ============================================================================
// Token Service
// ============================================================================

/// Issues and validates signed tokens
///
/// Cheap to share behind an `Arc`; holds no mutable state.
///
/// ## Examples
/// ```rust
/// use platform::token::{TokenService, DEFAULT_TOKEN_LIFETIME};
///
/// let tokens = TokenService::new(b"0123456789abcdef0123456789abcdef", DEFAULT_TOKEN_LIFETIME);
/// let token = tokens.issue("alice").unwrap();
/// assert_eq!(tokens.validate(&token).unwrap(), "alice");
/// ```
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    lifetime: Duration,
}

impl TokenService {
    pub fn new(secret: &[u8], lifetime: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against an explicit clock in `validate_at`.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            lifetime,
        }
    }

    /// Configured token lifetime
    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Issue a token for `subject`, valid from now for the configured lifetime
    pub fn issue(&self, subject: &str) -> Result<String, TokenError> {
        self.issue_at(subject, Utc::now())
    }

    /// Issue a token as if the current time were `now`
    pub fn issue_at(&self, subject: &str, now: DateTime<Utc>) -> Result<String, TokenError> {
        if subject.is_empty() {
            return Err(TokenError::InvalidInput);
        }

        let iat = now.timestamp();
        let exp = i64::try_from(self.lifetime.as_secs())
            .ok()
            .and_then(|lifetime| iat.checked_add(lifetime))
            .ok_or_else(|| {
                TokenError::Signing(format!("token lifetime {:?} is out of range", self.lifetime))
            })?;
        let claims = TokenClaims {
            sub: subject.to_string(),
            iat,
            exp,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Validate `token` and return its subject
    pub fn validate(&self, token: &str) -> Result<String, TokenError> {
        self.validate_at(token, Utc::now()).map(|claims| claims.sub)
    }

    /// Validate `token` against the clock value `now`
    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, TokenError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(TokenError::InvalidInput);
        }

        let claims = decode::<TokenClaims>(token, &self.decoding, &self.validation)?.claims;

        if claims.sub.is_empty() {
            return Err(TokenError::Malformed);
        }
        if now.timestamp() > claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("key", &"[REDACTED]")
            .field("lifetime", &self.lifetime)
            .finish()
    }
}
