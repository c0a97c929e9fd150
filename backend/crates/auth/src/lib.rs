//! Auth (Authentication / Authorization) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Accounts, roles, capability policy, store trait
//! - `application/` - Use cases and the request authenticator
//! - `infra/` - Postgres and in-memory identity stores
//! - `presentation/` - HTTP handlers, DTOs, middleware, router
//!
//! ## Features
//! - Registration and login with user name + password
//! - Stateless HS256 tokens via `jwtToken` cookie or `Authorization: Bearer`
//! - External sign-in through a trusted OAuth2 proxy, reconciled by email
//! - Two roles (`Admin`, `User`) mapped onto route capabilities
//!
//! ## Security Model
//! - Passwords stored as `salt:hash` (PBKDF2-HMAC-SHA256, per-account salt)
//! - Unknown user and wrong password are indistinguishable, including timing
//! - Invalid tokens are rejected (401); anonymous callers on protected
//!   routes get 401, authenticated callers lacking a role get 403
//! - No revocation: tokens live until expiry

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::AuthConfig;
pub use error::{AuthError, AuthResult};
pub use infra::{InMemoryIdentityStore, PgIdentityStore};
pub use presentation::router::{auth_router, auth_router_generic};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};
