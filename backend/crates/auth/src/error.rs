//! Auth Error Types
//!
//! Auth-specific error variants that integrate with the unified
//! `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, conversions::sqlx_error_kind, kind::ErrorKind};
use platform::token::TokenError;
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown user, wrong password, or no usable local credential.
    /// Deliberately indistinguishable to the caller.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// No principal on a protected capability
    #[error("Authentication required")]
    Unauthenticated,

    /// Presented token failed validation
    #[error("Token rejected: {0}")]
    Token(#[from] TokenError),

    /// Known principal lacking the required role
    #[error("Insufficient role")]
    Forbidden,

    #[error("User name already exists")]
    UserNameTaken,

    #[error("Email already registered")]
    EmailTaken,

    /// External identity arrived without an email
    #[error("External identity did not provide an email address")]
    MissingEmail,

    #[error("Account not found")]
    AccountNotFound,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Password validation failed: {0}")]
    PasswordValidation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::InvalidCredentials | AuthError::Unauthenticated | AuthError::Token(_) => {
                ErrorKind::Unauthorized
            }
            AuthError::Forbidden => ErrorKind::Forbidden,
            AuthError::UserNameTaken | AuthError::EmailTaken => ErrorKind::Conflict,
            AuthError::MissingEmail => ErrorKind::UnprocessableEntity,
            AuthError::AccountNotFound => ErrorKind::NotFound,
            AuthError::InvalidInput(_) | AuthError::PasswordValidation(_) => ErrorKind::BadRequest,
            AuthError::Database(e) => match sqlx_error_kind(e) {
                ErrorKind::ServiceUnavailable => ErrorKind::ServiceUnavailable,
                _ => ErrorKind::InternalServerError,
            },
            AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    pub fn is_unauthenticated(&self) -> bool {
        self.kind() == ErrorKind::Unauthorized
    }

    /// Convert to AppError
    ///
    /// Token failures collapse into one message; store and internal details
    /// never reach the client.
    pub fn to_app_error(&self) -> AppError {
        match self {
            AuthError::Token(_) => {
                AppError::unauthorized("Invalid or expired token").with_action("Sign in again")
            }
            AuthError::Unauthenticated => {
                AppError::unauthorized("Authentication required").with_action("Sign in")
            }
            AuthError::Database(_) | AuthError::Internal(_) => {
                AppError::new(self.kind(), "Authentication service error")
            }
            _ => AppError::new(self.kind(), self.to_string()),
        }
    }

    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::Token(e) => {
                tracing::info!(reason = %e, "Rejected request token");
            }
            AuthError::Forbidden => {
                tracing::warn!("Forbidden request");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}
