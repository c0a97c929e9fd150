//! Error conversions - store error classification and HTTP rendering
//!
//! Classifies infrastructure errors into an [`ErrorKind`] and renders
//! [`AppError`] as the RFC 7807 response body used by every crate.

#[cfg(feature = "axum")]
use super::app_error::AppError;
#[cfg(feature = "sqlx")]
use super::kind::ErrorKind;

// ============================================================================
// SQLx conversions (feature-gated)
// ============================================================================

/// Classify a store error by how the client should see it
///
/// Connectivity problems are 503, unique violations 409, everything else 500.
#[cfg(feature = "sqlx")]
pub fn sqlx_error_kind(err: &sqlx::Error) -> ErrorKind {
    match err {
        sqlx::Error::RowNotFound => ErrorKind::NotFound,
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            ErrorKind::ServiceUnavailable
        }
        sqlx::Error::Database(db_err) => {
            // https://www.postgresql.org/docs/current/errcodes-appendix.html
            match db_err.code().as_deref() {
                Some("23505") => ErrorKind::Conflict,
                Some("23502") | Some("23514") => ErrorKind::BadRequest,
                Some("53000" | "53100" | "53200" | "53300") => ErrorKind::ServiceUnavailable,
                Some("57000" | "57014" | "57P01" | "57P02" | "57P03") => {
                    ErrorKind::ServiceUnavailable
                }
                _ => ErrorKind::InternalServerError,
            }
        }
        _ => ErrorKind::InternalServerError,
    }
}

// ============================================================================
// Axum conversions (feature-gated)
// ============================================================================

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;
        use axum::http::{HeaderValue, StatusCode, header};

        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        // RFC 7807 Problem Details for HTTP APIs
        let body = serde_json::json!({
            "type": format!("https://httpstatuses.io/{}", self.status_code()),
            "title": self.kind().as_str(),
            "status": self.status_code(),
            "code": self.kind().code(),
            "detail": self.message(),
            "action": self.action(),
        });

        let mut response = (status, Json(body)).into_response();
        if status == StatusCode::UNAUTHORIZED {
            // RFC 6750 §3
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    #[allow(unused_imports)]
    use super::*;

    #[cfg(feature = "sqlx")]
    #[test]
    fn test_store_errors_are_classified() {
        assert_eq!(
            sqlx_error_kind(&sqlx::Error::PoolTimedOut),
            ErrorKind::ServiceUnavailable
        );
        assert_eq!(sqlx_error_kind(&sqlx::Error::PoolClosed), ErrorKind::ServiceUnavailable);
        assert_eq!(sqlx_error_kind(&sqlx::Error::RowNotFound), ErrorKind::NotFound);
        assert_eq!(
            sqlx_error_kind(&sqlx::Error::Protocol("unexpected message".into())),
            ErrorKind::InternalServerError
        );
    }

    #[cfg(feature = "axum")]
    #[test]
    fn test_unauthorized_response_carries_challenge() {
        use axum::http::header;
        use axum::response::IntoResponse;

        let response = AppError::unauthorized("Authentication required").into_response();
        assert_eq!(response.status().as_u16(), 401);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );

        let response = AppError::forbidden("Admin role required").into_response();
        assert_eq!(response.status().as_u16(), 403);
        assert!(response.headers().get(header::WWW_AUTHENTICATE).is_none());
    }
}
