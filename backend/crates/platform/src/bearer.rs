//! Bearer credentials (RFC 6750)
//!
//! Reading `Authorization: Bearer <token>` from request headers.

use axum::http::{HeaderMap, header};

const BEARER_SCHEME: &str = "Bearer";

/// Extract the token from an `Authorization: Bearer` header
///
/// The scheme is matched case-insensitively. Other schemes and empty
/// tokens yield `None`.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?.trim();
    let (scheme, token) = value.split_once(' ')?;

    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return None;
    }

    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}
