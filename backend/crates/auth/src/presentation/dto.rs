//! API DTOs (Data Transfer Objects)

use serde::{Deserialize, Serialize};

use crate::domain::entity::Account;
use crate::domain::principal::Principal;
use crate::domain::value_object::Role;

// ============================================================================
// Register
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub email: String,
}

/// Public view of an account; never carries the credential record
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub provider: Option<String>,
    pub registration_date: String,
    pub has_password: bool,
}

impl From<&Account> for AccountResponse {
    fn from(account: &Account) -> Self {
        Self {
            id: account.account_id.as_i64(),
            username: account.user_name.as_str().to_string(),
            email: account.email.as_str().to_string(),
            role: account.role,
            provider: account.provider.clone(),
            registration_date: account.registered_on.format("%Y-%m-%d").to_string(),
            has_password: account.has_local_credential(),
        }
    }
}

// ============================================================================
// Login
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub token_type: &'static str,
    /// Seconds until the token expires
    pub expires_in: u64,
    pub username: String,
    pub role: Role,
}

// ============================================================================
// Status
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthStatusResponse {
    pub authenticated: bool,
    pub username: Option<String>,
    pub role: Option<Role>,
}

impl From<&Principal> for AuthStatusResponse {
    fn from(principal: &Principal) -> Self {
        match principal.context() {
            Some(ctx) => Self {
                authenticated: true,
                username: Some(ctx.user_name.clone()),
                role: Some(ctx.role),
            },
            None => Self {
                authenticated: false,
                username: None,
                role: None,
            },
        }
    }
}

// ============================================================================
// Account settings
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[serde(default)]
    pub current_password: Option<String>,
    pub new_password: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoleRequest {
    pub role: Role,
}
