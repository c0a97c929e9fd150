//! Request Principal
//!
//! Who a request acts as. Built fresh for every request and discarded
//! with it.

use serde::Serialize;

use crate::domain::entity::Account;
use crate::domain::value_object::{AccountId, Role};

/// Authenticated identity plus role, as seen by downstream handlers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatedContext {
    pub account_id: AccountId,
    pub user_name: String,
    pub email: String,
    pub role: Role,
}

impl From<&Account> for AuthenticatedContext {
    fn from(account: &Account) -> Self {
        Self {
            account_id: account.account_id,
            user_name: account.user_name.as_str().to_string(),
            email: account.email.as_str().to_string(),
            role: account.role,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Principal {
    #[default]
    Anonymous,
    Authenticated(AuthenticatedContext),
}

impl Principal {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Principal::Authenticated(_))
    }

    pub fn context(&self) -> Option<&AuthenticatedContext> {
        match self {
            Principal::Authenticated(ctx) => Some(ctx),
            Principal::Anonymous => None,
        }
    }
}
