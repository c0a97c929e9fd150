//! External Identity Reconciliation
//!
//! Maps an identity asserted by an external provider onto a local account,
//! keyed by email. The first sign-in creates a `User` account without a
//! local credential; later sign-ins return the same account.

use std::sync::Arc;

use platform::token::TokenService;

use crate::domain::entity::{Account, NewAccount};
use crate::domain::repository::IdentityStore;
use crate::domain::value_object::{Email, UserName};
use crate::error::{AuthError, AuthResult};

/// Identity as asserted by the provider
#[derive(Debug, Clone)]
pub struct ExternalIdentity {
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub provider: String,
}

pub struct IdentityReconciler<S>
where
    S: IdentityStore,
{
    store: Arc<S>,
}

impl<S> IdentityReconciler<S>
where
    S: IdentityStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn reconcile(&self, identity: &ExternalIdentity) -> AuthResult<Account> {
        let raw_email = identity
            .email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .ok_or(AuthError::MissingEmail)?;
        let email = Email::new(raw_email).map_err(|e| AuthError::InvalidInput(e.to_string()))?;

        if let Some(account) = self.store.find_by_email(&email).await? {
            tracing::debug!(
                account_id = %account.account_id,
                provider = %identity.provider,
                "External identity matched existing account"
            );
            return Ok(account);
        }

        let user_name = Self::user_name_for(identity.display_name.as_deref(), &email)?;

        // Existing local user with the same name: surfaced as a conflict
        // rather than silently renaming.
        if self.store.exists_by_user_name(&user_name).await? {
            tracing::warn!(
                user_name = %user_name,
                provider = %identity.provider,
                "External display name collides with an existing account"
            );
            return Err(AuthError::UserNameTaken);
        }

        let new_account = NewAccount::external(user_name, email.clone(), identity.provider.clone());
        match self.store.insert(&new_account).await {
            Ok(account) => {
                tracing::info!(
                    account_id = %account.account_id,
                    user_name = %account.user_name,
                    provider = %identity.provider,
                    "Account created from external identity"
                );
                Ok(account)
            }
            // Lost a race with a concurrent first sign-in for the same email.
            Err(AuthError::EmailTaken) => self
                .store
                .find_by_email(&email)
                .await?
                .ok_or(AuthError::EmailTaken),
            Err(e) => Err(e),
        }
    }

    /// Display name if usable, else the email's local part
    fn user_name_for(display_name: Option<&str>, email: &Email) -> AuthResult<UserName> {
        let user_name = match display_name.and_then(|name| UserName::new(name).ok()) {
            Some(name) => Ok(name),
            None => UserName::new(email.local_part()),
        };
        user_name.map_err(|e| AuthError::InvalidInput(e.to_string()))
    }
}

pub struct ExternalSignInOutput {
    pub token: String,
    pub account: Account,
}

impl std::fmt::Debug for ExternalSignInOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExternalSignInOutput")
            .field("token", &"[REDACTED]")
            .field("account", &self.account)
            .finish()
    }
}

/// Reconcile, then issue a token for the resulting account
pub struct ExternalSignInUseCase<S>
where
    S: IdentityStore,
{
    reconciler: IdentityReconciler<S>,
    tokens: Arc<TokenService>,
}

impl<S> ExternalSignInUseCase<S>
where
    S: IdentityStore,
{
    pub fn new(store: Arc<S>, tokens: Arc<TokenService>) -> Self {
        Self {
            reconciler: IdentityReconciler::new(store),
            tokens,
        }
    }

    pub async fn execute(&self, identity: &ExternalIdentity) -> AuthResult<ExternalSignInOutput> {
        let account = self.reconciler.reconcile(identity).await?;
        let token = self
            .tokens
            .issue(account.user_name.as_str())
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        Ok(ExternalSignInOutput { token, account })
    }
}
