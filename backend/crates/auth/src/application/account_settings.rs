//! Account Management Use Cases
//!
//! Reading the caller's own account, changing its password, and
//! (for admins) assigning roles.
//!
//! Tokens are not revoked by any of these: a token issued before a
//! password or role change keeps working until it expires, but the role
//! seen by authorization is always re-read from the store.

use std::sync::Arc;

use platform::password::ClearTextPassword;

use crate::application::config::AuthConfig;
use crate::application::credentials::{check_credential, derive_credential};
use crate::domain::entity::Account;
use crate::domain::principal::AuthenticatedContext;
use crate::domain::repository::IdentityStore;
use crate::domain::value_object::{AccountId, CredentialCheck, Role};
use crate::error::{AuthError, AuthResult};

pub struct AccountSettingsUseCase<S>
where
    S: IdentityStore,
{
    store: Arc<S>,
    config: Arc<AuthConfig>,
}

pub struct ChangePasswordInput {
    /// Required whenever the account already has a local credential
    pub current_password: Option<String>,
    pub new_password: String,
}

impl<S> AccountSettingsUseCase<S>
where
    S: IdentityStore,
{
    pub fn new(store: Arc<S>, config: Arc<AuthConfig>) -> Self {
        Self { store, config }
    }

    pub async fn current_account(&self, ctx: &AuthenticatedContext) -> AuthResult<Account> {
        self.store
            .find_by_id(ctx.account_id)
            .await?
            .ok_or(AuthError::Unauthenticated)
    }

    /// Change (or, for externally created accounts, first set) the password
    pub async fn change_password(
        &self,
        ctx: &AuthenticatedContext,
        input: ChangePasswordInput,
    ) -> AuthResult<()> {
        let account = self.current_account(ctx).await?;
        let hasher = self.config.hasher;

        if account.has_local_credential() {
            let current = input.current_password.unwrap_or_default();
            let check = check_credential(hasher, account.credential.clone(), current).await?;
            if check != CredentialCheck::Verified {
                return Err(AuthError::InvalidCredentials);
            }
        }

        let new_password = ClearTextPassword::new(input.new_password)
            .map_err(|e| AuthError::PasswordValidation(e.to_string()))?;
        let credential = derive_credential(hasher, new_password).await?;

        if !self
            .store
            .update_password(account.account_id, &credential)
            .await?
        {
            return Err(AuthError::Unauthenticated);
        }

        tracing::info!(
            account_id = %account.account_id,
            first_local_credential = !account.has_local_credential(),
            "Password changed"
        );
        Ok(())
    }

    /// Assign `role` to `target`; callers must already hold `AdminOnly`
    pub async fn assign_role(
        &self,
        actor: &AuthenticatedContext,
        target: AccountId,
        role: Role,
    ) -> AuthResult<Account> {
        if !self.store.update_role(target, role).await? {
            return Err(AuthError::AccountNotFound);
        }

        let account = self
            .store
            .find_by_id(target)
            .await?
            .ok_or(AuthError::AccountNotFound)?;

        tracing::info!(
            actor = %actor.user_name,
            account_id = %target,
            role = %role,
            "Role assigned"
        );
        Ok(account)
    }
}
