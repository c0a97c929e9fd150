//! Sign Up Use Case
//!
//! Self-registration with user name, password and email. New accounts are
//! always `User`.

use std::sync::Arc;

use platform::password::ClearTextPassword;

use crate::application::config::AuthConfig;
use crate::application::credentials::derive_credential;
use crate::domain::entity::{Account, NewAccount};
use crate::domain::repository::IdentityStore;
use crate::domain::value_object::{Email, UserName};
use crate::error::{AuthError, AuthResult};

pub struct SignUpInput {
    pub user_name: String,
    pub password: String,
    pub email: String,
}

pub struct SignUpUseCase<S>
where
    S: IdentityStore,
{
    store: Arc<S>,
    config: Arc<AuthConfig>,
}

impl<S> SignUpUseCase<S>
where
    S: IdentityStore,
{
    pub fn new(store: Arc<S>, config: Arc<AuthConfig>) -> Self {
        Self { store, config }
    }

    pub async fn execute(&self, input: SignUpInput) -> AuthResult<Account> {
        let user_name =
            UserName::new(&input.user_name).map_err(|e| AuthError::InvalidInput(e.to_string()))?;
        let email = Email::new(&input.email).map_err(|e| AuthError::InvalidInput(e.to_string()))?;
        let password = ClearTextPassword::new(input.password)
            .map_err(|e| AuthError::PasswordValidation(e.to_string()))?;

        if self.store.exists_by_user_name(&user_name).await? {
            return Err(AuthError::UserNameTaken);
        }
        if self.store.exists_by_email(&email).await? {
            return Err(AuthError::EmailTaken);
        }

        let credential = derive_credential(self.config.hasher, password).await?;

        // A concurrent registration can still win here; insert reports it.
        let account = self
            .store
            .insert(&NewAccount::local(user_name, email, credential))
            .await?;

        tracing::info!(
            account_id = %account.account_id,
            user_name = %account.user_name,
            "Account registered"
        );

        Ok(account)
    }
}
