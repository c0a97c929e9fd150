//! Bootstrap Administrator
//!
//! Every self-registered account is a `User`, so the first `Admin` has to
//! come from configuration. Idempotent: an existing account with the same
//! user name is left untouched.

use std::sync::Arc;

use platform::password::ClearTextPassword;

use crate::application::config::AuthConfig;
use crate::application::credentials::derive_credential;
use crate::domain::entity::{Account, NewAccount};
use crate::domain::repository::IdentityStore;
use crate::domain::value_object::{Email, Role, UserName};
use crate::error::{AuthError, AuthResult};

#[derive(Clone)]
pub struct BootstrapAdmin {
    pub user_name: String,
    pub password: String,
    pub email: String,
}

impl BootstrapAdmin {
    /// Parse `user_name:password:email`
    ///
    /// The password may itself contain `:`; the user name is everything up
    /// to the first separator and the email everything after the last.
    pub fn parse(raw: &str) -> Option<Self> {
        let (user_name, rest) = raw.split_once(':')?;
        let (password, email) = rest.rsplit_once(':')?;
        if user_name.trim().is_empty() || password.is_empty() || email.trim().is_empty() {
            return None;
        }
        Some(Self {
            user_name: user_name.to_string(),
            password: password.to_string(),
            email: email.to_string(),
        })
    }
}

impl std::fmt::Debug for BootstrapAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapAdmin")
            .field("user_name", &self.user_name)
            .field("password", &"[REDACTED]")
            .field("email", &self.email)
            .finish()
    }
}

/// Create the configured admin unless the user name is already taken
///
/// Returns the new account, or `None` when nothing was created.
pub async fn ensure_bootstrap_admin<S>(
    store: Arc<S>,
    config: Arc<AuthConfig>,
    admin: BootstrapAdmin,
) -> AuthResult<Option<Account>>
where
    S: IdentityStore,
{
    let user_name =
        UserName::new(&admin.user_name).map_err(|e| AuthError::InvalidInput(e.to_string()))?;
    let email = Email::new(&admin.email).map_err(|e| AuthError::InvalidInput(e.to_string()))?;

    if store.exists_by_user_name(&user_name).await? {
        tracing::debug!(user_name = %user_name, "Bootstrap admin already present");
        return Ok(None);
    }

    let password = ClearTextPassword::new(admin.password)
        .map_err(|e| AuthError::PasswordValidation(e.to_string()))?;
    let credential = derive_credential(config.hasher, password).await?;

    let account = store
        .insert(&NewAccount::local(user_name, email, credential).with_role(Role::Admin))
        .await?;

    tracing::info!(
        account_id = %account.account_id,
        user_name = %account.user_name,
        "Bootstrap admin created"
    );
    Ok(Some(account))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::memory::InMemoryIdentityStore;
    use platform::password::CredentialHasher;

    #[test]
    fn test_parse() {
        let admin = BootstrapAdmin::parse("root:pa:ss:word:root@x.com").unwrap();
        assert_eq!(admin.user_name, "root");
        assert_eq!(admin.password, "pa:ss:word");
        assert_eq!(admin.email, "root@x.com");

        assert!(BootstrapAdmin::parse("root").is_none());
        assert!(BootstrapAdmin::parse("root:root@x.com").is_none());
        assert!(BootstrapAdmin::parse(":pw:root@x.com").is_none());
        assert!(!format!("{admin:?}").contains("pa:ss"));
    }

    #[tokio::test]
    async fn test_ensure_bootstrap_admin_is_idempotent() {
        let store = Arc::new(InMemoryIdentityStore::new());
        let config = Arc::new(AuthConfig {
            hasher: CredentialHasher::with_iterations(10_000),
            ..AuthConfig::development()
        });
        let admin = BootstrapAdmin::parse("root:Passw0rd!:root@x.com").unwrap();

        let created = ensure_bootstrap_admin(store.clone(), config.clone(), admin.clone())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(created.role, Role::Admin);

        let again = ensure_bootstrap_admin(store.clone(), config, admin).await.unwrap();
        assert!(again.is_none());
        assert_eq!(store.len().await, 1);
    }
}
