//! Sign In Use Case
//!
//! Verifies a user name / password pair and issues a token.
//!
//! Every failure (unknown name, wrong password, account without a usable
//! local credential) is the same `InvalidCredentials`.

use std::fmt;
use std::sync::Arc;

use platform::token::TokenService;

use crate::application::config::AuthConfig;
use crate::application::credentials::{check_credential, equalize_timing};
use crate::domain::entity::Account;
use crate::domain::repository::IdentityStore;
use crate::domain::value_object::{CredentialCheck, UserName};
use crate::error::{AuthError, AuthResult};

pub struct SignInInput {
    pub user_name: String,
    pub password: String,
}

pub struct SignInOutput {
    pub token: String,
    pub account: Account,
}

impl fmt::Debug for SignInOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignInOutput")
            .field("token", &"[REDACTED]")
            .field("account", &self.account)
            .finish()
    }
}

pub struct SignInUseCase<S>
where
    S: IdentityStore,
{
    store: Arc<S>,
    tokens: Arc<TokenService>,
    config: Arc<AuthConfig>,
}

impl<S> SignInUseCase<S>
where
    S: IdentityStore,
{
    pub fn new(store: Arc<S>, tokens: Arc<TokenService>, config: Arc<AuthConfig>) -> Self {
        Self {
            store,
            tokens,
            config,
        }
    }

    pub async fn execute(&self, input: SignInInput) -> AuthResult<SignInOutput> {
        let hasher = self.config.hasher;

        // No policy check on login: any string is a candidate password.
        let account = match UserName::new(&input.user_name) {
            Ok(user_name) => self.store.find_by_user_name(&user_name).await?,
            Err(_) => None,
        };

        let Some(account) = account else {
            equalize_timing(hasher, input.password).await;
            return Err(AuthError::InvalidCredentials);
        };

        match check_credential(hasher, account.credential.clone(), input.password).await? {
            CredentialCheck::Verified => {}
            CredentialCheck::Mismatch => return Err(AuthError::InvalidCredentials),
            CredentialCheck::NoLocalCredential => {
                tracing::debug!(
                    account_id = %account.account_id,
                    "Password login for account without local credential"
                );
                return Err(AuthError::InvalidCredentials);
            }
            CredentialCheck::Malformed => {
                tracing::error!(
                    account_id = %account.account_id,
                    "Stored credential record is malformed"
                );
                return Err(AuthError::InvalidCredentials);
            }
        }

        let token = self
            .tokens
            .issue(account.user_name.as_str())
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        tracing::info!(
            account_id = %account.account_id,
            user_name = %account.user_name,
            "User signed in"
        );

        Ok(SignInOutput { token, account })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::sign_up::{SignUpInput, SignUpUseCase};
    use crate::domain::entity::NewAccount;
    use crate::domain::value_object::{CredentialRecord, Email};
    use crate::infra::memory::InMemoryIdentityStore;
    use platform::password::CredentialHasher;
    use platform::token::DEFAULT_TOKEN_LIFETIME;

    struct Fixture {
        store: Arc<InMemoryIdentityStore>,
        tokens: Arc<TokenService>,
        config: Arc<AuthConfig>,
    }

    impl Fixture {
        async fn new() -> Self {
            let store = Arc::new(InMemoryIdentityStore::new());
            let tokens = Arc::new(TokenService::new(
                b"sign-in-test-secret-sign-in-test-secret",
                DEFAULT_TOKEN_LIFETIME,
            ));
            let config = Arc::new(AuthConfig {
                hasher: CredentialHasher::with_iterations(10_000),
                ..AuthConfig::development()
            });

            SignUpUseCase::new(store.clone(), config.clone())
                .execute(SignUpInput {
                    user_name: "alice".to_string(),
                    password: "Passw0rd!".to_string(),
                    email: "alice@x.com".to_string(),
                })
                .await
                .unwrap();

            Self {
                store,
                tokens,
                config,
            }
        }

        fn use_case(&self) -> SignInUseCase<InMemoryIdentityStore> {
            SignInUseCase::new(self.store.clone(), self.tokens.clone(), self.config.clone())
        }
    }

    fn input(user_name: &str, password: &str) -> SignInInput {
        SignInInput {
            user_name: user_name.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_sign_in_issues_token_for_user_name() {
        let fixture = Fixture::new().await;
        let output = fixture
            .use_case()
            .execute(input("alice", "Passw0rd!"))
            .await
            .unwrap();

        assert_eq!(fixture.tokens.validate(&output.token).unwrap(), "alice");
        assert_eq!(output.account.user_name.as_str(), "alice");

        let debug = format!("{output:?}");
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains(&output.token));
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_user_look_the_same() {
        let fixture = Fixture::new().await;
        let use_case = fixture.use_case();

        let wrong = use_case.execute(input("alice", "Passw0rd?")).await.unwrap_err();
        let unknown = use_case.execute(input("nobody", "Passw0rd!")).await.unwrap_err();
        let blank = use_case.execute(input("", "Passw0rd!")).await.unwrap_err();

        assert!(matches!(wrong, AuthError::InvalidCredentials));
        assert!(matches!(unknown, AuthError::InvalidCredentials));
        assert!(matches!(blank, AuthError::InvalidCredentials));
        assert_eq!(wrong.to_app_error().message(), unknown.to_app_error().message());
    }

    #[tokio::test]
    async fn test_account_without_usable_credential_cannot_sign_in() {
        let fixture = Fixture::new().await;

        fixture
            .store
            .insert(&NewAccount::external(
                UserName::new("bob").unwrap(),
                Email::new("bob@x.com").unwrap(),
                "github",
            ))
            .await
            .unwrap();

        let mut corrupt = NewAccount::external(
            UserName::new("carol").unwrap(),
            Email::new("carol@x.com").unwrap(),
            "local",
        );
        corrupt.credential = CredentialRecord::from_db(Some("not-a-record".to_string()));
        fixture.store.insert(&corrupt).await.unwrap();

        let use_case = fixture.use_case();
        for name in ["bob", "carol"] {
            let err = use_case.execute(input(name, "")).await.unwrap_err();
            assert!(matches!(err, AuthError::InvalidCredentials), "{name}");
        }
    }

    #[tokio::test]
    async fn test_store_failure_is_not_an_auth_failure() {
        let fixture = Fixture::new().await;
        fixture.store.set_unavailable(true);

        let err = fixture
            .use_case()
            .execute(input("alice", "Passw0rd!"))
            .await
            .unwrap_err();
        assert!(err.kind().is_server_error());
    }
}
