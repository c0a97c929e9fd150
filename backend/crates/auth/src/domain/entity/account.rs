//! Account Entity
//!
//! A registered identity: unique user name, unique email, optional local
//! credential and exactly one role.

use chrono::{NaiveDate, Utc};
use platform::password::CredentialHasher;

use crate::domain::value_object::{
    AccountId, CredentialCheck, CredentialRecord, Email, Role, UserName,
};

/// Provider tag for accounts registered with a local password
pub const LOCAL_PROVIDER: &str = "local";

#[derive(Debug, Clone)]
pub struct Account {
    pub account_id: AccountId,
    pub user_name: UserName,
    pub email: Email,
    pub credential: Option<CredentialRecord>,
    pub role: Role,
    /// Origin of the account (`"local"` or the external provider tag)
    pub provider: Option<String>,
    pub registered_on: NaiveDate,
}

impl Account {
    pub fn has_local_credential(&self) -> bool {
        self.credential.is_some()
    }

    pub fn check_password(&self, hasher: &CredentialHasher, password: &str) -> CredentialCheck {
        match &self.credential {
            Some(record) => record.verify(hasher, password),
            None => CredentialCheck::NoLocalCredential,
        }
    }
}

/// Account awaiting insertion; the store assigns the id
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub user_name: UserName,
    pub email: Email,
    pub credential: Option<CredentialRecord>,
    pub role: Role,
    pub provider: Option<String>,
    pub registered_on: NaiveDate,
}

impl NewAccount {
    /// Self-registration: role is always `User`
    pub fn local(user_name: UserName, email: Email, credential: CredentialRecord) -> Self {
        Self {
            user_name,
            email,
            credential: Some(credential),
            role: Role::User,
            provider: Some(LOCAL_PROVIDER.to_string()),
            registered_on: Utc::now().date_naive(),
        }
    }

    /// First sign-in through an external provider; no local credential
    pub fn external(user_name: UserName, email: Email, provider: impl Into<String>) -> Self {
        Self {
            user_name,
            email,
            credential: None,
            role: Role::User,
            provider: Some(provider.into()),
            registered_on: Utc::now().date_naive(),
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    pub fn into_account(self, account_id: AccountId) -> Account {
        Account {
            account_id,
            user_name: self.user_name,
            email: self.email,
            credential: self.credential,
            role: self.role,
            provider: self.provider,
            registered_on: self.registered_on,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> CredentialHasher {
        CredentialHasher::with_iterations(10_000)
    }

    fn local_account(password: &str) -> Account {
        let hasher = hasher();
        let salt = hasher.generate_salt();
        let hash = hasher.hash(password, &salt).unwrap();
        NewAccount::local(
            UserName::new("alice").unwrap(),
            Email::new("alice@x.com").unwrap(),
            CredentialRecord::new(&salt, &hash),
        )
        .into_account(AccountId::from_i64(1))
    }

    #[test]
    fn test_new_accounts_are_users() {
        let account = local_account("Passw0rd!");
        assert_eq!(account.role, Role::User);
        assert_eq!(account.provider.as_deref(), Some(LOCAL_PROVIDER));
        assert!(account.has_local_credential());
    }

    #[test]
    fn test_check_password() {
        let account = local_account("Passw0rd!");
        assert!(account.check_password(&hasher(), "Passw0rd!").is_verified());
        assert_eq!(
            account.check_password(&hasher(), "nope"),
            CredentialCheck::Mismatch
        );
    }

    #[test]
    fn test_external_account_has_no_credential() {
        let account = NewAccount::external(
            UserName::new("Bob").unwrap(),
            Email::new("bob@x.com").unwrap(),
            "github",
        )
        .into_account(AccountId::from_i64(2));

        assert!(!account.has_local_credential());
        assert_eq!(
            account.check_password(&hasher(), "anything"),
            CredentialCheck::NoLocalCredential
        );
    }
}
