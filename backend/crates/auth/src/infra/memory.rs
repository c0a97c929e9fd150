//! In-Memory Identity Store
//!
//! Same uniqueness rules as the Postgres store. Used by tests.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::RwLock;

use crate::domain::entity::{Account, NewAccount};
use crate::domain::repository::IdentityStore;
use crate::domain::value_object::{AccountId, CredentialRecord, Email, Role, UserName};
use crate::error::{AuthError, AuthResult};

#[derive(Default)]
struct State {
    next_id: i64,
    accounts: BTreeMap<i64, Account>,
}

#[derive(Clone, Default)]
pub struct InMemoryIdentityStore {
    state: Arc<RwLock<State>>,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail as if the database were unreachable
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.accounts.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn check_available(&self) -> AuthResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(AuthError::Database(sqlx::Error::PoolTimedOut))
        } else {
            Ok(())
        }
    }

    async fn find(&self, predicate: impl Fn(&Account) -> bool) -> AuthResult<Option<Account>> {
        self.check_available()?;
        let state = self.state.read().await;
        Ok(state.accounts.values().find(|a| predicate(a)).cloned())
    }
}

impl IdentityStore for InMemoryIdentityStore {
    async fn find_by_id(&self, account_id: AccountId) -> AuthResult<Option<Account>> {
        self.check_available()?;
        let state = self.state.read().await;
        Ok(state.accounts.get(&account_id.as_i64()).cloned())
    }

    async fn find_by_user_name(&self, user_name: &UserName) -> AuthResult<Option<Account>> {
        self.find(|a| a.user_name == *user_name).await
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<Account>> {
        self.find(|a| a.email == *email).await
    }

    async fn exists_by_user_name(&self, user_name: &UserName) -> AuthResult<bool> {
        Ok(self.find_by_user_name(user_name).await?.is_some())
    }

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        Ok(self.find_by_email(email).await?.is_some())
    }

    async fn insert(&self, account: &NewAccount) -> AuthResult<Account> {
        self.check_available()?;
        let mut state = self.state.write().await;

        if state.accounts.values().any(|a| a.user_name == account.user_name) {
            return Err(AuthError::UserNameTaken);
        }
        if state.accounts.values().any(|a| a.email == account.email) {
            return Err(AuthError::EmailTaken);
        }

        state.next_id += 1;
        let id = state.next_id;
        let created = account.clone().into_account(AccountId::from_i64(id));
        state.accounts.insert(id, created.clone());

        Ok(created)
    }

    async fn update_password(
        &self,
        account_id: AccountId,
        credential: &CredentialRecord,
    ) -> AuthResult<bool> {
        self.check_available()?;
        let mut state = self.state.write().await;
        Ok(match state.accounts.get_mut(&account_id.as_i64()) {
            Some(account) => {
                account.credential = Some(credential.clone());
                true
            }
            None => false,
        })
    }

    async fn update_role(&self, account_id: AccountId, role: Role) -> AuthResult<bool> {
        self.check_available()?;
        let mut state = self.state.write().await;
        Ok(match state.accounts.get_mut(&account_id.as_i64()) {
            Some(account) => {
                account.role = role;
                true
            }
            None => false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_account(name: &str, email: &str) -> NewAccount {
        NewAccount::external(
            UserName::new(name).unwrap(),
            Email::new(email).unwrap(),
            "test",
        )
    }

    #[tokio::test]
    async fn test_insert_assigns_sequential_ids() {
        let store = InMemoryIdentityStore::new();
        let a = store.insert(&new_account("a", "a@x.com")).await.unwrap();
        let b = store.insert(&new_account("b", "b@x.com")).await.unwrap();
        assert_eq!(a.account_id.as_i64(), 1);
        assert_eq!(b.account_id.as_i64(), 2);
    }

    #[tokio::test]
    async fn test_uniqueness() {
        let store = InMemoryIdentityStore::new();
        store.insert(&new_account("a", "a@x.com")).await.unwrap();

        assert!(matches!(
            store.insert(&new_account("a", "other@x.com")).await,
            Err(AuthError::UserNameTaken)
        ));
        assert!(matches!(
            store.insert(&new_account("other", "a@x.com")).await,
            Err(AuthError::EmailTaken)
        ));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_updates_report_missing_accounts() {
        let store = InMemoryIdentityStore::new();
        let missing = AccountId::from_i64(7);
        assert!(!store.update_role(missing, Role::Admin).await.unwrap());
        assert!(
            !store
                .update_password(missing, &CredentialRecord::new("s", "h"))
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_unavailable() {
        let store = InMemoryIdentityStore::new();
        store.set_unavailable(true);
        assert!(matches!(
            store.find_by_id(AccountId::from_i64(1)).await,
            Err(AuthError::Database(_))
        ));
        store.set_unavailable(false);
        assert!(store.is_empty().await);
    }
}
