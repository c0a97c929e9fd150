//! Repository Traits
//!
//! Persistence interface for accounts. Implementations live in `infra`.

use crate::domain::entity::{Account, NewAccount};
use crate::domain::value_object::{AccountId, CredentialRecord, Email, Role, UserName};
use crate::error::AuthResult;

/// Account store
///
/// User name and email are each unique across all accounts. `insert`
/// reports a violation as `UserNameTaken` / `EmailTaken`, which also covers
/// a concurrent writer winning the race after an `exists_*` check.
#[trait_variant::make(IdentityStore: Send)]
pub trait LocalIdentityStore {
    async fn find_by_id(&self, account_id: AccountId) -> AuthResult<Option<Account>>;

    async fn find_by_user_name(&self, user_name: &UserName) -> AuthResult<Option<Account>>;

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<Account>>;

    async fn exists_by_user_name(&self, user_name: &UserName) -> AuthResult<bool>;

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool>;

    async fn insert(&self, account: &NewAccount) -> AuthResult<Account>;

    /// Returns `false` when no such account exists
    async fn update_password(
        &self,
        account_id: AccountId,
        credential: &CredentialRecord,
    ) -> AuthResult<bool>;

    /// Returns `false` when no such account exists
    async fn update_role(&self, account_id: AccountId, role: Role) -> AuthResult<bool>;
}
