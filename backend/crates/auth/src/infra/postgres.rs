//! PostgreSQL Identity Store

use chrono::NaiveDate;
use sqlx::PgPool;

use crate::domain::entity::{Account, NewAccount};
use crate::domain::repository::IdentityStore;
use crate::domain::value_object::{AccountId, CredentialRecord, Email, Role, UserName};
use crate::error::{AuthError, AuthResult};

/// Unique constraint names from `0001_accounts.sql`
const USER_NAME_CONSTRAINT: &str = "accounts_user_name_key";
const EMAIL_CONSTRAINT: &str = "accounts_email_key";

const ACCOUNT_COLUMNS: &str = r#"
    account_id,
    user_name,
    email,
    credential_record,
    role,
    provider,
    registered_on
"#;

#[derive(Clone)]
pub struct PgIdentityStore {
    pool: PgPool,
}

impl PgIdentityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_one(&self, column: &str, value: &str) -> AuthResult<Option<Account>> {
        // `column` is always one of our own literals, never input.
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE {column} = $1");
        let row = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;

        row.map(AccountRow::into_account).transpose()
    }
}

impl IdentityStore for PgIdentityStore {
    async fn find_by_id(&self, account_id: AccountId) -> AuthResult<Option<Account>> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE account_id = $1");
        let row = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(account_id.as_i64())
            .fetch_optional(&self.pool)
            .await?;

        row.map(AccountRow::into_account).transpose()
    }

    async fn find_by_user_name(&self, user_name: &UserName) -> AuthResult<Option<Account>> {
        self.find_one("user_name", user_name.as_str()).await
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<Account>> {
        self.find_one("email", email.as_str()).await
    }

    async fn exists_by_user_name(&self, user_name: &UserName) -> AuthResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM accounts WHERE user_name = $1)")
                .bind(user_name.as_str())
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM accounts WHERE email = $1)")
                .bind(email.as_str())
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn insert(&self, account: &NewAccount) -> AuthResult<Account> {
        let account_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO accounts (
                user_name,
                email,
                credential_record,
                role,
                provider,
                registered_on
            ) VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING account_id
            "#,
        )
        .bind(account.user_name.as_str())
        .bind(account.email.as_str())
        .bind(account.credential.as_ref().map(CredentialRecord::as_str))
        .bind(account.role.code())
        .bind(account.provider.as_deref())
        .bind(account.registered_on)
        .fetch_one(&self.pool)
        .await
        .map_err(map_unique_violation)?;

        Ok(account.clone().into_account(AccountId::from_i64(account_id)))
    }

    async fn update_password(
        &self,
        account_id: AccountId,
        credential: &CredentialRecord,
    ) -> AuthResult<bool> {
        let updated = sqlx::query("UPDATE accounts SET credential_record = $1 WHERE account_id = $2")
            .bind(credential.as_str())
            .bind(account_id.as_i64())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(updated > 0)
    }

    async fn update_role(&self, account_id: AccountId, role: Role) -> AuthResult<bool> {
        let updated = sqlx::query("UPDATE accounts SET role = $1 WHERE account_id = $2")
            .bind(role.code())
            .bind(account_id.as_i64())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(updated > 0)
    }
}

/// Turn a unique violation into the matching domain conflict
fn map_unique_violation(err: sqlx::Error) -> AuthError {
    let constraint = match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            db_err.constraint().map(str::to_string)
        }
        _ => None,
    };

    conflict_for_constraint(constraint.as_deref()).unwrap_or(AuthError::Database(err))
}

fn conflict_for_constraint(constraint: Option<&str>) -> Option<AuthError> {
    match constraint {
        Some(USER_NAME_CONSTRAINT) => Some(AuthError::UserNameTaken),
        Some(EMAIL_CONSTRAINT) => Some(AuthError::EmailTaken),
        _ => None,
    }
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct AccountRow {
    account_id: i64,
    user_name: String,
    email: String,
    credential_record: Option<String>,
    role: String,
    provider: Option<String>,
    registered_on: NaiveDate,
}

impl AccountRow {
    fn into_account(self) -> AuthResult<Account> {
        let role = Role::from_code(&self.role).ok_or_else(|| {
            AuthError::Internal(format!(
                "Invalid role {:?} on account {}",
                self.role, self.account_id
            ))
        })?;

        Ok(Account {
            account_id: AccountId::from_i64(self.account_id),
            user_name: UserName::from_db(self.user_name),
            email: Email::from_db(self.email),
            credential: CredentialRecord::from_db(self.credential_record),
            role,
            provider: self.provider,
            registered_on: self.registered_on,
        })
    }
}
