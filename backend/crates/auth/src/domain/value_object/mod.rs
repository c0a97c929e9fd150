//! Value Object Module

pub mod credential_record;
pub mod email;
pub mod role;
pub mod user_name;

pub use credential_record::{CredentialCheck, CredentialRecord};
pub use email::{Email, EmailError};
pub use kernel::id::AccountId;
pub use role::Role;
pub use user_name::{UserName, UserNameError};
