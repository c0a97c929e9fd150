//! Domain Layer
//!
//! Contains entities, value objects, the authorization policy and the
//! repository trait.

pub mod entity;
pub mod policy;
pub mod principal;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::{Account, NewAccount};
pub use policy::{Capability, authorize, permits};
pub use principal::{AuthenticatedContext, Principal};
pub use repository::IdentityStore;
