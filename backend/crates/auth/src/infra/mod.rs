//! Infrastructure Layer
//!
//! Identity store implementations.

pub mod memory;
pub mod postgres;

pub use memory::InMemoryIdentityStore;
pub use postgres::PgIdentityStore;
