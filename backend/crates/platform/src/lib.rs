//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (CSPRNG bytes, Base64, constant-time compare)
//! - Password hashing (salted PBKDF2-HMAC-SHA256)
//! - Signed stateless tokens (HS256 JWT)
//! - Cookie and bearer-header handling

pub mod bearer;
pub mod cookie;
pub mod crypto;
pub mod password;
pub mod token;
