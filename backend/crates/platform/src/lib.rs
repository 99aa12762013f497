//! Platform Crate - Technical Infrastructure
//!
//! Shared technical foundations for the portal gate:
//! - Signed session tokens (HMAC-SHA256, Base64)
//! - Password hashing (Argon2id)
//! - Cookie management

pub mod cookie;
pub mod crypto;
pub mod password;
