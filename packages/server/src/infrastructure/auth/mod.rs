//! Credential verification backends.

pub mod jwt;

pub use jwt::{Claims, JwtCredentialVerifier};
