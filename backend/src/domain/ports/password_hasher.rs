//! Port abstraction for password hashing.
use crate::domain::{Password, PasswordHash};

use super::define_port_error;

define_port_error! {
    /// Errors raised by password hashing adapters.
    pub enum PasswordHashError {
        /// Hashing failed.
        Hash { message: String } => "password hashing failed: {message}",
        /// A stored hash could not be parsed.
        Malformed { message: String } => "stored password hash is malformed: {message}",
    }
}

impl From<PasswordHashError> for crate::domain::Error {
    fn from(value: PasswordHashError) -> Self {
        Self::internal(value.to_string())
    }
}

/// Hash and verify passwords. Implementations are CPU bound and synchronous.
#[cfg_attr(test, mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    /// Produce a salted hash of `password`.
    fn hash(&self, password: &Password) -> Result<PasswordHash, PasswordHashError>;

    /// Check `plaintext` against a stored hash.
    fn verify(&self, plaintext: &str, hash: &PasswordHash) -> Result<bool, PasswordHashError>;
}
