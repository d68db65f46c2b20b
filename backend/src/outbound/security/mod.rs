//! Argon2id password hashing.

use argon2::Argon2;
use argon2::password_hash::{
    self, PasswordHash as PhcString, PasswordHasher as _, PasswordVerifier as _, SaltString,
};
use uuid::Uuid;

use crate::domain::ports::{PasswordHashError, PasswordHasher};
use crate::domain::{Password, PasswordHash};

/// [`PasswordHasher`] producing PHC-formatted Argon2id hashes.
#[derive(Debug, Default, Clone, Copy)]
pub struct Argon2PasswordHasher;

impl Argon2PasswordHasher {
    /// Hasher with the library's default Argon2id parameters.
    pub fn new() -> Self {
        Self
    }
}

/// 16 random bytes from a v4 UUID.
fn fresh_salt() -> Result<SaltString, PasswordHashError> {
    SaltString::encode_b64(Uuid::new_v4().as_bytes())
        .map_err(|err| PasswordHashError::hash(err.to_string()))
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, password: &Password) -> Result<PasswordHash, PasswordHashError> {
        let salt = fresh_salt()?;
        let encoded = Argon2::default()
            .hash_password(password.expose().as_bytes(), &salt)
            .map_err(|err| PasswordHashError::hash(err.to_string()))?;
        Ok(PasswordHash::new(encoded.to_string()))
    }

    fn verify(&self, plaintext: &str, hash: &PasswordHash) -> Result<bool, PasswordHashError> {
        let parsed = PhcString::new(hash.as_str())
            .map_err(|err| PasswordHashError::malformed(err.to_string()))?;
        match Argon2::default().verify_password(plaintext.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(err) => Err(PasswordHashError::hash(err.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn password() -> Password {
        Password::new("correct horse").expect("valid password")
    }

    #[rstest]
    fn hashes_verify_only_the_original(password: Password) {
        let hasher = Argon2PasswordHasher::new();
        let hash = hasher.hash(&password).expect("hashed");

        assert!(hash.as_str().starts_with("$argon2id$"));
        assert!(hasher.verify("correct horse", &hash).expect("verified"));
        assert!(!hasher.verify("wrong horse", &hash).expect("verified"));
    }

    #[rstest]
    fn salts_differ_between_hashes(password: Password) {
        let hasher = Argon2PasswordHasher::new();
        let first = hasher.hash(&password).expect("hashed");
        let second = hasher.hash(&password).expect("hashed");
        assert_ne!(first.as_str(), second.as_str());
    }

    #[rstest]
    fn malformed_hashes_are_reported() {
        let error = Argon2PasswordHasher::new()
            .verify("anything", &PasswordHash::new("plaintext"))
            .expect_err("malformed");
        assert!(matches!(error, PasswordHashError::Malformed { .. }));
    }
}
