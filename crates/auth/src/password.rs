//! Password hashing at the credential boundary.
//!
//! Argon2id with a per-password random salt. The raw secret is hashed at
//! registration and never stored.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("password hashing failed")]
pub struct PasswordError;

/// Hash a raw password into a PHC-format Argon2id string.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| PasswordError)
}

/// Check a candidate password against a stored hash.
///
/// An unparseable stored hash counts as a mismatch rather than an error;
/// login failure is the only observable outcome either way.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_round_trip() {
        let hash = hash_password("hunter2").unwrap();
        assert!(verify_password("hunter2", &hash));
        assert!(!verify_password("hunter3", &hash));
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash_password("same-password").unwrap();
        let b = hash_password("same-password").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn garbage_stored_hash_is_a_mismatch() {
        assert!(!verify_password("anything", "not-a-phc-hash"));
    }
}
