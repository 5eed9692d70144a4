//! Password hashing and verification.
//!
//! Passwords are hashed with Argon2id into self-describing PHC strings. A
//! fresh salt is generated for every call, so hashing the same password twice
//! never yields the same string. Verification goes through the argon2
//! verifier, which compares digests in constant time.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HashError {
    #[error("password hashing failed: {0}")]
    HashFailed(String),
}

/// Hash a plaintext password into a PHC-format string.
///
/// # Errors
///
/// Returns an error if hashing fails.
pub fn hash(password: &str) -> Result<String, HashError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| HashError::HashFailed(e.to_string()))
}

/// Verify a plaintext password against a stored hash.
///
/// Malformed stored hashes verify as false rather than erroring; the caller
/// only ever learns match or mismatch.
#[must_use]
pub fn verify(password: &str, hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(hash) else {
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}
