//! Password Hashing
//! Mission: Argon2id hashing and verification for stored credentials

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use lazy_static::lazy_static;
use tracing::{error, warn};

lazy_static! {
    // Verified against when the login identity is unknown, so a miss costs
    // the same as a wrong password.
    static ref DUMMY_HASH: Result<String, PasswordError> = hash_password("lyked-dummy-password");
}

/// Build the dummy hash up front so a broken hasher stops start-up
pub fn init_dummy_hash() -> Result<(), PasswordError> {
    DUMMY_HASH.as_ref().map(|_| ()).map_err(Clone::clone)
}

/// Hash a password into an argon2id PHC string with a random salt
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError(e.to_string()))
}

/// Check a password against a stored PHC string
pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            warn!("Stored password hash is unparseable: {}", e);
            false
        }
    }
}

/// Burn one verification against the dummy hash. Always false.
pub fn verify_dummy(password: &str) -> bool {
    match DUMMY_HASH.as_ref() {
        Ok(hash) => {
            let _ = verify_password(password, hash);
        }
        Err(e) => error!("Dummy hash unavailable: {}", e),
    }
    false
}

#[derive(Debug, Clone)]
pub struct PasswordError(String);

impl std::fmt::Display for PasswordError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Failed to hash password: {}", self.0)
    }
}

impl std::error::Error for PasswordError {}
