//! Account password storage.
//!
//! Accounts keep an Argon2id PHC string, never the password itself. Failures
//! of the hasher surface as [`AuthError::Unavailable`]: they are the
//! provider's fault, not the user's.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use fittrack_core::AuthError;

/// Produce the stored form of a new account password.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|phc| phc.to_string())
        .map_err(|e| AuthError::Unavailable(format!("password hashing failed: {e}")))
}

/// Check a sign-in attempt against the stored PHC string.
///
/// A mismatch is `Ok(false)`. A stored value that does not parse is an
/// outage, so it cannot be mistaken for a wrong password.
pub fn verify_password(password: &str, stored: &str) -> Result<bool, AuthError> {
    let unavailable = |e: argon2::password_hash::Error| {
        AuthError::Unavailable(format!("stored password is unreadable: {e}"))
    };
    let phc = PasswordHash::new(stored).map_err(unavailable)?;
    match Argon2::default().verify_password(password.as_bytes(), &phc) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(unavailable(e)),
    }
}
