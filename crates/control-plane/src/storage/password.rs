// Password credentials for local (email + password) accounts
// Decision: Argon2id with library defaults; the PHC string stores salt and parameters
// Decision: Sign-up policy is checked here, before any hashing work is done
// Decision: A wrong password is Ok(false); only an unreadable stored hash is an error

use anyhow::{anyhow, Result};
use argon2::{
    password_hash::{
        rand_core::OsRng, Error as HashError, PasswordHash, PasswordHasher, PasswordVerifier,
        SaltString,
    },
    Argon2,
};

/// Minimum accepted password length, in characters
pub const MIN_PASSWORD_LEN: usize = 6;

pub const PASSWORD_TOO_SHORT: &str = "Password must be at least 6 characters";
pub const PASSWORDS_DONT_MATCH: &str = "Passwords don't match";

/// Check a sign-up password (and its confirmation, when the form sends one)
pub fn check_password_policy(password: &str, confirm: Option<&str>) -> Result<(), &'static str> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(PASSWORD_TOO_SHORT);
    }
    if confirm.is_some_and(|c| c != password) {
        return Err(PASSWORDS_DONT_MATCH);
    }
    Ok(())
}

/// PHC-encoded Argon2id hash with a fresh random salt
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| anyhow!("Failed to hash password: {e}"))
}

/// Check a sign-in attempt against the stored hash of a user row
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| anyhow!("Stored password hash is malformed: {e}"))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(HashError::Password) => Ok(false),
        Err(e) => Err(anyhow!("Password verification failed: {e}")),
    }
}
