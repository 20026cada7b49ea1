//! Password hashing
//!
//! Passwords are stored as argon2id PHC strings
//! (`$argon2id$v=19$m=...,t=...,p=...$salt$hash`). Plaintext is never
//! persisted, and stored values that are not PHC strings never verify.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use lazy_static::lazy_static;

use crate::error::AppError;

lazy_static! {
    /// Checked on logins for unknown emails so they cost the same as a real check
    static ref DUMMY_HASH: Option<String> = hash_password("taskboard-unknown-account").ok();
}

/// Hash a password with a fresh random salt
///
/// # Returns
/// PHC-format hash string suitable for storage
///
/// # Errors
/// Returns error if the hashing backend fails
pub fn hash_password(password: &str) -> Result<String, AppError> {
    // 1. Fresh salt per password
    let salt = SaltString::generate(&mut rand::rngs::OsRng);

    // 2. Hash with default argon2id parameters
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::PasswordHash(e.to_string()))?;

    Ok(hash.to_string())
}

/// Check a candidate password against a stored hash
///
/// # Returns
/// `false` on mismatch, and also when `stored_hash` is not a PHC string
/// (e.g. a legacy plaintext value).
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        tracing::warn!("Stored password is not a PHC hash; refusing to compare");
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// [`hash_password`] on the blocking thread pool
pub async fn hash_password_blocking(password: String) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AppError::Internal(e.into()))?
}

/// [`verify_password`] on the blocking thread pool
pub async fn verify_password_blocking(
    password: String,
    stored_hash: String,
) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
        .await
        .map_err(|e| AppError::Internal(e.into()))
}

/// Verify against a fixed hash and discard the result, on the blocking pool
///
/// Login calls this when no stored hash exists so an unknown email answers
/// no faster than a wrong password.
pub async fn verify_dummy_password_blocking(password: String) -> Result<(), AppError> {
    tokio::task::spawn_blocking(move || {
        if let Some(hash) = DUMMY_HASH.as_deref() {
            let _ = verify_password(&password, hash);
        }
    })
    .await
    .map_err(|e| AppError::Internal(e.into()))
}
