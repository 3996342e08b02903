//! Password hashing and comparison.
//!
//! bcrypt with a fixed work factor; each hash carries its own random salt.
//! Both operations run on the blocking pool so request tasks keep yielding
//! while the derivation grinds.

use crate::store::StoreError;
use secrecy::{ExposeSecret, SecretString};
use tokio::task;

// Deliberately slow; matches the work factor the accounts were created with.
const COST: u32 = 10;

/// Derive the salted hash stored in place of the plaintext.
///
/// # Errors
///
/// Returns an error if the derivation fails or the blocking task is
/// cancelled.
pub async fn hash(plaintext: SecretString) -> Result<String, StoreError> {
    let hashed =
        task::spawn_blocking(move || bcrypt::hash(plaintext.expose_secret(), COST)).await??;

    Ok(hashed)
}

/// Compare a candidate password against a stored hash.
///
/// Always goes through the library's matching primitive; callers never
/// re-derive and string-compare themselves.
///
/// # Errors
///
/// Returns an error if the stored hash is malformed or the blocking task is
/// cancelled.
pub async fn verify(candidate: SecretString, stored: String) -> Result<bool, StoreError> {
    let matches =
        task::spawn_blocking(move || bcrypt::verify(candidate.expose_secret(), &stored)).await??;

    Ok(matches)
}
