//! Password hashing for users and organizers (Argon2id, PHC strings).

use argon2::{password_hash::{PasswordHasher, PasswordVerifier, SaltString}, Argon2, PasswordHash};
use rand::rngs::OsRng;

use crate::errors::{Result, ServiceError};

pub const MIN_PASSWORD_LEN: usize = 8;

pub fn hash_password(plain: &str) -> Result<String> {
    if plain.len() < MIN_PASSWORD_LEN {
        return Err(ServiceError::validation(format!("password too short (>={MIN_PASSWORD_LEN})")));
    }
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| ServiceError::Validation(format!("hash error: {e}")))?
        .to_string();
    Ok(hash)
}

/// `false` for a wrong password; `Err` only when the stored hash is malformed.
pub fn verify_password(plain: &str, stored: &str) -> Result<bool> {
    let parsed = PasswordHash::new(stored).map_err(|e| ServiceError::Validation(format!("stored hash unreadable: {e}")))?;
    Ok(Argon2::default().verify_password(plain.as_bytes(), &parsed).is_ok())
}
