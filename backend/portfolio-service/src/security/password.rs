/// Password hashing and verification using Argon2id
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use zxcvbn::zxcvbn;

use crate::error::{AppError, Result};

/// Hash a password using Argon2id.
///
/// Enforces strength (length, character classes, zxcvbn score >= 3)
/// before hashing; returns a PHC-formatted string safe for storage.
pub fn hash_password(password: &str) -> Result<String> {
    validate_password_strength(password)?;

    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?
        .to_string();

    Ok(password_hash)
}

/// Verify a password against its stored hash.
///
/// Returns `Ok(false)` on mismatch; errors only on malformed hashes or
/// verifier failures.
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|e| AppError::Internal(format!("Invalid password hash format: {}", e)))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(_) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AppError::Internal(format!(
            "Password verification failed: {}",
            e
        ))),
    }
}

/// Validate password strength using composition rules and zxcvbn.
pub fn validate_password_strength(password: &str) -> Result<()> {
    if password.len() < 8 {
        return Err(AppError::Validation(
            "Password must be at least 8 characters".to_string(),
        ));
    }
    if password.len() > 128 {
        return Err(AppError::Validation(
            "Password must be at most 128 characters".to_string(),
        ));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(AppError::Validation(
            "Password must contain an uppercase letter".to_string(),
        ));
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(AppError::Validation(
            "Password must contain a lowercase letter".to_string(),
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(AppError::Validation(
            "Password must contain a digit".to_string(),
        ));
    }

    let estimate = zxcvbn(password, &[])
        .map_err(|e| AppError::Internal(format!("Password strength estimation failed: {}", e)))?;
    if estimate.score() < 3 {
        return Err(AppError::Validation(
            "Password is too guessable; choose a stronger one".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const STRONG: &str = "Tr4verse-Quartz-Lantern";

    #[test]
    fn hash_and_verify_round_trip() {
        let hash = hash_password(STRONG).expect("strong password should hash");
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password(STRONG, &hash).unwrap());
        assert!(!verify_password("Wrong-Password-9", &hash).unwrap());
    }

    #[test]
    fn weak_passwords_are_rejected_before_hashing() {
        for weak in ["short1A", "alllowercase1", "ALLUPPERCASE1", "NoDigitsHere", "Password1"] {
            assert!(hash_password(weak).is_err(), "{weak} should be rejected");
        }
    }

    #[test]
    fn malformed_hash_is_an_error_not_a_mismatch() {
        assert!(verify_password(STRONG, "not-a-phc-string").is_err());
    }
}
