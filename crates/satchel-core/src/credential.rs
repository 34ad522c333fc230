//! Credential hashing and verification.
//!
//! Argon2id with per-credential random salts. Verification goes through the
//! library's constant-time comparison, so a failed match and a successful one
//! take the same time.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::error::CoreError;

/// Hash a plaintext credential for storage.
pub fn hash_credential(plain: &str) -> Result<String, CoreError> {
    if plain.is_empty() {
        return Err(CoreError::EmptyCredential);
    }
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| CoreError::CredentialHash(e.to_string()))?;
    Ok(hash.to_string())
}

/// Check a plaintext credential against a stored hash.
///
/// Returns `Ok(false)` on mismatch; errors only when the stored hash itself
/// is malformed.
pub fn verify_credential(plain: &str, stored_hash: &str) -> Result<bool, CoreError> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| CoreError::MalformedCredentialHash(e.to_string()))?;
    match Argon2::default().verify_password(plain.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(CoreError::MalformedCredentialHash(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let hash = hash_credential("open sesame").unwrap();
        assert!(verify_credential("open sesame", &hash).unwrap());
        assert!(!verify_credential("open says me", &hash).unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_credential("same input").unwrap();
        let b = hash_credential("same input").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_empty_credential_rejected() {
        assert!(matches!(
            hash_credential(""),
            Err(CoreError::EmptyCredential)
        ));
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        assert!(verify_credential("anything", "not-a-phc-string").is_err());
    }
}
