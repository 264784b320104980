//! Password verification against stored argon2 hashes.
//!
//! Accounts created through the OAuth path have no local password; that case
//! is a distinct outcome so the login handler can tell the user to use
//! external sign-in instead of reporting a generic mismatch.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordVerifier},
};
use tracing::warn;

/// Outcome of checking a submitted password against a stored credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordCheck {
    /// Submitted password matches the stored hash.
    Match,
    /// Submitted password does not match (or the stored hash is unusable).
    Mismatch,
    /// No local password exists: the account was created via external
    /// sign-in.
    NoLocalPassword,
}

/// Compare a plaintext candidate against a stored argon2 PHC hash.
///
/// Fails closed: a stored hash that cannot be parsed is treated as a
/// mismatch, never as a match.
#[must_use]
pub fn verify_password(candidate: &str, stored_hash: Option<&str>) -> PasswordCheck {
    let Some(stored_hash) = stored_hash.map(str::trim).filter(|hash| !hash.is_empty()) else {
        return PasswordCheck::NoLocalPassword;
    };

    let parsed = match PasswordHash::new(stored_hash) {
        Ok(parsed) => parsed,
        Err(err) => {
            warn!("Stored password hash is malformed: {err}");
            return PasswordCheck::Mismatch;
        }
    };

    match Argon2::default().verify_password(candidate.as_bytes(), &parsed) {
        Ok(()) => PasswordCheck::Match,
        Err(_) => PasswordCheck::Mismatch,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argon2::password_hash::{PasswordHasher, SaltString, rand_core::OsRng};

    fn hash(password: &str) -> String {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .expect("hashing test password")
            .to_string()
    }

    #[test]
    fn correct_password_matches() {
        let stored = hash("correct-password");
        assert_eq!(
            verify_password("correct-password", Some(&stored)),
            PasswordCheck::Match
        );
    }

    #[test]
    fn wrong_password_mismatches() {
        let stored = hash("correct-password");
        assert_eq!(
            verify_password("wrong-password", Some(&stored)),
            PasswordCheck::Mismatch
        );
    }

    #[test]
    fn missing_hash_is_external_sign_in() {
        assert_eq!(
            verify_password("anything", None),
            PasswordCheck::NoLocalPassword
        );
        assert_eq!(
            verify_password("anything", Some("")),
            PasswordCheck::NoLocalPassword
        );
    }

    #[test]
    fn malformed_hash_fails_closed() {
        assert_eq!(
            verify_password("anything", Some("$argon2id$not-a-hash")),
            PasswordCheck::Mismatch
        );
        assert_eq!(
            verify_password("anything", Some("plaintext-left-in-db")),
            PasswordCheck::Mismatch
        );
    }
}
