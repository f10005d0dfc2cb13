//! Password hashing and verification.
//!
//! Stored hashes are either bcrypt (`$2a$`, `$2b$`, `$2x$`, `$2y$`) or an
//! argon2 PHC string. Both primitives are slow by design, so callers run
//! them on the blocking pool.

use argon2::Argon2;
use password_hash::rand_core::OsRng;
use password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};

fn is_bcrypt(hash: &str) -> bool {
    ["$2a$", "$2b$", "$2x$", "$2y$"]
        .iter()
        .any(|prefix| hash.starts_with(prefix))
}

/// Hash a plain password with argon2id and a random salt.
pub fn hash_password(password: &str) -> Result<String, String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| e.to_string())
}

/// Verify a password against a stored hash. Unparseable hashes never match.
pub fn verify_password(password: &str, hash: &str) -> bool {
    if is_bcrypt(hash) {
        return bcrypt::verify(password, hash).unwrap_or(false);
    }
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bcrypt_hashes() {
        let hash = bcrypt::hash("password@A1", 4).unwrap();
        assert!(verify_password("password@A1", &hash));
        assert!(!verify_password("password@A2", &hash));
    }

    #[test]
    fn argon2_hashes() {
        let hash = hash_password("password@A1").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("password@A1", &hash));
        assert!(!verify_password("wrong", &hash));
    }

    #[test]
    fn salts_differ() {
        assert_ne!(hash_password("same").unwrap(), hash_password("same").unwrap());
    }

    #[test]
    fn garbage_never_matches() {
        assert!(!verify_password("", ""));
        assert!(!verify_password("password@A1", "plaintext"));
        assert!(!verify_password("password@A1", "$2b$broken"));
    }
}
