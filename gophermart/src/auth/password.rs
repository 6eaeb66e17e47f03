//! Adaptive, per-row-salted password hashing (Argon2id), never a bare digest.
use argon2::Argon2;
use password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use rand_core::OsRng;

/// Hashes `password` into a self-describing PHC string (`$argon2id$v=19$...`) with a fresh
/// per-call salt.
pub fn hash(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| anyhow::anyhow!("hashing password: {err}"))?;
    Ok(hash.to_string())
}

/// Verifies `password` against a previously stored PHC string. Returns `false` (not an error)
/// both for a genuine mismatch and for a malformed stored hash, so callers never need to
/// distinguish the two when deciding whether to authenticate.
pub fn verify(password: &str, stored_hash: &str) -> bool {
    let parsed = match PasswordHash::new(stored_hash) {
        Ok(hash) => hash,
        Err(_) => return false,
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_correct_password() {
        let hash = hash("correct horse battery staple").unwrap();
        assert!(verify("correct horse battery staple", &hash));
    }

    #[test]
    fn rejects_a_wrong_password() {
        let hash = hash("correct horse battery staple").unwrap();
        assert!(!verify("wrong", &hash));
    }

    #[test]
    fn two_hashes_of_the_same_password_differ() {
        let a = hash("same password").unwrap();
        let b = hash("same password").unwrap();
        assert_ne!(a, b);
    }
}
