use argon2::Argon2;
use password_hash::rand_core::OsRng;
use password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use sha2::{Digest, Sha256};

/// Hash the admin password with Argon2id and a random salt. Used by
/// `maturis admin hash-password` to produce the value operators put in
/// `MATURIS_ADMIN_PASSWORD_HASH`.
pub fn hash_password(password: &str) -> Result<String, String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| format!("Failed to hash password: {e}"))
}

/// Verify a password against an Argon2id hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, String> {
    let parsed = PasswordHash::new(hash).map_err(|e| format!("Invalid password hash: {e}"))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// SHA-256 hex digest of a credential string.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Compare two credential strings by digest. Both sides go through a full
/// SHA-256 pass so the comparison cost does not depend on where the strings
/// first differ.
pub fn digest_eq(presented: &str, expected: &str) -> bool {
    hash_token(presented) == hash_token(expected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_roundtrip() {
        let password = "correct horse battery staple";
        let hash = hash_password(password).unwrap();
        assert!(verify_password(password, &hash).unwrap());
        assert!(!verify_password("wrong_password", &hash).unwrap());
    }

    #[test]
    fn verify_rejects_malformed_hash() {
        assert!(verify_password("anything", "not-a-phc-string").is_err());
    }

    #[test]
    fn hash_token_is_stable_hex() {
        let digest = hash_token("admin-secret");
        assert_eq!(digest.len(), 64);
        assert_eq!(digest, hash_token("admin-secret"));
        assert_ne!(digest, hash_token("admin-secret2"));
    }

    #[test]
    fn digest_eq_matches_only_identical_credentials() {
        assert!(digest_eq("s3cret", "s3cret"));
        assert!(!digest_eq("s3cret", "S3cret"));
        assert!(!digest_eq("", "s3cret"));
    }
}
