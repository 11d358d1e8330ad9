use sqlx::PgPool;

use crate::notify::Notifier;

/// How the admin password gate is configured. Resolved once at startup from
/// the environment; `Disabled` rejects every admin request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AdminCredential {
    /// Argon2id PHC hash from `MATURIS_ADMIN_PASSWORD_HASH` (preferred).
    Argon2Hash(String),
    /// Plaintext from `MATURIS_ADMIN_PASSWORD` (dev convenience).
    Plain(String),
    /// Neither variable set; the admin surface stays closed.
    Disabled,
}

impl AdminCredential {
    pub fn from_env() -> Self {
        if let Ok(hash) = std::env::var("MATURIS_ADMIN_PASSWORD_HASH") {
            if !hash.is_empty() {
                return Self::Argon2Hash(hash);
            }
        }
        match std::env::var("MATURIS_ADMIN_PASSWORD") {
            Ok(password) if !password.is_empty() => Self::Plain(password),
            _ => Self::Disabled,
        }
    }

    pub fn verify(&self, presented: &str) -> bool {
        match self {
            Self::Argon2Hash(hash) => {
                maturis_core::auth::verify_password(presented, hash).unwrap_or(false)
            }
            Self::Plain(password) => maturis_core::auth::digest_eq(presented, password),
            Self::Disabled => false,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub admin: AdminCredential,
    pub notifier: Option<Notifier>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_credential_verifies_exact_match_only() {
        let credential = AdminCredential::Plain("hunter2".to_string());
        assert!(credential.verify("hunter2"));
        assert!(!credential.verify("hunter"));
        assert!(!credential.verify(""));
    }

    #[test]
    fn argon2_credential_verifies_against_hash() {
        let hash = maturis_core::auth::hash_password("hunter2").unwrap();
        let credential = AdminCredential::Argon2Hash(hash);
        assert!(credential.verify("hunter2"));
        assert!(!credential.verify("hunter3"));
    }

    #[test]
    fn malformed_hash_rejects_instead_of_erroring() {
        let credential = AdminCredential::Argon2Hash("garbage".to_string());
        assert!(!credential.verify("anything"));
    }

    #[test]
    fn disabled_credential_rejects_everything() {
        assert!(!AdminCredential::Disabled.verify("hunter2"));
        assert!(!AdminCredential::Disabled.verify(""));
    }
}
