//! Password credentials and the capability that derives them.
//!
//! The registration flow only ever sees a [`CredentialDeriver`]; the Argon2id
//! implementation below is what the server wires in.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Derived, non-reversible password credential (PHC string).
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordCredential {
    hash: String,
}

// Don't expose hash in debug output (security)
impl std::fmt::Debug for PasswordCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordCredential")
            .field("hash", &"[REDACTED]")
            .finish()
    }
}

impl PasswordCredential {
    /// Wrap a credential loaded from storage.
    pub(crate) fn from_stored(hash: String) -> Self {
        Self { hash }
    }

    /// Get the hash string for storage.
    pub fn as_str(&self) -> &str {
        &self.hash
    }

    /// Consume and return the hash string.
    pub fn into_string(self) -> String {
        self.hash
    }

    /// Verify a plain text password against this credential.
    ///
    /// Counterpart of [`CredentialDeriver::derive`] for anything that needs
    /// to check a stored credential; any parameters encoded in the PHC
    /// string are honoured.
    pub fn verify(&self, plain_text: &str) -> bool {
        PasswordHash::new(&self.hash)
            .map(|parsed| {
                Argon2::default()
                    .verify_password(plain_text.as_bytes(), &parsed)
                    .is_ok()
            })
            .unwrap_or(false)
    }
}

/// One-way transformation of a plaintext password into a stored credential.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait CredentialDeriver: Send + Sync {
    fn derive(&self, plain_text: &str) -> AppResult<PasswordCredential>;
}

/// Argon2id credential deriver with a random salt per credential.
#[derive(Debug, Clone)]
pub struct Argon2Deriver {
    params: Params,
}

impl Argon2Deriver {
    /// Create a deriver with explicit memory (KiB) and iteration costs.
    pub fn new(memory_kib: u32, iterations: u32) -> AppResult<Self> {
        let params = Params::new(memory_kib, iterations, Params::DEFAULT_P_COST, None)
            .map_err(|e| AppError::internal(format!("Invalid Argon2 parameters: {}", e)))?;
        Ok(Self { params })
    }

    #[inline]
    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl CredentialDeriver for Argon2Deriver {
    fn derive(&self, plain_text: &str) -> AppResult<PasswordCredential> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(plain_text.as_bytes(), &salt)
            .map_err(|e| AppError::internal(format!("Password hash failed: {}", e)))?;
        Ok(PasswordCredential {
            hash: hash.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap() -> Argon2Deriver {
        Argon2Deriver::new(1024, 1).unwrap()
    }

    #[test]
    fn test_derive_and_verify() {
        let credential = cheap().derive("SecurePassword123!").unwrap();

        assert!(credential.verify("SecurePassword123!"));
        assert!(!credential.verify("WrongPassword123"));
        assert_ne!(credential.as_str(), "SecurePassword123!");
    }

    #[test]
    fn test_same_password_different_salts() {
        let deriver = cheap();
        let first = deriver.derive("SamePassword123").unwrap();
        let second = deriver.derive("SamePassword123").unwrap();

        assert_ne!(first, second);
        assert!(first.verify("SamePassword123"));
        assert!(second.verify("SamePassword123"));
    }

    #[test]
    fn test_stored_credential_round_trips() {
        let hash = cheap().derive("TestPassword123").unwrap().into_string();
        let restored = PasswordCredential::from_stored(hash);

        assert!(restored.verify("TestPassword123"));
    }

    #[test]
    fn test_uses_argon2id() {
        let credential = cheap().derive("TestPassword123").unwrap();
        assert!(credential.as_str().starts_with("$argon2id$"));
    }

    #[test]
    fn test_garbage_hash_never_verifies() {
        let credential = PasswordCredential::from_stored("not-a-phc-string".to_string());
        assert!(!credential.verify("anything"));
    }

    #[test]
    fn test_invalid_params_rejected() {
        assert!(matches!(Argon2Deriver::new(0, 1), Err(AppError::Internal(_))));
    }

    #[test]
    fn test_debug_redacts_hash() {
        let credential = cheap().derive("TestPassword123").unwrap();
        let rendered = format!("{:?}", credential);

        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("argon2id"));
    }
}
