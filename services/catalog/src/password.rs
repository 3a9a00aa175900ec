//! Password hashing and verification
//!
//! Digests are Argon2id PHC strings; each call to [`CredentialManager::hash`]
//! draws a fresh random salt, which is embedded in the digest.

use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
    password_hash::SaltString,
};
use std::fmt;
use thiserror::Error;

/// Errors raised while deriving a digest
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("Invalid password hashing parameters: {0}")]
    Parameters(String),

    #[error("Failed to hash password: {0}")]
    Hashing(String),

    #[error("Password hashing task failed: {0}")]
    Worker(String),
}

/// Run hashing or verification on the blocking thread pool
///
/// Argon2 at its default cost takes tens of milliseconds of CPU, which must
/// not stall the async workers.
pub async fn run_blocking<T, F>(work: F) -> Result<T, CredentialError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| CredentialError::Worker(e.to_string()))
}

/// Stored password digest
///
/// No conversion back to a plaintext password exists.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordDigest(String);

impl PasswordDigest {
    /// Wrap a digest read back from storage
    pub fn from_stored(digest: impl Into<String>) -> Self {
        Self(digest.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordDigest(..)")
    }
}

/// Argon2 cost parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashingCost {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HashingCost {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

/// Derives and verifies salted password digests
#[derive(Clone)]
pub struct CredentialManager {
    params: Params,
    /// Digest checked when a login names an unknown account
    dummy_digest: PasswordDigest,
}

impl CredentialManager {
    pub fn new(cost: HashingCost) -> Result<Self, CredentialError> {
        let params = Params::new(cost.memory_kib, cost.iterations, cost.parallelism, None)
            .map_err(|e| CredentialError::Parameters(e.to_string()))?;

        let mut manager = Self {
            params,
            dummy_digest: PasswordDigest(String::new()),
        };
        manager.dummy_digest = manager.hash("catalog-unknown-account")?;
        Ok(manager)
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash a plaintext password with a fresh salt
    pub fn hash(&self, password: &str) -> Result<PasswordDigest, CredentialError> {
        let salt = SaltString::generate(&mut rand::thread_rng());
        let digest = self
            .argon2()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| CredentialError::Hashing(e.to_string()))?
            .to_string();

        Ok(PasswordDigest(digest))
    }

    /// Verify a plaintext password against a digest
    ///
    /// The cost parameters are read from the digest itself, and the final
    /// comparison is constant-time. Malformed digests never verify.
    pub fn verify(&self, password: &str, digest: &PasswordDigest) -> bool {
        let Ok(parsed) = PasswordHash::new(digest.as_str()) else {
            return false;
        };

        self.argon2()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }

    /// Spend the same work as a real verification, then fail
    pub fn verify_unknown_account(&self, password: &str) -> bool {
        let _ = self.verify(password, &self.dummy_digest);
        false
    }
}

#[cfg(test)]
pub(crate) fn test_manager() -> CredentialManager {
    CredentialManager::new(HashingCost {
        memory_kib: 64,
        iterations: 1,
        parallelism: 1,
    })
    .expect("test hashing parameters are valid")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_accepts_the_original_password() {
        let credentials = test_manager();
        let digest = credentials.hash("s3cret-pass").unwrap();

        assert!(credentials.verify("s3cret-pass", &digest));
        assert!(!credentials.verify("wrong-pass", &digest));
    }

    #[test]
    fn test_digest_never_contains_plaintext() {
        let credentials = test_manager();
        let digest = credentials.hash("s3cret-pass").unwrap();

        assert_ne!(digest.as_str(), "s3cret-pass");
        assert!(!digest.as_str().contains("s3cret-pass"));
        assert!(digest.as_str().starts_with("$argon2id$"));
        assert_eq!(format!("{:?}", digest), "PasswordDigest(..)");
    }

    #[test]
    fn test_each_hash_uses_a_fresh_salt() {
        let credentials = test_manager();
        let first = credentials.hash("same-password").unwrap();
        let second = credentials.hash("same-password").unwrap();

        assert_ne!(first, second);
        assert!(credentials.verify("same-password", &first));
        assert!(credentials.verify("same-password", &second));
    }

    #[test]
    fn test_malformed_digest_does_not_verify() {
        let credentials = test_manager();
        let digest = PasswordDigest::from_stored("pbkdf2:sha256:not-a-phc-string");
        assert!(!credentials.verify("anything", &digest));
    }

    #[test]
    fn test_unknown_account_never_verifies() {
        let credentials = test_manager();
        assert!(!credentials.verify_unknown_account("catalog-unknown-account"));
    }

    #[test]
    fn test_invalid_cost_is_rejected() {
        let result = CredentialManager::new(HashingCost {
            memory_kib: 1,
            iterations: 0,
            parallelism: 1,
        });
        assert!(matches!(result, Err(CredentialError::Parameters(_))));
    }
}
