//! Salted password hashing (Argon2id, PHC string format).

use argon2::password_hash::{self, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng};
use argon2::{Algorithm, Argon2, Params, Version};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PasswordError {
    #[error("password must not be empty")]
    Empty,

    #[error("malformed password hash: {0}")]
    Malformed(String),

    #[error("password hashing failed: {0}")]
    Hash(String),
}

/// A PHC-encoded Argon2 hash (`$argon2id$v=19$...`).
///
/// The salt and parameters travel inside the string, so verification needs
/// no extra configuration.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap a hash read back from storage, checking that it parses.
    pub fn from_phc(phc: impl Into<String>) -> Result<Self, PasswordError> {
        let phc = phc.into();
        password_hash::PasswordHash::new(&phc).map_err(|e| PasswordError::Malformed(e.to_string()))?;
        Ok(Self(phc))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Verify a candidate password. The digest comparison is constant-time.
    pub fn verify(&self, candidate: &str) -> bool {
        let Ok(parsed) = password_hash::PasswordHash::new(&self.0) else {
            return false;
        };
        Argon2::default()
            .verify_password(candidate.as_bytes(), &parsed)
            .is_ok()
    }
}

impl core::fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}

/// Produces [`PasswordHash`]es with a fixed Argon2id cost.
#[derive(Clone)]
pub struct CredentialHasher {
    argon: Argon2<'static>,
}

impl CredentialHasher {
    /// Argon2id with the crate's recommended default cost.
    pub fn new() -> Self {
        Self {
            argon: Argon2::default(),
        }
    }

    /// Minimal cost, for tests and throwaway dev data only.
    pub fn low_cost() -> Self {
        let params = Params::new(Params::MIN_M_COST, 1, 1, None).unwrap_or_default();
        Self {
            argon: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        }
    }

    pub fn hash(&self, password: &str) -> Result<PasswordHash, PasswordError> {
        if password.is_empty() {
            return Err(PasswordError::Empty);
        }
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| PasswordError::Hash(e.to_string()))?;
        Ok(PasswordHash(hash.to_string()))
    }
}

impl Default for CredentialHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for CredentialHasher {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CredentialHasher").finish_non_exhaustive()
    }
}
