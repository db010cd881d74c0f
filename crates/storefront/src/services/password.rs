//! Password hashing and verification.
//!
//! Hashes are Argon2id PHC strings (`$argon2id$v=19$m=...,t=...,p=...$salt$hash`)
//! with a fresh random salt per call. Verification re-derives the hash with the
//! parameters embedded in the stored string and compares the outputs in
//! constant time, so older hashes keep working after the configured cost
//! changes. Those are reported as [`Verification::MatchNeedsRehash`].

use argon2::password_hash::{
    PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString, rand_core::OsRng,
};
use argon2::{Algorithm, Argon2, Params, Version};
use thiserror::Error;

use crate::config::HashingConfig;

/// Errors from producing a password hash.
#[derive(Debug, Error)]
pub enum PasswordError {
    /// The cost parameters are outside Argon2's limits.
    #[error("invalid hashing parameters: {0}")]
    InvalidParams(String),

    /// Deriving the hash failed.
    #[error("password hashing failed: {0}")]
    Hash(String),
}

/// Outcome of checking a password against a stored hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    /// The password is correct and the hash is current.
    Match,
    /// The password is wrong, or the stored hash is unusable.
    NoMatch,
    /// The password is correct but the hash was made with other parameters.
    MatchNeedsRehash,
}

impl Verification {
    /// Whether the password was correct.
    #[must_use]
    pub const fn is_match(self) -> bool {
        matches!(self, Self::Match | Self::MatchNeedsRehash)
    }
}

/// Argon2id hasher/verifier with fixed cost parameters.
#[derive(Debug, Clone, Default)]
pub struct PasswordVerifier {
    params: Params,
}

impl PasswordVerifier {
    /// Create a verifier from explicit cost parameters.
    ///
    /// # Errors
    ///
    /// Returns `PasswordError::InvalidParams` if Argon2 rejects the values.
    pub fn with_cost(
        memory_kib: u32,
        iterations: u32,
        parallelism: u32,
    ) -> Result<Self, PasswordError> {
        Self::from_config(&HashingConfig {
            memory_kib,
            iterations,
            parallelism,
        })
    }

    /// Create a verifier from configuration.
    ///
    /// # Errors
    ///
    /// Returns `PasswordError::InvalidParams` if Argon2 rejects the values.
    pub fn from_config(config: &HashingConfig) -> Result<Self, PasswordError> {
        let params = config
            .params()
            .map_err(|e| PasswordError::InvalidParams(e.to_string()))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash a password with a fresh random salt.
    ///
    /// # Errors
    ///
    /// Returns `PasswordError::Hash` if the derivation fails.
    pub fn hash(&self, plaintext: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2()
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordError::Hash(e.to_string()))
    }

    /// Check `plaintext` against a stored hash.
    ///
    /// A stored value that does not parse, or names an algorithm this verifier
    /// cannot compute, is a `NoMatch`.
    #[must_use]
    pub fn verify(&self, stored_hash: &str, plaintext: &str) -> Verification {
        let Ok(parsed) = PasswordHash::new(stored_hash) else {
            return Verification::NoMatch;
        };

        if self
            .argon2()
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_err()
        {
            return Verification::NoMatch;
        }

        if self.is_current(&parsed) {
            Verification::Match
        } else {
            Verification::MatchNeedsRehash
        }
    }

    /// Whether a hash was made with this verifier's algorithm and costs.
    fn is_current(&self, hash: &PasswordHash<'_>) -> bool {
        if hash.algorithm != Algorithm::Argon2id.ident() {
            return false;
        }
        if hash.version != Some(Version::V0x13.into()) {
            return false;
        }

        Params::try_from(hash).is_ok_and(|stored| {
            stored.m_cost() == self.params.m_cost()
                && stored.t_cost() == self.params.t_cost()
                && stored.p_cost() == self.params.p_cost()
        })
    }
}
