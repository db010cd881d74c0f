//! Password hashing command.
//!
//! Credential records are created and updated outside the session core; this
//! command produces the `password_hash` value for them.
//!
//! ```bash
//! agora-cli hash-password --password 'Secret#1'
//! printf 'Secret#1' | agora-cli hash-password
//! ```

use thiserror::Error;

use agora_storefront::config::{ConfigError, HashingConfig};
use agora_storefront::services::{PasswordError, PasswordVerifier};

/// Errors that can occur while hashing.
#[derive(Debug, Error)]
pub enum HashError {
    /// Hashing parameters could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Reading stdin failed.
    #[error("Failed to read password: {0}")]
    Io(#[from] std::io::Error),

    /// An empty password was supplied.
    #[error("Password must not be empty")]
    EmptyPassword,

    /// Hashing failed.
    #[error(transparent)]
    Password(#[from] PasswordError),
}

/// Hash a password and print the PHC string.
pub fn hash(password: Option<String>) -> Result<(), HashError> {
    let password = match password {
        Some(p) => p,
        None => super::read_password_from_stdin()?,
    };
    if password.trim().is_empty() {
        return Err(HashError::EmptyPassword);
    }

    let hashing = HashingConfig::from_env()?;
    let verifier = PasswordVerifier::from_config(&hashing)?;
    let hash = verifier.hash(&password)?;

    tracing::debug!(
        memory_kib = hashing.memory_kib,
        iterations = hashing.iterations,
        parallelism = hashing.parallelism,
        "Password hashed"
    );

    #[allow(clippy::print_stdout)]
    {
        println!("{hash}");
    }

    Ok(())
}
