//! Credential check command.
//!
//! ```bash
//! AGORA_PASSWORD='Admin#1' agora-cli login --role admin --username TechAdmin1
//! ```
//!
//! Prints the authenticated identity as JSON.

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tokio::sync::mpsc;

use agora_core::Role;
use agora_storefront::config::{ConfigError, StorefrontConfig};
use agora_storefront::db::{self, PgCredentialStore};
use agora_storefront::services::{AuthError, AuthService, PasswordError, PasswordVerifier};

/// Errors that can occur while checking a login.
#[derive(Debug, Error)]
pub enum LoginError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Database connection error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Reading stdin failed.
    #[error("Failed to read password: {0}")]
    Io(#[from] std::io::Error),

    /// Hashing parameters were rejected.
    #[error(transparent)]
    Password(#[from] PasswordError),

    /// Authentication failed.
    #[error("Login failed: {0}")]
    Auth(#[from] AuthError),

    /// Output encoding failed.
    #[error("Failed to encode identity: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Validate credentials and print the resulting identity.
pub async fn check(role: Role, username: &str, password: Option<String>) -> Result<(), LoginError> {
    let password = SecretString::from(match password {
        Some(p) => p,
        None => super::read_password_from_stdin()?,
    });

    let config = StorefrontConfig::from_env()?;
    let verifier = PasswordVerifier::from_config(&config.hashing)?;

    tracing::info!("Connecting to storefront database...");
    let pool = db::create_pool(&config.database_url, config.max_connections).await?;

    let (rehash_tx, mut rehash_rx) = mpsc::unbounded_channel();
    let auth =
        AuthService::new(PgCredentialStore::new(pool), verifier).with_rehash_queue(rehash_tx);

    let identity = match role {
        Role::Admin => auth.validate_admin(username, password.expose_secret()).await?,
        Role::Client => auth.validate_customer(username, password.expose_secret()).await?,
    };

    while let Ok(request) = rehash_rx.try_recv() {
        tracing::warn!(
            username = %request.username,
            role = %request.role,
            "Stored password hash uses outdated parameters; update it with `agora-cli hash-password`"
        );
    }

    let output = serde_json::to_string_pretty(&identity)?;

    #[allow(clippy::print_stdout)]
    {
        println!("{output}");
    }

    Ok(())
}
