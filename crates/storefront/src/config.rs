//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string
//!   (falls back to `DATABASE_URL`)
//!
//! ## Optional
//! - `STOREFRONT_DB_MAX_CONNECTIONS` - Pool size for read queries (default: 10)
//! - `PASSWORD_HASH_MEMORY_KIB` - Argon2 memory cost in KiB (default: 19456)
//! - `PASSWORD_HASH_ITERATIONS` - Argon2 time cost (default: 2)
//! - `PASSWORD_HASH_PARALLELISM` - Argon2 lanes (default: 1)

use secrecy::SecretString;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront session core configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// Upper bound on pooled connections used for credential lookups
    pub max_connections: u32,
    /// Password hashing cost parameters
    pub hashing: HashingConfig,
}

/// Argon2id cost parameters for new password hashes.
///
/// Stored hashes made with different parameters still verify, but are
/// reported as needing a rehash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashingConfig {
    /// Memory cost in KiB
    pub memory_kib: u32,
    /// Number of passes over memory
    pub iterations: u32,
    /// Degree of parallelism
    pub parallelism: u32,
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            memory_kib: argon2::Params::DEFAULT_M_COST,
            iterations: argon2::Params::DEFAULT_T_COST,
            parallelism: argon2::Params::DEFAULT_P_COST,
        }
    }
}

impl HashingConfig {
    /// Load only the hashing parameters from environment variables.
    ///
    /// Used by tooling that hashes passwords without a database.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if a value is not a number or the
    /// combination is outside Argon2's limits.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load the hashing parameters from an arbitrary key/value source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if a value is not a number or the
    /// combination is outside Argon2's limits.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let hashing = Self {
            memory_kib: parse_or_default(&lookup, "PASSWORD_HASH_MEMORY_KIB", defaults.memory_kib)?,
            iterations: parse_or_default(&lookup, "PASSWORD_HASH_ITERATIONS", defaults.iterations)?,
            parallelism: parse_or_default(
                &lookup,
                "PASSWORD_HASH_PARALLELISM",
                defaults.parallelism,
            )?,
        };
        hashing.params().map_err(|e| {
            ConfigError::InvalidEnvVar("PASSWORD_HASH_*".to_string(), e.to_string())
        })?;

        Ok(hashing)
    }

    /// Build the Argon2 parameter set.
    ///
    /// # Errors
    ///
    /// Returns `argon2::Error` if the combination is outside Argon2's limits
    /// (for example less than 8 KiB of memory per lane).
    pub fn params(&self) -> Result<argon2::Params, argon2::Error> {
        argon2::Params::new(self.memory_kib, self.iterations, self.parallelism, None)
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key/value source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("STOREFRONT_DATABASE_URL")
            .or_else(|| lookup("DATABASE_URL"))
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingEnvVar("STOREFRONT_DATABASE_URL".to_string()))?;

        let max_connections = parse_or_default(&lookup, "STOREFRONT_DB_MAX_CONNECTIONS", 10)?;
        if max_connections == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "STOREFRONT_DB_MAX_CONNECTIONS".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        let hashing = HashingConfig::from_lookup(&lookup)?;

        Ok(Self {
            database_url,
            max_connections,
            hashing,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse a numeric variable, falling back to `default` when unset.
fn parse_or_default<F>(lookup: &F, key: &str, default: u32) -> Result<u32, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).map_or(Ok(default), |raw| {
        raw.trim()
            .parse::<u32>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}
