//! Database operations for the storefront `PostgreSQL` schema.
//!
//! ## Tables
//!
//! - `storefront.admin` - Administrator credentials
//! - `storefront.customer` - Customer credentials
//! - `storefront.product` - Catalog items referenced by wishlists
//! - `storefront.wishlist_item` - One row per (product, customer) pair
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p agora-cli -- migrate
//! ```

pub mod credentials;
#[cfg(any(test, feature = "test-util"))]
pub mod memory;
pub mod products;
pub mod wishlist;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Connection, PgConnection, PgPool};
use thiserror::Error;

pub use credentials::{CredentialStore, PgCredentialStore};
pub use products::ProductRepository;
pub use wishlist::{PgWishlistStore, WishlistStore};

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate wishlist entry).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool for concurrent read queries.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(
    database_url: &secrecy::SecretString,
    max_connections: u32,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Open a single dedicated connection.
///
/// Used for the wishlist handle, which must only ever run one statement at a
/// time.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn connect(database_url: &secrecy::SecretString) -> Result<PgConnection, sqlx::Error> {
    PgConnection::connect(database_url.expose_secret()).await
}

/// Map a failed write to `Conflict` when a constraint rejected it.
fn constraint_error(err: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err
        && (db_err.is_unique_violation() || db_err.is_foreign_key_violation())
    {
        return RepositoryError::Conflict(format!("{what}: {}", db_err.message()));
    }
    RepositoryError::Database(err)
}
