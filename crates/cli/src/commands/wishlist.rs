//! Wishlist management commands.
//!
//! # Usage
//!
//! ```bash
//! agora-cli wishlist list --owner client1
//! agora-cli wishlist add --owner client1 --product 42
//! agora-cli wishlist check --owner client1 --product 42
//! agora-cli wishlist remove --owner client1 --product 42
//! ```
//!
//! Each command opens one dedicated connection for the wishlist handle and
//! logs change notifications as they are delivered.

use thiserror::Error;

use agora_core::ProductId;
use agora_storefront::config::{ConfigError, StorefrontConfig};
use agora_storefront::db::{self, PgWishlistStore, ProductRepository, RepositoryError};
use agora_storefront::services::{WishlistError, WishlistService};

/// Errors that can occur during wishlist commands.
#[derive(Debug, Error)]
pub enum WishlistCommandError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Database connection error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Catalog lookup failed.
    #[error("Catalog error: {0}")]
    Repository(#[from] RepositoryError),

    /// Listing failed.
    #[error(transparent)]
    Wishlist(#[from] WishlistError),

    /// Output encoding failed.
    #[error("Failed to encode wishlist: {0}")]
    Encode(#[from] serde_json::Error),
}

async fn open() -> Result<(StorefrontConfig, WishlistService<PgWishlistStore>), WishlistCommandError>
{
    let config = StorefrontConfig::from_env()?;

    tracing::info!("Connecting to storefront database...");
    let conn = db::connect(&config.database_url).await?;
    let service = WishlistService::new(PgWishlistStore::new(conn));
    service.subscribe(|change| {
        tracing::info!(
            kind = ?change.kind,
            product_id = %change.product_id,
            owner = %change.owner,
            "Wishlist change committed"
        );
        Ok(())
    });

    Ok((config, service))
}

/// Print a customer's wishlist as JSON.
pub async fn list(owner: &str) -> Result<(), WishlistCommandError> {
    let (_, service) = open().await?;
    let items = service.list_for_owner(owner).await?;
    let output = serde_json::to_string_pretty(&items)?;

    #[allow(clippy::print_stdout)]
    {
        println!("{output}");
    }

    Ok(())
}

/// Add a catalog product to a customer's wishlist.
pub async fn add(owner: &str, product_id: ProductId) -> Result<(), WishlistCommandError> {
    let (config, service) = open().await?;

    let pool = db::create_pool(&config.database_url, 1).await?;
    let item = ProductRepository::new(&pool).get_by_id(product_id).await?;
    if item.is_none() {
        tracing::warn!(%product_id, "Product not found in catalog");
    }

    let added = service.add(item.as_ref(), owner).await;

    #[allow(clippy::print_stdout)]
    {
        println!("{}", if added { "added" } else { "unchanged" });
    }

    Ok(())
}

/// Remove a product from a customer's wishlist.
pub async fn remove(owner: &str, product_id: ProductId) -> Result<(), WishlistCommandError> {
    let (_, service) = open().await?;
    let removed = service.remove(product_id, owner).await;

    #[allow(clippy::print_stdout)]
    {
        println!("{}", if removed { "removed" } else { "unchanged" });
    }

    Ok(())
}

/// Report whether a product is on a customer's wishlist.
pub async fn check(owner: &str, product_id: ProductId) -> Result<(), WishlistCommandError> {
    let (_, service) = open().await?;
    let present = service.is_present(product_id, owner).await;

    #[allow(clippy::print_stdout)]
    {
        println!("{present}");
    }

    Ok(())
}
