//! Catalog lookups.
//!
//! The catalog itself is managed elsewhere; the session core only needs to
//! take item snapshots from it.

use rust_decimal::Decimal;
use sqlx::PgPool;

use agora_core::{ItemRef, ProductId};

use super::RepositoryError;

/// Internal row type for catalog queries.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    price: Decimal,
}

impl From<ProductRow> for ItemRef {
    fn from(row: ProductRow) -> Self {
        Self::new(row.id, row.name, row.price)
    }
}

/// Repository for catalog reads.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Snapshot a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ProductId) -> Result<Option<ItemRef>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, price
            FROM storefront.product
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(ItemRef::from))
    }
}
