//! Wishlist persistence.
//!
//! [`WishlistStore`] is the handle the wishlist service serializes access to.
//! Every method takes `&mut self`: a handle runs one operation at a time and
//! sharing it between tasks requires an outside lock.

use std::future::Future;

use rust_decimal::Decimal;
use sqlx::PgConnection;

use agora_core::{ItemRef, ProductId, WishlistEntryId};

use super::{RepositoryError, constraint_error};
use crate::models::{WishlistEntry, WishlistItem};

/// Transactional wishlist storage.
///
/// `insert` and `delete` each commit before returning. A future dropped while
/// a statement is in flight may or may not have committed, so callers that
/// report changes must drive every call to completion. The wishlist service
/// does this by finishing each mutation on a task of its own once it holds
/// the handle.
pub trait WishlistStore: Send {
    /// All entries owned by `owner`, each with its product resolved, ordered by
    /// entry ID.
    fn list_for_owner(
        &mut self,
        owner: &str,
    ) -> impl Future<Output = Result<Vec<WishlistItem>, RepositoryError>> + Send;

    /// Whether an entry exists for the pair.
    fn contains(
        &mut self,
        product_id: ProductId,
        owner: &str,
    ) -> impl Future<Output = Result<bool, RepositoryError>> + Send;

    /// The entry for the pair, if any.
    fn find(
        &mut self,
        product_id: ProductId,
        owner: &str,
    ) -> impl Future<Output = Result<Option<WishlistEntry>, RepositoryError>> + Send;

    /// Insert and commit a new entry.
    ///
    /// Fails with `RepositoryError::Conflict` when the pair already exists or
    /// the product is unknown.
    fn insert(
        &mut self,
        product_id: ProductId,
        owner: &str,
    ) -> impl Future<Output = Result<WishlistEntry, RepositoryError>> + Send;

    /// Delete and commit an entry. Returns `false` if it was already gone.
    fn delete(
        &mut self,
        id: WishlistEntryId,
    ) -> impl Future<Output = Result<bool, RepositoryError>> + Send;
}

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct EntryRow {
    id: WishlistEntryId,
    product_id: ProductId,
    customer_username: String,
}

impl From<EntryRow> for WishlistEntry {
    fn from(row: EntryRow) -> Self {
        Self {
            id: row.id,
            product_id: row.product_id,
            owner: row.customer_username,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct EntryWithProductRow {
    id: WishlistEntryId,
    product_id: ProductId,
    customer_username: String,
    name: String,
    price: Decimal,
}

impl From<EntryWithProductRow> for WishlistItem {
    fn from(row: EntryWithProductRow) -> Self {
        Self {
            item: ItemRef::new(row.product_id, row.name, row.price),
            entry: WishlistEntry {
                id: row.id,
                product_id: row.product_id,
                owner: row.customer_username,
            },
        }
    }
}

// =============================================================================
// Store
// =============================================================================

/// Wishlist store backed by one dedicated `PostgreSQL` connection.
pub struct PgWishlistStore {
    conn: PgConnection,
}

impl PgWishlistStore {
    /// Wrap an open connection.
    #[must_use]
    pub const fn new(conn: PgConnection) -> Self {
        Self { conn }
    }
}

impl WishlistStore for PgWishlistStore {
    async fn list_for_owner(&mut self, owner: &str) -> Result<Vec<WishlistItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, EntryWithProductRow>(
            r"
            SELECT w.id, w.product_id, w.customer_username, p.name, p.price
            FROM storefront.wishlist_item w
            JOIN storefront.product p ON p.id = w.product_id
            WHERE w.customer_username = $1
            ORDER BY w.id ASC
            ",
        )
        .bind(owner)
        .fetch_all(&mut self.conn)
        .await?;

        Ok(rows.into_iter().map(WishlistItem::from).collect())
    }

    async fn contains(&mut self, product_id: ProductId, owner: &str) -> Result<bool, RepositoryError> {
        let exists = sqlx::query_scalar::<_, bool>(
            r"
            SELECT EXISTS (
                SELECT 1 FROM storefront.wishlist_item
                WHERE product_id = $1 AND customer_username = $2
            )
            ",
        )
        .bind(product_id)
        .bind(owner)
        .fetch_one(&mut self.conn)
        .await?;

        Ok(exists)
    }

    async fn find(
        &mut self,
        product_id: ProductId,
        owner: &str,
    ) -> Result<Option<WishlistEntry>, RepositoryError> {
        let row = sqlx::query_as::<_, EntryRow>(
            r"
            SELECT id, product_id, customer_username
            FROM storefront.wishlist_item
            WHERE product_id = $1 AND customer_username = $2
            ",
        )
        .bind(product_id)
        .bind(owner)
        .fetch_optional(&mut self.conn)
        .await?;

        Ok(row.map(WishlistEntry::from))
    }

    async fn insert(
        &mut self,
        product_id: ProductId,
        owner: &str,
    ) -> Result<WishlistEntry, RepositoryError> {
        let row = sqlx::query_as::<_, EntryRow>(
            r"
            INSERT INTO storefront.wishlist_item (product_id, customer_username)
            VALUES ($1, $2)
            RETURNING id, product_id, customer_username
            ",
        )
        .bind(product_id)
        .bind(owner)
        .fetch_one(&mut self.conn)
        .await
        .map_err(|e| constraint_error(e, "wishlist insert rejected"))?;

        Ok(row.into())
    }

    async fn delete(&mut self, id: WishlistEntryId) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM storefront.wishlist_item
            WHERE id = $1
            ",
        )
        .bind(id)
        .execute(&mut self.conn)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
