//! Catalog item snapshots.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ProductId;

/// Snapshot of the catalog fields needed to price and display an item.
///
/// Copied from the catalog when the item is added to a cart or resolved for a
/// wishlist. A later price change in the catalog does not touch snapshots that
/// were already taken.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRef {
    /// Catalog product ID.
    pub id: ProductId,
    /// Display name at snapshot time.
    pub name: String,
    /// Price of a single unit at snapshot time.
    pub unit_price: Decimal,
}

impl ItemRef {
    /// Create a new item snapshot.
    #[must_use]
    pub fn new(id: ProductId, name: impl Into<String>, unit_price: Decimal) -> Self {
        Self {
            id,
            name: name.into(),
            unit_price,
        }
    }
}
