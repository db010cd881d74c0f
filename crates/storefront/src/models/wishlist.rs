//! Wishlist domain types.

use serde::Serialize;

use agora_core::{ItemRef, ProductId, WishlistEntryId};

/// A persisted wishlist row.
///
/// At most one entry exists per (`product_id`, `owner`) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WishlistEntry {
    /// Store-assigned ID.
    pub id: WishlistEntryId,
    /// Wished-for product.
    pub product_id: ProductId,
    /// Username of the customer who owns the entry.
    pub owner: String,
}

/// A wishlist entry together with its resolved catalog item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WishlistItem {
    /// The persisted entry.
    pub entry: WishlistEntry,
    /// Current catalog snapshot of the referenced product.
    pub item: ItemRef,
}

/// What a successful wishlist mutation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Added,
    Removed,
}

/// Change notification delivered to wishlist subscribers after commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WishlistChange {
    /// Kind of mutation.
    pub kind: ChangeKind,
    /// Product that was added or removed.
    pub product_id: ProductId,
    /// Owner whose wishlist changed.
    pub owner: String,
}
