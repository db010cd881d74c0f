//! Domain models for the storefront session core.
//!
//! These types represent validated domain objects separate from database
//! row types.

pub mod account;
pub mod wishlist;

pub use account::{Account, AdminAccount, CustomerAccount, Identity};
pub use wishlist::{ChangeKind, WishlistChange, WishlistEntry, WishlistItem};
