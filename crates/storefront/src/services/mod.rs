//! Business logic services for the storefront session core.
//!
//! # Services
//!
//! - [`password`] - Argon2id hashing with a tri-state verification result
//! - [`auth`] - Credential validation for the admin and customer namespaces
//! - [`cart`] - Per-session shopping cart
//! - [`wishlist`] - Persistent per-customer wishlist with change notifications

pub mod auth;
pub mod cart;
pub mod password;
pub mod wishlist;

pub use auth::{AuthError, AuthService, RehashRequest};
pub use cart::{Cart, CartLine};
pub use password::{PasswordError, PasswordVerifier, Verification};
pub use wishlist::{SubscriberError, SubscriptionId, WishlistError, WishlistService};
