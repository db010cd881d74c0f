//! Agora Core - Shared types library.
//!
//! This crate provides the types shared by the Agora components:
//! - `storefront` - Session state services (auth, cart, wishlist)
//! - `cli` - Command-line tools for migrations and administration
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access.
//! Database encoding is opt-in through the `postgres` feature.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, usernames, roles and catalog item snapshots

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
