//! Agora Storefront session state library.
//!
//! Everything a storefront request handler needs to keep per-user state:
//!
//! - [`services::auth`] - Password login against the admin or customer namespace
//! - [`services::cart`] - Per-session shopping cart
//! - [`services::wishlist`] - Persistent wishlist with change notifications
//!
//! Rendering, routing and session cookies belong to the caller.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod models;
pub mod services;
