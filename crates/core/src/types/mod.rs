//! Core types for Agora.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod item;
pub mod role;
pub mod username;

pub use id::*;
pub use item::ItemRef;
pub use role::Role;
pub use username::{Username, UsernameError};
