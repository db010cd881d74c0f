//! Role claims carried by an authenticated identity.

use serde::{Deserialize, Serialize};

/// Role of an authenticated principal.
///
/// Administrators and customers live in separate credential namespaces;
/// the role records which namespace a login was verified against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Back-office staff managing the catalog.
    Admin,
    /// Shopper with a customer account.
    Client,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::Client => write!(f, "client"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "client" => Ok(Self::Client),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}
