//! Credential records and authenticated identities.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use agora_core::{AdminId, CustomerId, Role, Username};

/// A credential record from one login namespace.
///
/// Implemented once per namespace. The implementing type picks both the
/// table a lookup reads and the role claim a successful login carries.
pub trait Account: Send + Sync + Sized {
    /// Role granted by a successful login against this namespace.
    const ROLE: Role;

    /// Login identifier, unique within the namespace.
    fn username(&self) -> &Username;

    /// Stored PHC-format password hash.
    fn password_hash(&self) -> &str;
}

/// An administrator credential record.
#[derive(Debug, Clone)]
pub struct AdminAccount {
    /// Database ID.
    pub id: AdminId,
    /// Login identifier.
    pub username: Username,
    /// Stored password hash.
    pub password_hash: SecretString,
}

impl AdminAccount {
    /// Create an admin record.
    #[must_use]
    pub fn new(id: AdminId, username: Username, password_hash: impl Into<String>) -> Self {
        Self {
            id,
            username,
            password_hash: SecretString::from(password_hash.into()),
        }
    }
}

impl Account for AdminAccount {
    const ROLE: Role = Role::Admin;

    fn username(&self) -> &Username {
        &self.username
    }

    fn password_hash(&self) -> &str {
        self.password_hash.expose_secret()
    }
}

/// A customer credential record.
#[derive(Debug, Clone)]
pub struct CustomerAccount {
    /// Database ID.
    pub id: CustomerId,
    /// Login identifier.
    pub username: Username,
    /// Stored password hash.
    pub password_hash: SecretString,
}

impl CustomerAccount {
    /// Create a customer record.
    #[must_use]
    pub fn new(id: CustomerId, username: Username, password_hash: impl Into<String>) -> Self {
        Self {
            id,
            username,
            password_hash: SecretString::from(password_hash.into()),
        }
    }
}

impl Account for CustomerAccount {
    const ROLE: Role = Role::Client;

    fn username(&self) -> &Username {
        &self.username
    }

    fn password_hash(&self) -> &str {
        self.password_hash.expose_secret()
    }
}

/// The principal produced by a successful login.
///
/// Never persisted by the core; the caller decides how to carry it between
/// requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Login identifier the credentials were checked against.
    pub username: Username,
    /// Namespace the login was verified in.
    pub role: Role,
}

impl Identity {
    /// Whether this identity may use back-office features.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Whether this identity is a shopper.
    #[must_use]
    pub fn is_client(&self) -> bool {
        self.role == Role::Client
    }
}
