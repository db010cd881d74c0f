//! Credential lookups for the admin and customer namespaces.

use std::future::Future;

use sqlx::PgPool;

use agora_core::{AdminId, CustomerId, Username};

use super::RepositoryError;
use crate::models::{Account, AdminAccount, CustomerAccount};

/// Keyed lookup of credential records of type `A`.
///
/// A store implements this once per namespace it can serve. Because the
/// record type selects the implementation, an admin lookup can never return
/// a customer record or the other way around.
pub trait CredentialStore<A: Account>: Send + Sync {
    /// Find the record whose identifier equals `username` exactly.
    fn find_account(
        &self,
        username: &Username,
    ) -> impl Future<Output = Result<Option<A>, RepositoryError>> + Send;
}

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type shared by both credential tables.
#[derive(Debug, sqlx::FromRow)]
struct AccountRow {
    id: i32,
    username: String,
    password_hash: String,
}

impl AccountRow {
    fn parse_username(&self) -> Result<Username, RepositoryError> {
        Username::parse(&self.username).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid username in database: {e}"))
        })
    }
}

impl TryFrom<AccountRow> for AdminAccount {
    type Error = RepositoryError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        let username = row.parse_username()?;
        Ok(Self::new(AdminId::new(row.id), username, row.password_hash))
    }
}

impl TryFrom<AccountRow> for CustomerAccount {
    type Error = RepositoryError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        let username = row.parse_username()?;
        Ok(Self::new(CustomerId::new(row.id), username, row.password_hash))
    }
}

// =============================================================================
// Repository
// =============================================================================

/// `PostgreSQL` credential store serving both namespaces.
///
/// Lookups are read-only and go through the pool, so they may run
/// concurrently with each other and with wishlist operations.
#[derive(Debug, Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    /// Create a new credential store.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl CredentialStore<AdminAccount> for PgCredentialStore {
    async fn find_account(
        &self,
        username: &Username,
    ) -> Result<Option<AdminAccount>, RepositoryError> {
        let row = sqlx::query_as::<_, AccountRow>(
            r"
            SELECT id, username, password_hash
            FROM storefront.admin
            WHERE username = $1
            ",
        )
        .bind(username.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }
}

impl CredentialStore<CustomerAccount> for PgCredentialStore {
    async fn find_account(
        &self,
        username: &Username,
    ) -> Result<Option<CustomerAccount>, RepositoryError> {
        let row = sqlx::query_as::<_, AccountRow>(
            r"
            SELECT id, username, password_hash
            FROM storefront.customer
            WHERE username = $1
            ",
        )
        .bind(username.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }
}
