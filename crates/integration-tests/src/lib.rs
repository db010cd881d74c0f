//! Integration tests for Agora.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p agora-integration-tests
//! ```
//!
//! The tests run against the in-memory stores from
//! `agora_storefront::db::memory`, so no database is required.
//!
//! # Test Categories
//!
//! - `auth` - Credential validation across both namespaces
//! - `wishlist` - Serialization, notifications and failure handling
//! - `session_flow` - Login, cart and wishlist used together

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use rust_decimal::Decimal;
use tokio::sync::Notify;

use agora_core::{AdminId, CustomerId, ItemRef, ProductId, Username, WishlistEntryId};
use agora_storefront::db::memory::{MemoryCredentialStore, MemoryWishlistStore};
use agora_storefront::db::{RepositoryError, WishlistStore};
use agora_storefront::models::{
    AdminAccount, CustomerAccount, WishlistChange, WishlistEntry, WishlistItem,
};
use agora_storefront::services::{PasswordVerifier, SubscriptionId, WishlistService};

/// A verifier with Argon2's minimum costs so tests stay fast.
#[must_use]
pub fn fast_verifier() -> PasswordVerifier {
    PasswordVerifier::with_cost(8, 1, 1).expect("minimum Argon2 parameters are valid")
}

/// Catalog item priced in cents.
#[must_use]
pub fn item(id: i32, name: &str, cents: i64) -> ItemRef {
    ItemRef::new(ProductId::new(id), name, Decimal::new(cents, 2))
}

/// A small catalog used across tests. Product 42 is the battery.
#[must_use]
pub fn catalog() -> Vec<ItemRef> {
    vec![
        item(1, "Tent", 12_999),
        item(6, "Lantern", 1_500),
        item(42, "Battery", 4_800),
    ]
}

/// Credential store seeded with one admin and two customers.
///
/// | username     | password  | namespace |
/// |--------------|-----------|-----------|
/// | `TechAdmin1` | `Admin#1` | admin     |
/// | `client1`    | `Secret#1`| customer  |
/// | `client2`    | `Secret#2`| customer  |
#[must_use]
pub fn seeded_credentials(verifier: &PasswordVerifier) -> MemoryCredentialStore {
    let store = MemoryCredentialStore::new();
    store.insert_admin(AdminAccount::new(
        AdminId::new(1),
        username("TechAdmin1"),
        hash(verifier, "Admin#1"),
    ));
    store.insert_customer(CustomerAccount::new(
        CustomerId::new(1),
        username("client1"),
        hash(verifier, "Secret#1"),
    ));
    store.insert_customer(CustomerAccount::new(
        CustomerId::new(2),
        username("client2"),
        hash(verifier, "Secret#2"),
    ));
    store
}

/// Parse a username known to be valid.
#[must_use]
pub fn username(raw: &str) -> Username {
    Username::parse(raw).expect("fixture usernames are valid")
}

fn hash(verifier: &PasswordVerifier, password: &str) -> String {
    verifier.hash(password).expect("hashing fixture password")
}

/// Records every wishlist change delivered to it.
#[derive(Clone, Default)]
pub struct ChangeLog {
    changes: Arc<Mutex<Vec<WishlistChange>>>,
}

impl ChangeLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe this log to `service`.
    pub fn attach<S: WishlistStore + 'static>(&self, service: &WishlistService<S>) -> SubscriptionId {
        let changes = Arc::clone(&self.changes);
        service.subscribe(move |change| {
            changes
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(change.clone());
            Ok(())
        })
    }

    /// Changes received so far, in delivery order.
    #[must_use]
    pub fn changes(&self) -> Vec<WishlistChange> {
        self.changes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.changes().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A wishlist store whose next insert commits and then waits to be released.
///
/// Models a database that has committed but not yet answered, so tests can
/// drop or hold a caller at exactly that point.
#[derive(Clone)]
pub struct StallingStore {
    inner: MemoryWishlistStore,
    armed: Arc<AtomicBool>,
    committed: Arc<Notify>,
    release: Arc<Notify>,
}

impl StallingStore {
    #[must_use]
    pub fn new(inner: MemoryWishlistStore) -> Self {
        Self {
            inner,
            armed: Arc::new(AtomicBool::new(false)),
            committed: Arc::new(Notify::new()),
            release: Arc::new(Notify::new()),
        }
    }

    /// Stall the next insert after its commit.
    pub fn stall_next_insert(&self) {
        self.armed.store(true, Ordering::SeqCst);
    }

    /// Wait until a stalled insert has committed.
    pub async fn committed(&self) {
        self.committed.notified().await;
    }

    /// Let the stalled insert return.
    pub fn release(&self) {
        self.release.notify_one();
    }

    #[must_use]
    pub const fn inner(&self) -> &MemoryWishlistStore {
        &self.inner
    }
}

impl WishlistStore for StallingStore {
    async fn list_for_owner(&mut self, owner: &str) -> Result<Vec<WishlistItem>, RepositoryError> {
        self.inner.list_for_owner(owner).await
    }

    async fn contains(&mut self, product_id: ProductId, owner: &str) -> Result<bool, RepositoryError> {
        self.inner.contains(product_id, owner).await
    }

    async fn find(
        &mut self,
        product_id: ProductId,
        owner: &str,
    ) -> Result<Option<WishlistEntry>, RepositoryError> {
        self.inner.find(product_id, owner).await
    }

    async fn insert(
        &mut self,
        product_id: ProductId,
        owner: &str,
    ) -> Result<WishlistEntry, RepositoryError> {
        let entry = self.inner.insert(product_id, owner).await?;
        if self.armed.swap(false, Ordering::SeqCst) {
            self.committed.notify_one();
            self.release.notified().await;
        }
        Ok(entry)
    }

    async fn delete(&mut self, id: WishlistEntryId) -> Result<bool, RepositoryError> {
        self.inner.delete(id).await
    }
}
