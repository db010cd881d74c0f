//! In-memory store implementations for testing.
//!
//! Enabled with the `test-util` feature. Both stores are cheap to clone and
//! clones share state, so a test can keep one handle for assertions while
//! the service under test owns another.
//!
//! # Example
//!
//! ```ignore
//! let store = MemoryWishlistStore::with_products([item.clone()]);
//! let wishlist = WishlistService::new(store.clone());
//! wishlist.add(Some(&item), "client1").await;
//! assert_eq!(store.entries().len(), 1);
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use agora_core::{ItemRef, ProductId, Username, WishlistEntryId};

use super::RepositoryError;
use super::credentials::CredentialStore;
use super::wishlist::WishlistStore;
use crate::models::{AdminAccount, CustomerAccount, WishlistEntry, WishlistItem};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// =============================================================================
// Wishlist
// =============================================================================

/// In-memory wishlist store with a product catalog for join resolution.
///
/// Every operation yields to the scheduler before touching state, so
/// unsynchronized callers would interleave between a check and a write.
#[derive(Clone, Default)]
pub struct MemoryWishlistStore {
    inner: Arc<Mutex<WishlistInner>>,
}

#[derive(Default)]
struct WishlistInner {
    products: HashMap<ProductId, ItemRef>,
    entries: Vec<WishlistEntry>,
    next_id: i32,
    fail_next_commit: bool,
    commits: usize,
    operations: usize,
}

impl MemoryWishlistStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store whose catalog holds `products`.
    #[must_use]
    pub fn with_products(products: impl IntoIterator<Item = ItemRef>) -> Self {
        let store = Self::new();
        for item in products {
            store.insert_product(item);
        }
        store
    }

    /// Add or replace a catalog product.
    pub fn insert_product(&self, item: ItemRef) {
        lock(&self.inner).products.insert(item.id, item);
    }

    /// Snapshot of all persisted entries, in insertion order.
    #[must_use]
    pub fn entries(&self) -> Vec<WishlistEntry> {
        lock(&self.inner).entries.clone()
    }

    /// Make the next `insert` or `delete` fail as a rejected commit.
    pub fn fail_next_commit(&self) {
        lock(&self.inner).fail_next_commit = true;
    }

    /// Number of successful commits.
    #[must_use]
    pub fn commit_count(&self) -> usize {
        lock(&self.inner).commits
    }

    /// Number of store operations of any kind.
    #[must_use]
    pub fn operation_count(&self) -> usize {
        lock(&self.inner).operations
    }

    fn state(&self) -> MutexGuard<'_, WishlistInner> {
        let mut inner = lock(&self.inner);
        inner.operations += 1;
        inner
    }
}

impl WishlistInner {
    fn position(&self, product_id: ProductId, owner: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.product_id == product_id && e.owner == owner)
    }

    fn take_injected_failure(&mut self) -> Result<(), RepositoryError> {
        if std::mem::take(&mut self.fail_next_commit) {
            return Err(RepositoryError::Conflict("injected commit failure".to_owned()));
        }
        Ok(())
    }
}

impl WishlistStore for MemoryWishlistStore {
    async fn list_for_owner(&mut self, owner: &str) -> Result<Vec<WishlistItem>, RepositoryError> {
        tokio::task::yield_now().await;
        let inner = self.state();

        let mut items = inner
            .entries
            .iter()
            .filter(|e| e.owner == owner)
            .map(|entry| {
                let item = inner.products.get(&entry.product_id).cloned().ok_or_else(|| {
                    RepositoryError::DataCorruption(format!(
                        "wishlist entry {} references missing product {}",
                        entry.id, entry.product_id
                    ))
                })?;
                Ok(WishlistItem {
                    entry: entry.clone(),
                    item,
                })
            })
            .collect::<Result<Vec<_>, RepositoryError>>()?;
        items.sort_by_key(|i| i.entry.id);

        Ok(items)
    }

    async fn contains(&mut self, product_id: ProductId, owner: &str) -> Result<bool, RepositoryError> {
        tokio::task::yield_now().await;
        Ok(self.state().position(product_id, owner).is_some())
    }

    async fn find(
        &mut self,
        product_id: ProductId,
        owner: &str,
    ) -> Result<Option<WishlistEntry>, RepositoryError> {
        tokio::task::yield_now().await;
        let inner = self.state();
        Ok(inner
            .position(product_id, owner)
            .and_then(|i| inner.entries.get(i).cloned()))
    }

    async fn insert(
        &mut self,
        product_id: ProductId,
        owner: &str,
    ) -> Result<WishlistEntry, RepositoryError> {
        tokio::task::yield_now().await;
        let mut inner = self.state();
        inner.take_injected_failure()?;

        if !inner.products.contains_key(&product_id) {
            return Err(RepositoryError::Conflict(format!(
                "unknown product {product_id}"
            )));
        }
        if inner.position(product_id, owner).is_some() {
            return Err(RepositoryError::Conflict(format!(
                "duplicate wishlist entry for product {product_id}"
            )));
        }

        inner.next_id += 1;
        let entry = WishlistEntry {
            id: WishlistEntryId::new(inner.next_id),
            product_id,
            owner: owner.to_owned(),
        };
        inner.entries.push(entry.clone());
        inner.commits += 1;

        Ok(entry)
    }

    async fn delete(&mut self, id: WishlistEntryId) -> Result<bool, RepositoryError> {
        tokio::task::yield_now().await;
        let mut inner = self.state();
        inner.take_injected_failure()?;

        let before = inner.entries.len();
        inner.entries.retain(|e| e.id != id);
        let removed = inner.entries.len() < before;
        if removed {
            inner.commits += 1;
        }

        Ok(removed)
    }
}

// =============================================================================
// Credentials
// =============================================================================

/// In-memory credential store with separate admin and customer namespaces.
///
/// Counts every lookup so tests can assert that rejected input never reached
/// the store.
#[derive(Clone, Default)]
pub struct MemoryCredentialStore {
    admins: Arc<Mutex<HashMap<String, AdminAccount>>>,
    customers: Arc<Mutex<HashMap<String, CustomerAccount>>>,
    lookups: Arc<AtomicUsize>,
    unavailable: Arc<AtomicBool>,
}

impl MemoryCredentialStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an admin record.
    pub fn insert_admin(&self, account: AdminAccount) {
        lock(&self.admins).insert(account.username.as_str().to_owned(), account);
    }

    /// Add or replace a customer record.
    pub fn insert_customer(&self, account: CustomerAccount) {
        lock(&self.customers).insert(account.username.as_str().to_owned(), account);
    }

    /// Number of lookups served so far, across both namespaces.
    #[must_use]
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    /// Make every subsequent lookup fail as if the database were down.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn begin_lookup(&self) -> Result<(), RepositoryError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

impl CredentialStore<AdminAccount> for MemoryCredentialStore {
    async fn find_account(
        &self,
        username: &Username,
    ) -> Result<Option<AdminAccount>, RepositoryError> {
        self.begin_lookup()?;
        Ok(lock(&self.admins).get(username.as_str()).cloned())
    }
}

impl CredentialStore<CustomerAccount> for MemoryCredentialStore {
    async fn find_account(
        &self,
        username: &Username,
    ) -> Result<Option<CustomerAccount>, RepositoryError> {
        self.begin_lookup()?;
        Ok(lock(&self.customers).get(username.as_str()).cloned())
    }
}
