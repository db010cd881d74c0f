//! Wishlist service.
//!
//! Owns the single wishlist store handle and serializes every operation on
//! it through an async mutex, so concurrent requests queue in FIFO order
//! instead of interleaving on the connection. After each committed mutation,
//! once the handle is released, registered subscribers receive a
//! [`WishlistChange`].
//!
//! A mutation dropped while waiting for the handle does nothing. Once it holds
//! the handle, the store calls and the notification run on a spawned task, so
//! dropping the caller cannot separate a commit from its notification.
//!
//! Mutations and presence checks report store failures as `false` after
//! logging them. Only [`WishlistService::list_for_owner`] returns an error.

mod subscribers;

pub use subscribers::{SubscriberError, SubscriptionId};

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{Instrument as _, instrument};

use agora_core::{ItemRef, ProductId};

use self::subscribers::Subscribers;
use crate::db::{RepositoryError, WishlistStore};
use crate::models::{ChangeKind, WishlistChange, WishlistItem};

/// Errors returned when listing a wishlist.
#[derive(Debug, Error)]
pub enum WishlistError {
    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Persistent per-customer wishlist.
#[derive(Debug)]
pub struct WishlistService<S> {
    store: Arc<Mutex<S>>,
    subscribers: Arc<Subscribers>,
}

impl<S: WishlistStore + 'static> WishlistService<S> {
    /// Create a service that owns `store`.
    #[must_use]
    pub fn new(store: S) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            subscribers: Arc::default(),
        }
    }

    /// Release the store handle.
    ///
    /// Returns `None` while a mutation whose caller went away is still
    /// finishing in the background.
    pub fn into_inner(self) -> Option<S> {
        Arc::try_unwrap(self.store).ok().map(Mutex::into_inner)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// All wishlist entries of `owner` with their items, ordered by entry ID.
    ///
    /// A blank owner has an empty wishlist and the store is not consulted.
    ///
    /// # Errors
    ///
    /// Returns `WishlistError::Repository` if the query fails.
    #[instrument(skip(self))]
    pub async fn list_for_owner(&self, owner: &str) -> Result<Vec<WishlistItem>, WishlistError> {
        if owner.trim().is_empty() {
            return Ok(Vec::new());
        }

        let mut store = self.store.lock().await;
        let items = store.list_for_owner(owner).await?;
        Ok(items)
    }

    /// Whether `owner` has `product_id` on their wishlist.
    #[instrument(skip(self))]
    pub async fn is_present(&self, product_id: ProductId, owner: &str) -> bool {
        if owner.trim().is_empty() {
            return false;
        }

        let mut store = self.store.lock().await;
        store.contains(product_id, owner).await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Wishlist presence check failed");
            false
        })
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add `item` to the wishlist of `owner`.
    ///
    /// Returns `true` only if a new entry was committed. A missing item, a
    /// blank owner, an existing entry and a failed commit all return `false`
    /// and notify no one.
    #[instrument(skip(self, item), fields(product_id = item.map(|i| i.id.as_i32())))]
    pub async fn add(&self, item: Option<&ItemRef>, owner: &str) -> bool {
        let Some(item) = item else {
            return false;
        };
        if owner.trim().is_empty() {
            return false;
        }

        self.mutate(ChangeKind::Added, item.id, owner).await
    }

    /// Remove `product_id` from the wishlist of `owner`.
    ///
    /// Returns `true` only if an entry was deleted and committed.
    #[instrument(skip(self))]
    pub async fn remove(&self, product_id: ProductId, owner: &str) -> bool {
        if owner.trim().is_empty() {
            return false;
        }

        self.mutate(ChangeKind::Removed, product_id, owner).await
    }

    /// Take the store, then finish the mutation and its notification on a
    /// task of its own.
    ///
    /// Nothing may be awaited between acquiring the guard and spawning.
    async fn mutate(&self, kind: ChangeKind, product_id: ProductId, owner: &str) -> bool {
        let store = Arc::clone(&self.store).lock_owned().await;
        let subscribers = Arc::clone(&self.subscribers);
        let owner = owner.to_owned();

        let task = tokio::spawn(
            async move {
                let result = match kind {
                    ChangeKind::Added => insert_if_absent(store, product_id, &owner).await,
                    ChangeKind::Removed => delete_if_present(store, product_id, &owner).await,
                };

                match result {
                    Ok(true) => {
                        tracing::debug!(?kind, %product_id, "Wishlist changed");
                        subscribers.notify(&WishlistChange {
                            kind,
                            product_id,
                            owner,
                        });
                        true
                    }
                    Ok(false) => false,
                    Err(e) => {
                        tracing::warn!(error = %e, ?kind, "Wishlist mutation failed");
                        false
                    }
                }
            }
            .in_current_span(),
        );

        task.await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, ?kind, "Wishlist mutation task failed");
            false
        })
    }

    // =========================================================================
    // Subscribers
    // =========================================================================

    /// Register a callback for committed changes.
    ///
    /// Callbacks run on the task that committed the change, after the store
    /// has been released, even if the caller has since gone away. Errors and panics are logged and contained.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&WishlistChange) -> Result<(), SubscriberError> + Send + Sync + 'static,
    {
        self.subscribers.subscribe(Arc::new(callback))
    }

    /// Remove a callback. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    /// Number of registered callbacks.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

/// Check and insert; the store is released on return.
async fn insert_if_absent<S: WishlistStore>(
    mut store: OwnedMutexGuard<S>,
    product_id: ProductId,
    owner: &str,
) -> Result<bool, RepositoryError> {
    if store.contains(product_id, owner).await? {
        return Ok(false);
    }
    store.insert(product_id, owner).await?;
    Ok(true)
}

/// Find and delete; the store is released on return.
async fn delete_if_present<S: WishlistStore>(
    mut store: OwnedMutexGuard<S>,
    product_id: ProductId,
    owner: &str,
) -> Result<bool, RepositoryError> {
    let Some(entry) = store.find(product_id, owner).await? else {
        return Ok(false);
    };
    store.delete(entry.id).await
}
