//! Change-notification registry for the wishlist service.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::models::WishlistChange;

/// Error a subscriber may return. It is logged and otherwise ignored.
pub type SubscriberError = Box<dyn std::error::Error + Send + Sync>;

type Callback = Arc<dyn Fn(&WishlistChange) -> Result<(), SubscriberError> + Send + Sync>;

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Default)]
pub(super) struct Subscribers {
    next_id: AtomicU64,
    entries: Mutex<Vec<(SubscriptionId, Callback)>>,
}

impl Subscribers {
    fn entries(&self) -> MutexGuard<'_, Vec<(SubscriptionId, Callback)>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(super) fn subscribe(&self, callback: Callback) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.entries().push((id, callback));
        id
    }

    pub(super) fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut entries = self.entries();
        let before = entries.len();
        entries.retain(|(existing, _)| *existing != id);
        entries.len() < before
    }

    pub(super) fn len(&self) -> usize {
        self.entries().len()
    }

    /// Deliver `change` to every subscriber registered right now.
    ///
    /// The registry lock is released before any callback runs, so a callback
    /// may subscribe or unsubscribe. A failing or panicking callback does not
    /// stop delivery to the rest.
    pub(super) fn notify(&self, change: &WishlistChange) {
        let snapshot: Vec<(SubscriptionId, Callback)> = self.entries().clone();

        for (id, callback) in snapshot {
            match catch_unwind(AssertUnwindSafe(|| callback(change))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    tracing::warn!(subscription = id.0, error = %e, "Wishlist subscriber failed");
                }
                Err(_) => {
                    tracing::warn!(subscription = id.0, "Wishlist subscriber panicked");
                }
            }
        }
    }
}

impl std::fmt::Debug for Subscribers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscribers")
            .field("count", &self.len())
            .finish_non_exhaustive()
    }
}
