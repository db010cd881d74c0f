//! Integration tests for the wishlist service.
//!
//! The in-memory store yields before every operation, so concurrent callers
//! really do interleave at each await point unless the service serializes
//! them.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinSet;

use agora_core::ProductId;
use agora_integration_tests::{ChangeLog, StallingStore, catalog, item};
use agora_storefront::db::memory::MemoryWishlistStore;
use agora_storefront::models::ChangeKind;
use agora_storefront::services::WishlistService;

fn service() -> (WishlistService<MemoryWishlistStore>, MemoryWishlistStore) {
    let store = MemoryWishlistStore::with_products(catalog());
    (WishlistService::new(store.clone()), store)
}

// =============================================================================
// Concurrency
// =============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_adds_of_same_pair_commit_once() {
    let (wishlist, store) = service();
    let wishlist = Arc::new(wishlist);
    let log = ChangeLog::new();
    log.attach(&wishlist);
    let battery = item(42, "Battery", 4_800);

    let mut tasks = JoinSet::new();
    for _ in 0..16 {
        let wishlist = Arc::clone(&wishlist);
        let battery = battery.clone();
        tasks.spawn(async move { wishlist.add(Some(&battery), "client1").await });
    }

    let mut added = 0;
    while let Some(result) = tasks.join_next().await {
        if result.unwrap() {
            added += 1;
        }
    }

    assert_eq!(added, 1);
    assert_eq!(store.entries().len(), 1);
    assert_eq!(store.commit_count(), 1);
    assert_eq!(log.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_mixed_operations_all_complete() {
    let (wishlist, store) = service();
    let wishlist = Arc::new(wishlist);
    let owners = ["client1", "client2", "client3"];

    let mut tasks = JoinSet::new();
    for owner in owners {
        for product in catalog() {
            let wishlist = Arc::clone(&wishlist);
            tasks.spawn(async move {
                let added = wishlist.add(Some(&product), owner).await;
                let present = wishlist.is_present(product.id, owner).await;
                added && present
            });
        }
    }

    while let Some(result) = tasks.join_next().await {
        assert!(result.unwrap());
    }

    assert_eq!(store.entries().len(), owners.len() * catalog().len());
    for owner in owners {
        assert_eq!(
            wishlist.list_for_owner(owner).await.unwrap().len(),
            catalog().len()
        );
    }
}

// =============================================================================
// Cancellation
// =============================================================================

#[tokio::test]
async fn test_call_dropped_while_queued_changes_nothing() {
    let store = StallingStore::new(MemoryWishlistStore::with_products(catalog()));
    let wishlist = Arc::new(WishlistService::new(store.clone()));
    let log = ChangeLog::new();
    log.attach(&wishlist);

    // The first add holds the store until released
    store.stall_next_insert();
    let first = {
        let wishlist = Arc::clone(&wishlist);
        tokio::spawn(async move { wishlist.add(Some(&item(42, "Battery", 4_800)), "client1").await })
    };
    store.committed().await;

    let queued = {
        let wishlist = Arc::clone(&wishlist);
        tokio::spawn(async move { wishlist.add(Some(&item(6, "Lantern", 1_500)), "client1").await })
    };
    tokio::task::yield_now().await;
    queued.abort();
    assert!(queued.await.unwrap_err().is_cancelled());

    store.release();
    assert!(first.await.unwrap());

    assert!(!wishlist.is_present(ProductId::new(6), "client1").await);
    assert_eq!(store.inner().commit_count(), 1);
    assert_eq!(log.len(), 1);

    // The store was released by both calls
    assert!(wishlist.add(Some(&item(6, "Lantern", 1_500)), "client1").await);
    assert_eq!(log.len(), 2);
}

#[tokio::test]
async fn test_call_dropped_after_commit_still_notifies() {
    let store = StallingStore::new(MemoryWishlistStore::with_products(catalog()));
    let wishlist = Arc::new(WishlistService::new(store.clone()));
    let (tx, mut rx) = mpsc::unbounded_channel();
    wishlist.subscribe(move |change| tx.send(change.clone()).map_err(|e| e.to_string().into()));

    store.stall_next_insert();
    let caller = {
        let wishlist = Arc::clone(&wishlist);
        tokio::spawn(async move { wishlist.add(Some(&item(42, "Battery", 4_800)), "client1").await })
    };

    // Committed, but the store has not answered yet
    store.committed().await;
    caller.abort();
    assert!(caller.await.unwrap_err().is_cancelled());
    store.release();

    let change = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(change.kind, ChangeKind::Added);
    assert_eq!(change.product_id, ProductId::new(42));
    assert_eq!(change.owner, "client1");
    assert!(rx.try_recv().is_err());
    assert_eq!(store.inner().commit_count(), 1);

    assert!(wishlist.is_present(ProductId::new(42), "client1").await);
}

// =============================================================================
// Presence and listing
// =============================================================================

#[tokio::test]
async fn test_presence_agrees_with_listing() {
    let (wishlist, _) = service();
    let lantern = item(6, "Lantern", 1_500);

    assert!(!wishlist.is_present(lantern.id, "client1").await);

    wishlist.add(Some(&lantern), "client1").await;
    assert!(wishlist.is_present(lantern.id, "client1").await);
    let listed = wishlist.list_for_owner("client1").await.unwrap();
    assert!(listed.iter().any(|w| w.item.id == lantern.id));

    wishlist.remove(lantern.id, "client1").await;
    assert!(!wishlist.is_present(lantern.id, "client1").await);
    let listed = wishlist.list_for_owner("client1").await.unwrap();
    assert!(listed.iter().all(|w| w.item.id != lantern.id));
}

#[tokio::test]
async fn test_list_is_per_owner_and_ordered() {
    let (wishlist, _) = service();
    let products = catalog();

    for product in products.iter().rev() {
        wishlist.add(Some(product), "client1").await;
    }
    wishlist.add(Some(&products[0]), "client2").await;

    let listed = wishlist.list_for_owner("client1").await.unwrap();
    let ids: Vec<i32> = listed.iter().map(|w| w.item.id.as_i32()).collect();
    assert_eq!(ids, vec![42, 6, 1]);
    assert!(listed.windows(2).all(|w| w[0].entry.id < w[1].entry.id));
    assert!(listed.iter().all(|w| w.entry.owner == "client1"));

    assert_eq!(wishlist.list_for_owner("client2").await.unwrap().len(), 1);
    assert!(wishlist.list_for_owner("nobody").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_owner_is_case_sensitive() {
    let (wishlist, _) = service();
    wishlist.add(Some(&item(42, "Battery", 4_800)), "client1").await;

    assert!(!wishlist.is_present(ProductId::new(42), "Client1").await);
}

// =============================================================================
// Notifications
// =============================================================================

#[tokio::test]
async fn test_remove_of_missing_pair_is_silent() {
    let (wishlist, store) = service();
    let log = ChangeLog::new();
    log.attach(&wishlist);

    assert!(!wishlist.remove(ProductId::new(42), "client1").await);

    assert!(log.is_empty());
    assert_eq!(store.commit_count(), 0);
}

#[tokio::test]
async fn test_change_payloads() {
    let (wishlist, _) = service();
    let log = ChangeLog::new();
    log.attach(&wishlist);

    wishlist.add(Some(&item(6, "Lantern", 1_500)), "client2").await;
    wishlist.remove(ProductId::new(6), "client2").await;

    let changes = log.changes();
    assert_eq!(changes.len(), 2);
    assert_eq!(changes[0].kind, ChangeKind::Added);
    assert_eq!(changes[1].kind, ChangeKind::Removed);
    assert!(changes.iter().all(|c| c.product_id == ProductId::new(6)));
    assert!(changes.iter().all(|c| c.owner == "client2"));
}

#[tokio::test]
async fn test_failing_subscribers_do_not_break_writes() {
    let (wishlist, store) = service();
    wishlist.subscribe(|_| Err("smtp unavailable".into()));
    wishlist.subscribe(|_| panic!("subscriber bug"));
    let log = ChangeLog::new();
    log.attach(&wishlist);

    assert!(wishlist.add(Some(&item(42, "Battery", 4_800)), "client1").await);
    assert!(wishlist.remove(ProductId::new(42), "client1").await);

    assert_eq!(log.len(), 2);
    assert_eq!(store.commit_count(), 2);
    assert_eq!(wishlist.subscriber_count(), 3);
}

#[tokio::test]
async fn test_unsubscribe_stops_delivery() {
    let (wishlist, _) = service();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let id = wishlist.subscribe(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });

    wishlist.add(Some(&item(1, "Tent", 12_999)), "client1").await;
    assert!(wishlist.unsubscribe(id));
    assert!(!wishlist.unsubscribe(id));
    wishlist.remove(ProductId::new(1), "client1").await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(wishlist.subscriber_count(), 0);
}

// =============================================================================
// Store failures
// =============================================================================

#[tokio::test]
async fn test_commit_failure_returns_false_without_notification() {
    let (wishlist, store) = service();
    let log = ChangeLog::new();
    log.attach(&wishlist);
    let battery = item(42, "Battery", 4_800);

    store.fail_next_commit();
    assert!(!wishlist.add(Some(&battery), "client1").await);
    assert!(log.is_empty());
    assert!(store.entries().is_empty());

    // The permit was released and the next attempt succeeds
    assert!(wishlist.add(Some(&battery), "client1").await);
    assert_eq!(log.len(), 1);
}

#[tokio::test]
async fn test_remove_commit_failure_keeps_entry() {
    let (wishlist, store) = service();
    let log = ChangeLog::new();
    log.attach(&wishlist);
    wishlist.add(Some(&item(42, "Battery", 4_800)), "client1").await;

    store.fail_next_commit();
    assert!(!wishlist.remove(ProductId::new(42), "client1").await);

    assert!(wishlist.is_present(ProductId::new(42), "client1").await);
    assert_eq!(log.len(), 1);
}

#[tokio::test]
async fn test_unknown_product_is_not_added() {
    let (wishlist, store) = service();

    assert!(!wishlist.add(Some(&item(999, "Ghost", 100)), "client1").await);
    assert!(store.entries().is_empty());
}
