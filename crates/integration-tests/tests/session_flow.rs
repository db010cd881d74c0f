//! End-to-end session flows: log in, fill a cart, keep a wishlist.

#![allow(clippy::unwrap_used)]

use rust_decimal::Decimal;

use agora_core::ProductId;
use agora_integration_tests::{ChangeLog, catalog, fast_verifier, item, seeded_credentials};
use agora_storefront::db::memory::MemoryWishlistStore;
use agora_storefront::services::{AuthService, Cart, WishlistService};

#[tokio::test]
async fn test_client_wishlist_round_trip() {
    let wishlist = WishlistService::new(MemoryWishlistStore::with_products(catalog()));
    let log = ChangeLog::new();
    log.attach(&wishlist);
    let battery = item(42, "Battery", 4_800);

    assert!(wishlist.add(Some(&battery), "client1").await);
    assert_eq!(log.len(), 1);

    assert!(!wishlist.add(Some(&battery), "client1").await);
    assert_eq!(log.len(), 1);

    let listed = wishlist.list_for_owner("client1").await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].entry.product_id, ProductId::new(42));
    assert_eq!(listed[0].item, battery);

    assert!(wishlist.remove(ProductId::new(42), "client1").await);
    assert_eq!(log.len(), 2);

    assert!(wishlist.list_for_owner("client1").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_login_then_shop() {
    let verifier = fast_verifier();
    let auth = AuthService::new(seeded_credentials(&verifier), verifier);
    let wishlist = WishlistService::new(MemoryWishlistStore::with_products(catalog()));

    let identity = auth.validate_customer("client1", "Secret#1").await.unwrap();
    assert!(identity.is_client());
    let owner = identity.username.as_str();

    let mut cart = Cart::new();
    let tent = item(1, "Tent", 12_999);
    let lantern = item(6, "Lantern", 1_500);
    cart.add(&tent);
    cart.add(&lantern);
    cart.add(&lantern);
    assert_eq!(cart.total(), Decimal::new(15_999, 2));

    // Move the tent from the cart to the wishlist
    cart.remove(&tent);
    assert!(wishlist.add(Some(&tent), owner).await);
    assert_eq!(cart.lines().len(), 1);
    assert_eq!(cart.total(), Decimal::new(3_000, 2));
    assert!(wishlist.is_present(tent.id, owner).await);

    // Checkout empties the cart; the wishlist persists
    cart.clear();
    assert!(cart.is_empty());
    assert_eq!(wishlist.list_for_owner(owner).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_identity_serializes_for_session_storage() {
    let verifier = fast_verifier();
    let auth = AuthService::new(seeded_credentials(&verifier), verifier);

    let identity = auth.validate_admin("TechAdmin1", "Admin#1").await.unwrap();
    let json = serde_json::to_value(&identity).unwrap();

    assert_eq!(json["username"], "TechAdmin1");
    assert_eq!(json["role"], "admin");
}

#[test]
fn test_separate_sessions_have_separate_carts() {
    let mut first = Cart::new();
    let mut second = Cart::new();
    let battery = item(42, "Battery", 4_800);

    first.add(&battery);
    second.add(&battery);
    second.add(&battery);

    assert_eq!(first.quantity_of(battery.id), 1);
    assert_eq!(second.quantity_of(battery.id), 2);
}
