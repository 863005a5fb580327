//! End-to-end cart synchronization tests.
//!
//! Every test drives the real client over HTTP against [`StubBackend`].

use std::time::Duration;

use cartwright_core::ProductId;
use cartwright_integration_tests::{StubBackend, TempStateDir};
use cartwright_storefront::api::{ApiClient, ApiError};
use cartwright_storefront::identity::UserIdStore;
use cartwright_storefront::session::CartSession;
use cartwright_storefront::view::{CartBadge, CartPage};

fn session_against(backend: &StubBackend, dir: &TempStateDir) -> CartSession {
    let config = backend.client_config(dir.path().to_path_buf());
    let api = ApiClient::new(&config).expect("build api client");
    CartSession::new(api, UserIdStore::new(dir.path()))
}

#[tokio::test]
async fn add_replaces_local_cart_with_server_response() {
    let backend = StubBackend::spawn().await;
    let dir = TempStateDir::new();
    let session = session_against(&backend, &dir);

    session.add_item(ProductId::new(3)).await.expect("add item");

    let lines = session.lines();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].product_id, ProductId::new(3));
    assert_eq!(lines[0].quantity, 1);
    // Denormalized fields come from the server, not the local catalog.
    assert_eq!(lines[0].title, "Bluetooth Speaker");

    // Local state is exactly the server's cart.
    assert_eq!(lines, backend.cart_of(session.user_id().as_str()));
    assert_eq!(CartBadge::from(&session.state()), CartBadge::Count(1));
}

#[tokio::test]
async fn repeated_add_increments_quantity_server_side() {
    let backend = StubBackend::spawn().await;
    let dir = TempStateDir::new();
    let session = session_against(&backend, &dir);

    session.add_item(ProductId::new(1)).await.expect("first add");
    session.add_item(ProductId::new(1)).await.expect("second add");

    let lines = session.lines();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].quantity, 2);
    assert_eq!(CartBadge::from(&session.state()), CartBadge::Count(2));
}

#[tokio::test]
async fn remove_empties_cart_and_badge() {
    let backend = StubBackend::spawn().await;
    let dir = TempStateDir::new();
    let session = session_against(&backend, &dir);

    session.add_item(ProductId::new(3)).await.expect("add item");
    session
        .remove_item(ProductId::new(3))
        .await
        .expect("remove item");

    assert!(session.lines().is_empty());
    assert_eq!(CartBadge::from(&session.state()), CartBadge::Count(0));
    assert!(CartPage::from(&session.state()).is_empty());
}

#[tokio::test]
async fn failed_add_leaves_prior_state_untouched() {
    let backend = StubBackend::spawn().await;
    let dir = TempStateDir::new();
    let session = session_against(&backend, &dir);

    session.add_item(ProductId::new(3)).await.expect("add item");
    let before = session.lines();

    backend.fail_next_mutation();
    let err = session
        .add_item(ProductId::new(4))
        .await
        .expect_err("backend rejected the add");
    assert!(matches!(err, ApiError::Rejected(_)));

    assert_eq!(session.lines(), before);
    assert_eq!(CartBadge::from(&session.state()), CartBadge::Count(1));
}

#[tokio::test]
async fn failed_remove_is_a_noop() {
    let backend = StubBackend::spawn().await;
    let dir = TempStateDir::new();
    let session = session_against(&backend, &dir);

    session.add_item(ProductId::new(2)).await.expect("add item");
    let before = session.lines();

    backend.fail_next_mutation();
    session
        .remove_item(ProductId::new(2))
        .await
        .expect_err("backend rejected the remove");

    assert_eq!(session.lines(), before);
    assert_eq!(
        backend.cart_of(session.user_id().as_str()),
        before,
        "server cart is untouched as well"
    );
}

#[tokio::test]
async fn failed_load_keeps_previous_state() {
    let backend = StubBackend::spawn().await;
    let dir = TempStateDir::new();
    let session = session_against(&backend, &dir);

    session.add_item(ProductId::new(1)).await.expect("add item");

    backend.fail_next_cart_read();
    let err = session.load().await.expect_err("cart read failed");
    assert!(matches!(err, ApiError::Status { status: 500, .. }));

    assert_eq!(session.lines().len(), 1);
    assert_eq!(CartBadge::from(&session.state()), CartBadge::Count(1));
}

#[tokio::test]
async fn badge_is_unknown_until_first_successful_load() {
    let backend = StubBackend::spawn().await;
    let dir = TempStateDir::new();
    let session = session_against(&backend, &dir);

    backend.fail_next_cart_read();
    session.load().await.expect_err("cart read failed");
    assert_eq!(CartBadge::from(&session.state()), CartBadge::Unknown);
    assert_eq!(CartBadge::from(&session.state()).to_string(), "?");

    // An empty cart loaded successfully is a real zero, not unknown.
    session.load().await.expect("cart read succeeds");
    assert_eq!(CartBadge::from(&session.state()), CartBadge::Count(0));
}

#[tokio::test]
async fn overlapping_adds_resolve_by_arrival_order() {
    let backend = StubBackend::spawn().await;
    let dir = TempStateDir::new();
    let session = session_against(&backend, &dir);

    // The first request's response is held back, so the second request's
    // response arrives first and the first (stale) response lands last.
    backend.delay_next_add(Duration::from_millis(400));

    let slow = {
        let session = session.clone();
        tokio::spawn(async move { session.add_item(ProductId::new(1)).await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;
    let fast = {
        let session = session.clone();
        tokio::spawn(async move { session.add_item(ProductId::new(1)).await })
    };

    fast.await.expect("join fast add").expect("fast add");
    slow.await.expect("join slow add").expect("slow add");

    // The server processed both adds...
    let server_cart = backend.cart_of(session.user_id().as_str());
    assert_eq!(server_cart[0].quantity, 2);

    // ...but the last response to *arrive* was the stale snapshot taken
    // for the first request: last write wins, by arrival order.
    let lines = session.lines();
    assert_eq!(lines[0].quantity, 1);
}
