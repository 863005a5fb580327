//! End-to-end checkout tests, including identifier rotation.

use cartwright_core::{ProductId, UserId};
use cartwright_integration_tests::{StubBackend, TempStateDir};
use cartwright_storefront::api::{ApiClient, ApiError};
use cartwright_storefront::identity::UserIdStore;
use cartwright_storefront::session::CartSession;
use cartwright_storefront::view::CartBadge;

fn session_against(backend: &StubBackend, dir: &TempStateDir) -> CartSession {
    let config = backend.client_config(dir.path().to_path_buf());
    let api = ApiClient::new(&config).expect("build api client");
    CartSession::new(api, UserIdStore::new(dir.path()))
}

#[tokio::test]
async fn checkout_confirms_order_and_keeps_identifier() {
    let backend = StubBackend::spawn().await;
    let dir = TempStateDir::new();
    let session = session_against(&backend, &dir);
    let original_id = session.user_id();

    session.add_item(ProductId::new(1)).await.expect("add item");
    let receipt = session.checkout().await.expect("checkout");

    assert!(receipt.order_id.is_some());
    assert!(receipt.new_user_id.is_none());
    assert_eq!(session.user_id(), original_id);

    // The backend consumed the cart; a reload reflects that.
    session.load().await.expect("reload cart");
    assert_eq!(CartBadge::from(&session.state()), CartBadge::Count(0));
}

#[tokio::test]
async fn rotated_identifier_is_adopted_and_persisted() {
    let backend = StubBackend::spawn().await;
    let dir = TempStateDir::new();
    let session = session_against(&backend, &dir);
    let original_id = session.user_id();

    session.add_item(ProductId::new(2)).await.expect("add item");
    backend.rotate_on_checkout("abc");

    let receipt = session.checkout().await.expect("checkout");
    assert_eq!(receipt.new_user_id, Some(UserId::from("abc")));

    // The session presents the new identifier from now on...
    assert_ne!(session.user_id(), original_id);
    assert_eq!(session.user_id(), UserId::from("abc"));

    // ...and it is already persisted: a fresh store over the same state
    // directory sees the replacement, not a regenerated value.
    let store = UserIdStore::new(dir.path());
    assert_eq!(store.load_or_create(), UserId::from("abc"));
}

#[tokio::test]
async fn failed_checkout_surfaces_error_and_allows_retry() {
    let backend = StubBackend::spawn().await;
    let dir = TempStateDir::new();
    let session = session_against(&backend, &dir);

    session.add_item(ProductId::new(1)).await.expect("add item");
    let before = session.lines();

    backend.fail_next_mutation();
    let err = session.checkout().await.expect_err("checkout declined");
    match err {
        ApiError::Rejected(message) => assert_eq!(message, "Payment declined"),
        other => panic!("expected rejection, got {other}"),
    }

    // Nothing changed: same identifier, same cart, ready to retry.
    assert_eq!(session.lines(), before);
    assert_eq!(backend.cart_of(session.user_id().as_str()), before);

    let receipt = session.checkout().await.expect("retry succeeds");
    assert!(receipt.order_id.is_some());
}
