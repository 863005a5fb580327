//! Cart state synchronization.
//!
//! A [`CartSession`] pairs the persisted user identifier with the last
//! server-confirmed cart. Every mutation round-trips through the backend
//! and replaces the whole local copy with the response; a failed call
//! leaves local state untouched. The session never patches quantities
//! locally - reconciliation means discarding local state in favor of
//! whatever the server said last.
//!
//! Operations may overlap (nothing is queued or cancelled), in which case
//! the last response to arrive wins, regardless of which request was
//! issued first.

use std::sync::{Arc, Mutex, PoisonError};

use cartwright_core::{CartLine, ProductId, UserId};
use tracing::{info, instrument, warn};

use crate::api::{ApiClient, ApiError, CheckoutReceipt};
use crate::identity::UserIdStore;

/// Local cart state.
///
/// The cart is empty until the first successful load; after that it is
/// always exactly the last successful server response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CartState {
    /// No successful load yet; the server-side cart is unknown.
    #[default]
    Uninitialized,
    /// Mirror of the last successful server response.
    Loaded(Vec<CartLine>),
}

impl CartState {
    /// Lines from the last successful response; empty when uninitialized.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        match self {
            Self::Uninitialized => &[],
            Self::Loaded(lines) => lines,
        }
    }
}

/// A session-scoped cart synchronized with the backend.
///
/// Constructed explicitly with its HTTP dependency injected. Cheaply
/// cloneable; clones share the same state, so overlapping operations from
/// different tasks resolve by arrival order.
#[derive(Clone)]
pub struct CartSession {
    inner: Arc<CartSessionInner>,
}

struct CartSessionInner {
    api: ApiClient,
    store: UserIdStore,
    user_id: Mutex<UserId>,
    cart: Mutex<CartState>,
}

impl CartSession {
    /// Create a session, loading (or creating) the persisted identifier.
    #[must_use]
    pub fn new(api: ApiClient, store: UserIdStore) -> Self {
        let user_id = store.load_or_create();

        Self {
            inner: Arc::new(CartSessionInner {
                api,
                store,
                user_id: Mutex::new(user_id),
                cart: Mutex::new(CartState::default()),
            }),
        }
    }

    /// The identifier this session presents to the backend.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.inner
            .user_id
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Current local cart state.
    #[must_use]
    pub fn state(&self) -> CartState {
        self.inner
            .cart
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Lines from the last successful server response (empty before the
    /// first load).
    #[must_use]
    pub fn lines(&self) -> Vec<CartLine> {
        self.state().lines().to_vec()
    }

    /// Fetch the cart for the current identifier and replace local state.
    ///
    /// # Errors
    ///
    /// On failure the prior local state is left untouched; the error is
    /// logged here and returned for the caller to decide presentation
    /// (typically nothing - load failures are not user-facing).
    #[instrument(skip(self))]
    pub async fn load(&self) -> Result<(), ApiError> {
        let user_id = self.user_id();
        let cart = self.inner.api.cart(&user_id).await.inspect_err(|e| {
            warn!(error = %e, "failed to load cart; keeping previous state");
        })?;

        self.commit(cart);
        Ok(())
    }

    /// Add one unit of a product to the cart.
    ///
    /// On success the response cart becomes the new local state. On
    /// failure nothing changes locally; the caller restores its control
    /// once this returns (feedback is driven off completion, not a
    /// timer).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Rejected`] when the backend declines, or a
    /// network/decode error when the round trip fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add_item(&self, product_id: ProductId) -> Result<(), ApiError> {
        let user_id = self.user_id();
        let cart = self
            .inner
            .api
            .add_to_cart(&user_id, product_id)
            .await
            .inspect_err(|e| warn!(error = %e, "add to cart failed; keeping previous state"))?;

        self.commit(cart);
        Ok(())
    }

    /// Remove a product from the cart.
    ///
    /// # Errors
    ///
    /// Same contract as [`Self::add_item`]: failure changes nothing
    /// locally.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove_item(&self, product_id: ProductId) -> Result<(), ApiError> {
        let user_id = self.user_id();
        let cart = self
            .inner
            .api
            .remove_from_cart(&user_id, product_id)
            .await
            .inspect_err(|e| warn!(error = %e, "remove from cart failed; keeping previous state"))?;

        self.commit(cart);
        Ok(())
    }

    /// Submit the current cart snapshot for checkout.
    ///
    /// When the backend rotates the identifier, the replacement is adopted
    /// and persisted before this returns, so no later cart operation can
    /// observe the old identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Rejected`] with the backend's error string when
    /// checkout is declined (callers surface it and re-enable their
    /// control), or a network/decode error when the round trip fails.
    #[instrument(skip(self))]
    pub async fn checkout(&self) -> Result<CheckoutReceipt, ApiError> {
        let user_id = self.user_id();
        let items = self.lines();
        let receipt = self.inner.api.checkout(&user_id, &items).await?;

        if let Some(new_id) = &receipt.new_user_id {
            self.inner.store.replace(new_id);
            *self
                .inner
                .user_id
                .lock()
                .unwrap_or_else(PoisonError::into_inner) = new_id.clone();
            info!(user_id = %new_id, "adopted rotated user identifier");
        }

        Ok(receipt)
    }

    /// Replace local state with a server-confirmed cart.
    fn commit(&self, cart: Vec<CartLine>) {
        *self
            .inner
            .cart
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = CartState::Loaded(cart);
    }
}
