//! Wire-format request and response envelopes for the storefront API.
//!
//! These mirror the backend contract exactly; domain types live in
//! `cartwright-core` and are reused directly where the wire shape matches.

use cartwright_core::{CartLine, OrderId, ProductId, UserId};
use serde::{Deserialize, Serialize};

/// Request body for `POST /api/cart/add` and `POST /api/cart/remove`.
#[derive(Debug, Serialize)]
pub(crate) struct CartMutationRequest<'a> {
    pub user_id: &'a UserId,
    pub product_id: ProductId,
}

/// Response envelope for cart mutations.
///
/// On success the `cart` field carries the full updated cart; the client
/// replaces its local copy wholesale rather than patching it.
#[derive(Debug, Deserialize)]
pub struct CartMutationResponse {
    pub success: bool,
    #[serde(default)]
    pub cart: Vec<CartLine>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Request body for `POST /api/checkout`.
///
/// Carries the full current cart snapshot; the backend owns order
/// assembly.
#[derive(Debug, Serialize)]
pub(crate) struct CheckoutRequest<'a> {
    pub user_id: &'a UserId,
    pub items: &'a [CartLine],
}

/// Response envelope for checkout.
#[derive(Debug, Deserialize)]
pub struct CheckoutResponse {
    pub success: bool,
    #[serde(default)]
    pub order_id: Option<OrderId>,
    /// Set when the backend rotates the caller's identifier; the client
    /// must adopt and persist it before any further cart operation.
    #[serde(default)]
    pub new_user_id: Option<UserId>,
    #[serde(default)]
    pub error: Option<String>,
}

/// A confirmed checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutReceipt {
    /// Backend-assigned order number, when the backend reports one.
    pub order_id: Option<OrderId>,
    /// Replacement identifier issued by the backend, if any.
    pub new_user_id: Option<UserId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mutation_request_shape() {
        let user_id = UserId::from("abc");
        let request = CartMutationRequest {
            user_id: &user_id,
            product_id: ProductId::new(5),
        };

        let json = serde_json::to_value(&request).expect("serialize");
        assert_eq!(json["user_id"], "abc");
        assert_eq!(json["product_id"], 5);
    }

    #[test]
    fn test_mutation_response_defaults() {
        // A failure envelope may omit the cart entirely.
        let response: CartMutationResponse =
            serde_json::from_str(r#"{"success": false, "error": "Product not found"}"#)
                .expect("decode");
        assert!(!response.success);
        assert!(response.cart.is_empty());
        assert_eq!(response.error.as_deref(), Some("Product not found"));
    }

    #[test]
    fn test_checkout_response_with_rotation() {
        let response: CheckoutResponse =
            serde_json::from_str(r#"{"success": true, "order_id": 123, "new_user_id": "abc"}"#)
                .expect("decode");
        assert!(response.success);
        assert_eq!(response.order_id, Some(OrderId::new(123)));
        assert_eq!(response.new_user_id, Some(UserId::from("abc")));
    }
}
