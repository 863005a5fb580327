//! HTTP client for the storefront backend.

use std::sync::Arc;

use cartwright_core::{CartLine, Product, ProductId, UserId};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::instrument;
use url::Url;

use crate::api::ApiError;
use crate::api::types::{
    CartMutationRequest, CartMutationResponse, CheckoutReceipt, CheckoutRequest, CheckoutResponse,
};
use crate::config::StorefrontConfig;

/// Client for the storefront JSON API.
///
/// Cheaply cloneable; clones share one connection pool.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client fails to build.
    pub fn new(config: &StorefrontConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.api_base_url.clone(),
            }),
        })
    }

    /// Build a full endpoint URL from a relative path.
    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    // =========================================================================
    // Catalog Methods
    // =========================================================================

    /// Fetch the full product catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response does not
    /// decode.
    #[instrument(skip(self))]
    pub async fn products(&self) -> Result<Vec<Product>, ApiError> {
        let response = self
            .inner
            .client
            .get(self.endpoint("api/products"))
            .send()
            .await?;

        decode_body(response).await
    }

    /// Fetch a single product by ID.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] when the catalog has no such product,
    /// or another error if the request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn product(&self, product_id: ProductId) -> Result<Product, ApiError> {
        let response = self
            .inner
            .client
            .get(self.endpoint(&format!("api/products/{product_id}")))
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(format!("product {product_id}")));
        }

        decode_body(response).await
    }

    // =========================================================================
    // Cart Methods
    // =========================================================================

    /// Fetch the cart for a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response does not
    /// decode.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn cart(&self, user_id: &UserId) -> Result<Vec<CartLine>, ApiError> {
        let response = self
            .inner
            .client
            .get(self.endpoint("api/cart"))
            .query(&[("user_id", user_id.as_str())])
            .send()
            .await?;

        decode_body(response).await
    }

    /// Add one unit of a product to a user's cart.
    ///
    /// The backend owns the quantity arithmetic (repeated adds increment);
    /// the returned lines are the full updated cart.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Rejected`] when the backend reports
    /// `success: false`, or another error if the request itself fails.
    #[instrument(skip(self), fields(user_id = %user_id, product_id = %product_id))]
    pub async fn add_to_cart(
        &self,
        user_id: &UserId,
        product_id: ProductId,
    ) -> Result<Vec<CartLine>, ApiError> {
        self.mutate_cart("api/cart/add", user_id, product_id).await
    }

    /// Remove a product from a user's cart.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Rejected`] when the backend reports
    /// `success: false`, or another error if the request itself fails.
    #[instrument(skip(self), fields(user_id = %user_id, product_id = %product_id))]
    pub async fn remove_from_cart(
        &self,
        user_id: &UserId,
        product_id: ProductId,
    ) -> Result<Vec<CartLine>, ApiError> {
        self.mutate_cart("api/cart/remove", user_id, product_id)
            .await
    }

    /// Submit the current cart snapshot for checkout.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Rejected`] with the backend's error string when
    /// checkout is declined, or another error if the request itself fails.
    #[instrument(skip(self, items), fields(user_id = %user_id))]
    pub async fn checkout(
        &self,
        user_id: &UserId,
        items: &[CartLine],
    ) -> Result<CheckoutReceipt, ApiError> {
        let request = CheckoutRequest { user_id, items };
        let response = self.post_json("api/checkout", &request).await?;
        let outcome: CheckoutResponse = decode_body(response).await?;

        if !outcome.success {
            return Err(ApiError::Rejected(error_detail(outcome.error)));
        }

        Ok(CheckoutReceipt {
            order_id: outcome.order_id,
            new_user_id: outcome.new_user_id,
        })
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Run one cart mutation and unwrap its response envelope.
    async fn mutate_cart(
        &self,
        path: &str,
        user_id: &UserId,
        product_id: ProductId,
    ) -> Result<Vec<CartLine>, ApiError> {
        let request = CartMutationRequest {
            user_id,
            product_id,
        };
        let response = self.post_json(path, &request).await?;
        let outcome: CartMutationResponse = decode_body(response).await?;

        if !outcome.success {
            return Err(ApiError::Rejected(error_detail(outcome.error)));
        }

        Ok(outcome.cart)
    }

    async fn post_json<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response, ApiError> {
        Ok(self
            .inner
            .client
            .post(self.endpoint(path))
            .json(body)
            .send()
            .await?)
    }
}

/// Check the response status and decode its JSON body.
///
/// The body is read as text first so that decode failures can be logged
/// with a snippet of what the backend actually sent.
async fn decode_body<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        tracing::error!(
            status = %status,
            body = %snippet(&body),
            "backend returned non-success status"
        );
        return Err(ApiError::Status {
            status: status.as_u16(),
            message: snippet(&body),
        });
    }

    match serde_json::from_str(&body) {
        Ok(decoded) => Ok(decoded),
        Err(e) => {
            tracing::error!(
                error = %e,
                body = %snippet(&body),
                "failed to parse backend response"
            );
            Err(ApiError::Parse(e))
        }
    }
}

/// Fallback text for a failure envelope that carries no error string.
fn error_detail(error: Option<String>) -> String {
    error.unwrap_or_else(|| "(no error detail from backend)".to_string())
}

/// First 200 characters of a response body, for logs and error messages.
fn snippet(body: &str) -> String {
    body.chars().take(200).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_detail_fallback() {
        assert_eq!(
            error_detail(Some("Payment declined".to_string())),
            "Payment declined"
        );
        assert_eq!(error_detail(None), "(no error detail from backend)");
    }

    #[test]
    fn test_snippet_truncates() {
        let long = "x".repeat(500);
        assert_eq!(snippet(&long).chars().count(), 200);
        assert_eq!(snippet("short"), "short");
    }
}
