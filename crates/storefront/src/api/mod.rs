//! Storefront JSON API client.
//!
//! # Architecture
//!
//! - Plain JSON over HTTP with `reqwest`; the backend is the source of
//!   truth for all cart state
//! - The client is constructed explicitly and injected into whatever needs
//!   it - there is no module-level instance
//! - Mutations answer with an envelope (`success`, full updated cart,
//!   optional `error`); a `success: false` envelope is an application
//!   failure, distinct from transport failures
//!
//! # Example
//!
//! ```rust,ignore
//! use cartwright_storefront::api::ApiClient;
//!
//! let api = ApiClient::new(&config)?;
//!
//! let products = api.products().await?;
//! let cart = api.add_to_cart(&user_id, products[0].id).await?;
//! ```

mod client;
mod types;

pub use client::ApiClient;
pub use types::{CartMutationResponse, CheckoutReceipt, CheckoutResponse};

use thiserror::Error;

/// Errors that can occur when talking to the storefront backend.
///
/// `Http` and `Status` are network failures; `Rejected` is an application
/// failure reported by the backend itself. Neither class is ever escalated
/// to a global handler - callers log and move on.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level failure (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status code.
    #[error("unexpected status {status}: {message}")]
    Status { status: u16, message: String },

    /// Backend answered 2xx but the payload did not decode.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Backend processed the request and turned it down (`success: false`).
    #[error("rejected by backend: {0}")]
    Rejected(String),

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),
}
