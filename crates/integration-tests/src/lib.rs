//! End-to-end test support for the Cartwright cart client.
//!
//! [`StubBackend`] is an in-process implementation of the storefront JSON
//! contract, served over real HTTP on an ephemeral port. It behaves the
//! way the production backend does - carts keyed by user identifier,
//! quantity arithmetic done server-side, every mutation answering with the
//! full updated cart - plus a few knobs for failure injection and response
//! sequencing that the tests use to exercise the client's edge cases.

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use axum::extract::{Path as AxumPath, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use cartwright_core::{CartLine, Product, ProductId, Rating};
use cartwright_storefront::config::StorefrontConfig;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use url::Url;

/// Shared state behind the stub backend's routes.
struct BackendState {
    products: Vec<Product>,
    carts: Mutex<HashMap<String, Vec<CartLine>>>,
    fail_next_mutation: AtomicBool,
    fail_next_cart_read: AtomicBool,
    add_delays: Mutex<VecDeque<Duration>>,
    rotate_to: Mutex<Option<String>>,
    next_order_id: AtomicI64,
    catalog_requests: AtomicUsize,
}

impl BackendState {
    fn lock_carts(&self) -> std::sync::MutexGuard<'_, HashMap<String, Vec<CartLine>>> {
        self.carts.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// An in-process storefront backend bound to an ephemeral port.
pub struct StubBackend {
    base_url: Url,
    state: Arc<BackendState>,
    server: tokio::task::JoinHandle<()>,
}

impl StubBackend {
    /// Start the backend and wait until it accepts connections.
    ///
    /// # Panics
    ///
    /// Panics when the listener cannot be bound (test environment error).
    pub async fn spawn() -> Self {
        let state = Arc::new(BackendState {
            products: sample_products(),
            carts: Mutex::new(HashMap::new()),
            fail_next_mutation: AtomicBool::new(false),
            fail_next_cart_read: AtomicBool::new(false),
            add_delays: Mutex::new(VecDeque::new()),
            rotate_to: Mutex::new(None),
            next_order_id: AtomicI64::new(1000),
            catalog_requests: AtomicUsize::new(0),
        });

        let app = Router::new()
            .route("/api/products", get(list_products))
            .route("/api/products/{id}", get(get_product))
            .route("/api/cart", get(get_cart))
            .route("/api/cart/add", post(add_to_cart))
            .route("/api/cart/remove", post(remove_from_cart))
            .route("/api/checkout", post(checkout))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
            .await
            .expect("bind stub backend listener");
        let addr = listener.local_addr().expect("stub backend local addr");

        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve stub backend");
        });

        let base_url = Url::parse(&format!("http://{addr}/")).expect("stub backend base url");

        Self {
            base_url,
            state,
            server,
        }
    }

    /// Base URL of the running backend.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build a client configuration pointed at this backend.
    #[must_use]
    pub fn client_config(&self, state_dir: PathBuf) -> StorefrontConfig {
        StorefrontConfig {
            api_base_url: self.base_url.clone(),
            state_dir,
            request_timeout: Duration::from_secs(5),
        }
    }

    /// Make the next cart mutation (add/remove/checkout) answer
    /// `success: false`.
    pub fn fail_next_mutation(&self) {
        self.state.fail_next_mutation.store(true, Ordering::SeqCst);
    }

    /// Make the next `GET /api/cart` answer with a 500.
    pub fn fail_next_cart_read(&self) {
        self.state.fail_next_cart_read.store(true, Ordering::SeqCst);
    }

    /// Delay the *response* of the next add request by `delay`.
    ///
    /// The mutation itself is applied on arrival; only the reply is held
    /// back, which lets tests overlap two adds and control which response
    /// lands last.
    pub fn delay_next_add(&self, delay: Duration) {
        self.state
            .add_delays
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(delay);
    }

    /// Make the next successful checkout issue this replacement
    /// identifier.
    pub fn rotate_on_checkout(&self, user_id: &str) {
        *self
            .state
            .rotate_to
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(user_id.to_owned());
    }

    /// The server-side cart for a user (inspection).
    #[must_use]
    pub fn cart_of(&self, user_id: &str) -> Vec<CartLine> {
        self.state
            .lock_carts()
            .get(user_id)
            .cloned()
            .unwrap_or_default()
    }

    /// How many times the catalog has been fetched.
    #[must_use]
    pub fn catalog_requests(&self) -> usize {
        self.state.catalog_requests.load(Ordering::SeqCst)
    }
}

impl Drop for StubBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

/// The catalog the stub backend serves.
#[must_use]
pub fn sample_products() -> Vec<Product> {
    vec![
        Product {
            id: ProductId::new(1),
            title: "Wireless Headphones".to_owned(),
            category: "electronics".to_owned(),
            price: Decimal::new(9999, 2),
            image: "/static/images/headphones.jpg".to_owned(),
            rating: Some(Rating {
                rate: Decimal::new(45, 1),
                count: 120,
            }),
        },
        Product {
            id: ProductId::new(2),
            title: "Smart Watch".to_owned(),
            category: "electronics".to_owned(),
            price: Decimal::new(19999, 2),
            image: "/static/images/smartwatch.jpg".to_owned(),
            rating: Some(Rating {
                rate: Decimal::new(42, 1),
                count: 87,
            }),
        },
        Product {
            id: ProductId::new(3),
            title: "Bluetooth Speaker".to_owned(),
            category: "electronics".to_owned(),
            price: Decimal::new(7999, 2),
            image: "/static/images/speaker.jpg".to_owned(),
            rating: None,
        },
        Product {
            id: ProductId::new(4),
            title: "Laptop Backpack".to_owned(),
            category: "accessories".to_owned(),
            price: Decimal::new(4999, 2),
            image: "/static/images/backpack.jpg".to_owned(),
            rating: None,
        },
    ]
}

/// A state directory that cleans up after itself.
pub struct TempStateDir(PathBuf);

impl TempStateDir {
    #[must_use]
    pub fn new() -> Self {
        Self(std::env::temp_dir().join(format!("cartwright-e2e-{}", uuid::Uuid::new_v4())))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl Default for TempStateDir {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TempStateDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.0);
    }
}

// =============================================================================
// Route Handlers
// =============================================================================

#[derive(Deserialize)]
struct CartQuery {
    user_id: String,
}

#[derive(Deserialize)]
struct MutationBody {
    user_id: String,
    product_id: i64,
}

#[derive(Deserialize)]
struct CheckoutBody {
    user_id: String,
    #[allow(dead_code)]
    items: Vec<CartLine>,
}

async fn list_products(State(state): State<Arc<BackendState>>) -> Json<Vec<Product>> {
    state.catalog_requests.fetch_add(1, Ordering::SeqCst);
    Json(state.products.clone())
}

async fn get_product(
    State(state): State<Arc<BackendState>>,
    AxumPath(id): AxumPath<i64>,
) -> Response {
    state
        .products
        .iter()
        .find(|product| product.id == ProductId::new(id))
        .map_or_else(
            || {
                (
                    StatusCode::NOT_FOUND,
                    Json(json!({"error": "Product not found"})),
                )
                    .into_response()
            },
            |product| Json(product.clone()).into_response(),
        )
}

async fn get_cart(
    State(state): State<Arc<BackendState>>,
    Query(query): Query<CartQuery>,
) -> Response {
    if state.fail_next_cart_read.swap(false, Ordering::SeqCst) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "cart store unavailable"})),
        )
            .into_response();
    }

    let cart = state
        .lock_carts()
        .get(&query.user_id)
        .cloned()
        .unwrap_or_default();
    Json(cart).into_response()
}

async fn add_to_cart(
    State(state): State<Arc<BackendState>>,
    Json(body): Json<MutationBody>,
) -> Json<serde_json::Value> {
    let delay = state
        .add_delays
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .pop_front();

    if state.fail_next_mutation.swap(false, Ordering::SeqCst) {
        return Json(json!({"success": false, "cart": [], "error": "Product not found"}));
    }

    let Some(product) = state
        .products
        .iter()
        .find(|product| product.id == ProductId::new(body.product_id))
    else {
        return Json(json!({"success": false, "cart": [], "error": "Product not found"}));
    };

    // Apply the mutation on arrival; the (possibly delayed) response below
    // is a snapshot taken now, the way a slow real backend would answer.
    let snapshot = {
        let mut carts = state.lock_carts();
        let cart = carts.entry(body.user_id).or_default();
        match cart
            .iter_mut()
            .find(|item| item.product_id == product.id)
        {
            Some(item) => item.quantity += 1,
            None => cart.push(CartLine {
                product_id: product.id,
                quantity: 1,
                price: product.price,
                title: product.title.clone(),
                image: product.image.clone(),
            }),
        }
        cart.clone()
    };

    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    Json(json!({"success": true, "cart": snapshot}))
}

async fn remove_from_cart(
    State(state): State<Arc<BackendState>>,
    Json(body): Json<MutationBody>,
) -> Json<serde_json::Value> {
    if state.fail_next_mutation.swap(false, Ordering::SeqCst) {
        return Json(json!({"success": false, "cart": [], "error": "cart store unavailable"}));
    }

    let snapshot = {
        let mut carts = state.lock_carts();
        let cart = carts.entry(body.user_id).or_default();
        cart.retain(|item| item.product_id != ProductId::new(body.product_id));
        cart.clone()
    };

    Json(json!({"success": true, "cart": snapshot}))
}

async fn checkout(
    State(state): State<Arc<BackendState>>,
    Json(body): Json<CheckoutBody>,
) -> Json<serde_json::Value> {
    if state.fail_next_mutation.swap(false, Ordering::SeqCst) {
        return Json(json!({"success": false, "error": "Payment declined"}));
    }

    let order_id = state.next_order_id.fetch_add(1, Ordering::SeqCst);
    state.lock_carts().remove(&body.user_id);

    let rotate_to = state
        .rotate_to
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .take();

    match rotate_to {
        Some(new_user_id) => Json(json!({
            "success": true,
            "order_id": order_id,
            "new_user_id": new_user_id,
        })),
        None => Json(json!({"success": true, "order_id": order_id})),
    }
}
