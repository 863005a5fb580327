//! Product catalog access.
//!
//! The catalog is read-only from the client's perspective, so responses
//! are cached briefly (`moka`, 5-minute TTL) - each page load fetches the
//! list once and filters locally from there.

use std::sync::Arc;
use std::time::Duration;

use cartwright_core::{Product, ProductId};
use moka::future::Cache;
use tracing::{debug, instrument};

use crate::api::{ApiClient, ApiError};

/// How long catalog responses stay fresh.
const CACHE_TTL: Duration = Duration::from_secs(300);

/// Category filter sentinel meaning "no filtering".
pub const ALL_CATEGORIES: &str = "all";

/// How many products the home page features.
const FEATURED_COUNT: usize = 4;

/// Cache key for catalog responses.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
enum CacheKey {
    Catalog,
    Product(ProductId),
}

/// Cached value types.
#[derive(Debug, Clone)]
enum CacheValue {
    Catalog(Arc<Vec<Product>>),
    Product(Box<Product>),
}

/// Read-side catalog client with short-lived caching.
#[derive(Clone)]
pub struct Catalog {
    api: ApiClient,
    cache: Cache<CacheKey, CacheValue>,
}

impl Catalog {
    /// Create a catalog over an API client.
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(CACHE_TTL)
            .build();

        Self { api, cache }
    }

    /// Fetch the full product list.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn products(&self) -> Result<Arc<Vec<Product>>, ApiError> {
        if let Some(CacheValue::Catalog(products)) = self.cache.get(&CacheKey::Catalog).await {
            debug!("cache hit for catalog");
            return Ok(products);
        }

        let products = Arc::new(self.api.products().await?);
        self.cache
            .insert(CacheKey::Catalog, CacheValue::Catalog(Arc::clone(&products)))
            .await;

        Ok(products)
    }

    /// Fetch a single product by ID.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for an unknown product, or another
    /// error if the API request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn product(&self, product_id: ProductId) -> Result<Product, ApiError> {
        let key = CacheKey::Product(product_id);

        if let Some(CacheValue::Product(product)) = self.cache.get(&key).await {
            debug!("cache hit for product");
            return Ok(*product);
        }

        let product = self.api.product(product_id).await?;
        self.cache
            .insert(key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }
}

// =============================================================================
// Local Filtering
// =============================================================================

/// Unique category names in first-seen order.
#[must_use]
pub fn categories(products: &[Product]) -> Vec<String> {
    let mut seen = Vec::new();
    for product in products {
        if !seen.contains(&product.category) {
            seen.push(product.category.clone());
        }
    }
    seen
}

/// Products matching a category; the [`ALL_CATEGORIES`] sentinel returns
/// everything.
#[must_use]
pub fn filter_by_category<'a>(products: &'a [Product], category: &str) -> Vec<&'a Product> {
    products
        .iter()
        .filter(|product| category == ALL_CATEGORIES || product.category == category)
        .collect()
}

/// The home-page slice: the first few products of the catalog.
#[must_use]
pub fn featured(products: &[Product]) -> &[Product] {
    products.get(..FEATURED_COUNT).unwrap_or(products)
}
