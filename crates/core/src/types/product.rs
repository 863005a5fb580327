//! Product catalog types.
//!
//! Products are read-only from the client's perspective: the backend
//! catalog owns them, and the client only lists, filters, and displays
//! them.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::id::ProductId;

/// Aggregate review rating for a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
    /// Average rating on a 0-5 scale.
    #[serde(with = "rust_decimal::serde::float")]
    pub rate: Decimal,
    /// Number of reviews behind the average.
    pub count: u64,
}

/// A product in the backend catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Display title.
    pub title: String,
    /// Category name used for storefront filtering.
    pub category: String,
    /// Unit price. Non-negative; carried as a JSON number on the wire.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// Image URI.
    pub image: String,
    /// Review rating; not every catalog iteration exposes one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<Rating>,
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn test_product_decodes_numeric_price() {
        let json = r#"{
            "id": 1,
            "title": "Wireless Headphones",
            "category": "electronics",
            "price": 99.99,
            "image": "/static/images/headphones.jpg",
            "rating": {"rate": 4.5, "count": 120}
        }"#;

        let product: Product = serde_json::from_str(json).expect("decode product");
        assert_eq!(product.id, ProductId::new(1));
        assert_eq!(product.price, Decimal::new(9999, 2));
        let rating = product.rating.expect("rating present");
        assert_eq!(rating.rate, Decimal::new(45, 1));
        assert_eq!(rating.count, 120);
    }

    #[test]
    fn test_product_rating_is_optional() {
        let json = r#"{
            "id": 4,
            "title": "Laptop Backpack",
            "category": "accessories",
            "price": 49.99,
            "image": "/static/images/backpack.jpg"
        }"#;

        let product: Product = serde_json::from_str(json).expect("decode product");
        assert!(product.rating.is_none());
    }
}
