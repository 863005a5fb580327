//! Cart line items.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::id::ProductId;

/// One product-quantity entry in a user's cart.
///
/// Lines are wholly owned by the backend: price, title, and image are
/// denormalized from the product at add time, and quantity arithmetic
/// happens server-side. The client only ever holds what the server
/// returned last.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// The product this line refers to.
    pub product_id: ProductId,
    /// Positive item count.
    pub quantity: u32,
    /// Unit price, copied from the product when the line was created.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// Product title, copied at add time.
    pub title: String,
    /// Product image URI, copied at add time.
    pub image: String,
}

impl CartLine {
    /// Line total: unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// Total item quantity across lines (the cart badge number).
#[must_use]
pub fn total_quantity(lines: &[CartLine]) -> u32 {
    lines.iter().map(|line| line.quantity).sum()
}

/// Cart subtotal: the sum of all line totals.
#[must_use]
pub fn subtotal(lines: &[CartLine]) -> Decimal {
    lines.iter().map(CartLine::line_total).sum()
}
