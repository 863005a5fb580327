//! View-state projections over the cart session.
//!
//! Pure data for whatever presentation layer sits on top - the bundled
//! CLI renders these as plain text. No rendering or routing lives here.

use core::fmt;

use cartwright_core::{CartLine, ProductId, subtotal, total_quantity};
use rust_decimal::Decimal;

use crate::session::CartState;

/// Cart count badge.
///
/// `Unknown` covers the window before the first successful load when the
/// server-side cart could not be fetched; it renders as `?` rather than a
/// misleading zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartBadge {
    /// Server cart state is not known yet.
    Unknown,
    /// Total item quantity from the last successful load.
    Count(u32),
}

impl fmt::Display for CartBadge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => write!(f, "?"),
            Self::Count(count) => write!(f, "{count}"),
        }
    }
}

impl From<&CartState> for CartBadge {
    fn from(state: &CartState) -> Self {
        match state {
            CartState::Uninitialized => Self::Unknown,
            CartState::Loaded(lines) => Self::Count(total_quantity(lines)),
        }
    }
}

/// Cart line display data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItemView {
    pub product_id: ProductId,
    pub title: String,
    pub quantity: u32,
    pub unit_price: String,
    pub line_total: String,
    pub image: String,
}

impl From<&CartLine> for CartItemView {
    fn from(line: &CartLine) -> Self {
        Self {
            product_id: line.product_id,
            title: line.title.clone(),
            quantity: line.quantity,
            unit_price: format_price(line.price),
            line_total: format_price(line.line_total()),
            image: line.image.clone(),
        }
    }
}

/// Cart page display data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartPage {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub item_count: u32,
}

impl CartPage {
    /// Create an empty cart page.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            subtotal: format_price(Decimal::ZERO),
            item_count: 0,
        }
    }

    /// True when the page should show the empty-cart state.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl From<&CartState> for CartPage {
    fn from(state: &CartState) -> Self {
        let lines = state.lines();
        if lines.is_empty() {
            return Self::empty();
        }

        Self {
            items: lines.iter().map(CartItemView::from).collect(),
            subtotal: format_price(subtotal(lines)),
            item_count: total_quantity(lines),
        }
    }
}

/// Format a decimal amount as a price string (e.g., `$19.99`).
#[must_use]
pub fn format_price(amount: Decimal) -> String {
    format!("${:.2}", amount.round_dp(2))
}
