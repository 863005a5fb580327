//! Core types for Cartwright.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod id;
pub mod product;
pub mod user;

pub use cart::{CartLine, subtotal, total_quantity};
pub use id::*;
pub use product::{Product, Rating};
pub use user::UserId;
