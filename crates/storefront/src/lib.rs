//! Cartwright Storefront library.
//!
//! This crate provides the storefront cart client as a library, allowing
//! it to be tested end to end and reused by the bundled CLI binary.
//!
//! # Architecture
//!
//! - The backend JSON API is the source of truth for the cart - the client
//!   never computes quantity deltas locally
//! - The user identifier is persisted to a single file under the state
//!   directory and rotated only when checkout hands back a replacement
//! - The [`session::CartSession`] is an explicitly constructed,
//!   session-scoped value with its HTTP dependency injected; nothing in
//!   this crate is a module-level singleton

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod catalog;
pub mod config;
pub mod identity;
pub mod session;
pub mod view;
