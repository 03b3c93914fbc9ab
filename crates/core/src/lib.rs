//! Rocket Cart Core - Shared domain types.
//!
//! This crate provides the types used across all Rocket Cart components:
//! - `rocket-cart` - Cart manager, inventory clients, and snapshot stores
//! - `rocket-cart-cli` - Command-line front end
//!
//! # Architecture
//!
//! The core crate contains only types and their invariants - no I/O, no HTTP
//! clients, no persistence. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Product identifiers, prices, catalog/stock records, and the cart itself

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
