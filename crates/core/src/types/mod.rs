//! Core types for Rocket Cart.
//!
//! This module provides type-safe wrappers for the cart domain.

pub mod cart;
pub mod id;
pub mod price;
pub mod product;

pub use cart::{Cart, CartInvariantError, CartItem};
pub use id::*;
pub use price::{CurrencyCode, ParseCurrencyError, Price};
pub use product::{Product, Stock};
