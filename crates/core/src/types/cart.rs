//! The cart: an ordered list of products, each with a requested amount.
//!
//! [`Cart`] enforces the structural invariants on its own:
//! - at most one [`CartItem`] per [`ProductId`]
//! - every item has an amount of at least one
//!
//! Stock limits are not a property of the cart itself; they are checked by
//! whoever mutates it (see the `rocket-cart` manager) against a live reading.
//!
//! A cart serializes as a plain JSON array of items, each being the product
//! fields plus `amount`. Deserializing re-validates the invariants, so a
//! tampered snapshot cannot smuggle in duplicates or empty lines.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::id::ProductId;
use super::product::Product;

/// Structural invariant violations.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum CartInvariantError {
    /// A second line for a product already in the cart.
    #[error("product {0} is already in the cart")]
    DuplicateItem(ProductId),

    /// A line with an amount of zero.
    #[error("product {0} has an amount of zero")]
    ZeroAmount(ProductId),

    /// The referenced product has no line in the cart.
    #[error("product {0} is not in the cart")]
    MissingItem(ProductId),
}

/// A single cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "CartItemRecord", into = "CartItemRecord")]
pub struct CartItem {
    pub product: Product,
    pub amount: u32,
}

/// Wire shape of a cart line: the product fields and `amount` side by side.
///
/// Spelled out instead of `#[serde(flatten)]`, which buffers values and
/// cannot read arbitrary-precision numbers back into integer fields.
#[derive(Serialize, Deserialize)]
struct CartItemRecord {
    id: ProductId,
    title: String,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    price: Decimal,
    image: String,
    amount: u32,
}

impl From<CartItemRecord> for CartItem {
    fn from(record: CartItemRecord) -> Self {
        Self {
            product: Product {
                id: record.id,
                title: record.title,
                price: record.price,
                image: record.image,
            },
            amount: record.amount,
        }
    }
}

impl From<CartItem> for CartItemRecord {
    fn from(item: CartItem) -> Self {
        Self {
            id: item.product.id,
            title: item.product.title,
            price: item.product.price,
            image: item.product.image,
            amount: item.amount,
        }
    }
}

impl CartItem {
    /// The product identifier of this line.
    #[must_use]
    pub const fn id(&self) -> ProductId {
        self.product.id
    }

    /// Unit price times amount.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.product.price * Decimal::from(self.amount)
    }
}

/// An ordered collection of cart lines, unique by product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CartItem>", into = "Vec<CartItem>")]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a cart from existing lines, checking the invariants.
    ///
    /// # Errors
    ///
    /// Returns `CartInvariantError` if two lines share a product or a line
    /// has an amount of zero.
    pub fn from_items(items: Vec<CartItem>) -> Result<Self, CartInvariantError> {
        let mut cart = Self::new();
        for item in items {
            if item.amount == 0 {
                return Err(CartInvariantError::ZeroAmount(item.id()));
            }
            if cart.contains(item.id()) {
                return Err(CartInvariantError::DuplicateItem(item.id()));
            }
            cart.items.push(item);
        }
        Ok(cart)
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Iterate over lines in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, CartItem> {
        self.items.iter()
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Look up the line for a product.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id() == id)
    }

    #[must_use]
    pub fn contains(&self, id: ProductId) -> bool {
        self.get(id).is_some()
    }

    /// Amount requested for a product, zero if absent.
    #[must_use]
    pub fn amount_of(&self, id: ProductId) -> u32 {
        self.get(id).map_or(0, |item| item.amount)
    }

    /// Sum of amounts over all lines.
    #[must_use]
    pub fn total_units(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.amount)).sum()
    }

    /// Sum of line totals.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Append a new line for `product` with an amount of one.
    ///
    /// # Errors
    ///
    /// Returns `CartInvariantError::DuplicateItem` if the product already has
    /// a line.
    pub fn push(&mut self, product: Product) -> Result<(), CartInvariantError> {
        if self.contains(product.id) {
            return Err(CartInvariantError::DuplicateItem(product.id));
        }
        self.items.push(CartItem { product, amount: 1 });
        Ok(())
    }

    /// Set the amount of an existing line.
    ///
    /// # Errors
    ///
    /// Returns `CartInvariantError::ZeroAmount` for an amount of zero and
    /// `CartInvariantError::MissingItem` if the product has no line.
    pub fn set_amount(&mut self, id: ProductId, amount: u32) -> Result<(), CartInvariantError> {
        if amount == 0 {
            return Err(CartInvariantError::ZeroAmount(id));
        }
        let item = self
            .items
            .iter_mut()
            .find(|item| item.id() == id)
            .ok_or(CartInvariantError::MissingItem(id))?;
        item.amount = amount;
        Ok(())
    }

    /// Remove the line for a product, preserving the order of the rest.
    ///
    /// # Errors
    ///
    /// Returns `CartInvariantError::MissingItem` if the product has no line.
    pub fn remove(&mut self, id: ProductId) -> Result<CartItem, CartInvariantError> {
        let index = self
            .items
            .iter()
            .position(|item| item.id() == id)
            .ok_or(CartInvariantError::MissingItem(id))?;
        Ok(self.items.remove(index))
    }
}

impl TryFrom<Vec<CartItem>> for Cart {
    type Error = CartInvariantError;

    fn try_from(items: Vec<CartItem>) -> Result<Self, Self::Error> {
        Self::from_items(items)
    }
}

impl From<Cart> for Vec<CartItem> {
    fn from(cart: Cart) -> Self {
        cart.items
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a CartItem;
    type IntoIter = std::slice::Iter<'a, CartItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
