//! Cart operation errors.
//!
//! These never escape [`crate::CartManager`]'s public operations; they are
//! logged and mapped to a [`crate::Notification`] instead. Tests and sinks
//! can still match on the concrete kind.

use rocket_cart_core::{CartInvariantError, ProductId};
use thiserror::Error;

use crate::notify::{NotificationKind, Operation};
use crate::services::ServiceError;
use crate::store::StoreError;

/// Why a cart operation was rejected.
#[derive(Debug, Error)]
pub enum CartError {
    /// Requested amount is above the live stock or below one.
    #[error("requested amount {requested} for product {id} is outside 1..={available}")]
    StockExceeded {
        id: ProductId,
        requested: i64,
        available: u32,
    },

    /// Stock or catalog lookup failed.
    #[error("lookup failed: {0}")]
    Lookup(#[from] ServiceError),

    /// The product has no line in the cart.
    #[error("product {0} is not in the cart")]
    NotInCart(ProductId),

    /// The updated cart could not be persisted.
    #[error("failed to persist cart: {0}")]
    Persist(#[from] StoreError),

    /// A mutation would have broken a cart invariant.
    ///
    /// The manager checks membership and amount bounds before every
    /// `push`, `set_amount` and `remove`, so this only surfaces if those
    /// checks and the cart's own rules ever disagree. It is reported as the
    /// operation's generic failure.
    #[error("cart invariant violated: {0}")]
    Invariant(#[from] CartInvariantError),
}

impl CartError {
    /// Notification category for this error raised during `operation`.
    #[must_use]
    pub const fn kind(&self, operation: Operation) -> NotificationKind {
        match self {
            Self::StockExceeded { .. } => NotificationKind::StockExceeded,
            _ => operation.failure_kind(),
        }
    }
}
