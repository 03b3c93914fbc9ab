//! Durable cart snapshots.
//!
//! A snapshot is the whole cart serialized as a JSON array of items. It is
//! read once at startup and rewritten in full after every successful
//! mutation.
//!
//! Loading distinguishes two failure modes:
//! - [`StoreError::Corrupt`] - the bytes are not a JSON item array
//! - [`StoreError::Invalid`] - the items parse but break a cart invariant
//!   (duplicate product, zero amount)

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use rocket_cart_core::{Cart, CartInvariantError, CartItem};
use thiserror::Error;

/// Errors that can occur when reading or writing a snapshot.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored snapshot is not valid JSON for a cart.
    #[error("corrupt snapshot: {0}")]
    Corrupt(#[source] serde_json::Error),

    /// Stored snapshot violates a cart invariant.
    #[error("invalid snapshot: {0}")]
    Invalid(#[from] CartInvariantError),

    /// Cart could not be serialized.
    #[error("failed to encode snapshot: {0}")]
    Encode(#[source] serde_json::Error),

    /// The store is refusing writes.
    #[error("snapshot store is read-only")]
    ReadOnly,
}

/// Key-value snapshot persistence for a single cart.
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Read the stored cart, `None` if nothing has been saved yet.
    async fn load(&self) -> Result<Option<Cart>, StoreError>;

    /// Replace the stored cart.
    async fn save(&self, cart: &Cart) -> Result<(), StoreError>;
}

/// Serialize a cart to its snapshot form.
pub(crate) fn encode_snapshot(cart: &Cart) -> Result<String, StoreError> {
    serde_json::to_string(cart).map_err(StoreError::Encode)
}

/// Parse and validate a snapshot.
pub(crate) fn decode_snapshot(raw: &str) -> Result<Cart, StoreError> {
    let items: Vec<CartItem> = serde_json::from_str(raw).map_err(StoreError::Corrupt)?;
    Ok(Cart::from_items(items)?)
}
