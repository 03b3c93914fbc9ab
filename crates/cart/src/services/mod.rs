//! Catalog and stock lookups.
//!
//! # Contracts
//!
//! - [`CatalogService`] - static product attributes, used when a product is
//!   added to the cart for the first time
//! - [`StockService`] - live availability, queried on every validation and
//!   never cached
//!
//! # Implementations
//!
//! - [`ApiClient`] - HTTP inventory API (`/products/{id}`, `/stock/{id}`)
//! - [`InMemoryInventory`] - programmable in-process source for tests and
//!   offline use

mod http;
mod memory;

pub use http::ApiClient;
pub use memory::InMemoryInventory;

use async_trait::async_trait;
use rocket_cart_core::{Product, ProductId, Stock};
use thiserror::Error;

/// Errors that can occur when querying the inventory.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// HTTP request failed (connection, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Non-success HTTP status other than 404.
    #[error("Unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    /// The API answered for a different product than the one requested.
    #[error("Requested product {requested}, received {received}")]
    Mismatch {
        requested: ProductId,
        received: ProductId,
    },

    /// The base URL cannot carry path segments.
    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),

    /// The source is temporarily unable to answer.
    #[error("Service unavailable: {0}")]
    Unavailable(String),
}

/// Source of product attributes.
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Fetch the catalog entry for a product.
    async fn get_product(&self, id: ProductId) -> Result<Product, ServiceError>;
}

/// Source of live stock readings.
#[async_trait]
pub trait StockService: Send + Sync {
    /// Fetch the currently available quantity for a product.
    async fn get_stock(&self, id: ProductId) -> Result<Stock, ServiceError>;
}
