//! Rocket Cart - Stock-checked shopping cart manager.
//!
//! # Architecture
//!
//! - [`CartManager`] owns the cart and serializes every mutation
//!   (validate, mutate, persist) behind a single async lock
//! - Stock and catalog data come from injected [`StockService`] and
//!   [`CatalogService`] implementations; stock is read fresh on every call
//! - Every successful mutation is written through to a [`CartStore`]
//!   snapshot before it becomes visible in memory
//! - Failures never reach the caller as errors: they are turned into
//!   [`Notification`]s and delivered to a [`NotificationSink`]
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use rocket_cart::{ApiClient, CartConfig, CartManager, FileStore, TracingSink};
//!
//! let config = CartConfig::from_env()?;
//! let api = Arc::new(ApiClient::new(&config.api)?);
//! let store = Arc::new(FileStore::new(&config.snapshot.dir, &config.snapshot.key));
//!
//! let manager = CartManager::load(api.clone(), api, store, Arc::new(TracingSink)).await?;
//! manager.add(ProductId::new(1)).await;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod manager;
pub mod notify;
pub mod services;
pub mod store;

pub use config::{ApiConfig, CartConfig, ConfigError, LocalConfig, SnapshotConfig};
pub use error::CartError;
pub use manager::CartManager;
pub use notify::{Notification, NotificationKind, NotificationSink, Operation, TracingSink};
pub use services::{ApiClient, CatalogService, InMemoryInventory, ServiceError, StockService};
pub use store::{CartStore, FileStore, MemoryStore, StoreError};

pub use rocket_cart_core::{Cart, CartItem, Product, ProductId, Stock};
