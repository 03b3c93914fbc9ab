//! The cart manager.
//!
//! Each operation runs as one critical section: the cart lock is taken
//! before anything is read and held across the stock lookup, the catalog
//! lookup and the snapshot write. Concurrent callers therefore see strictly
//! serialized operations and never act on a stale cart.
//!
//! Mutations are applied to a copy of the cart. The copy is persisted first
//! and only swapped in once the write succeeded, so memory and snapshot
//! change together or not at all.

use std::sync::Arc;

use rocket_cart_core::{Cart, ProductId};
use tokio::sync::{Mutex, MutexGuard};
use tracing::{info, instrument};

use crate::error::CartError;
use crate::notify::{Notification, NotificationSink, Operation};
use crate::services::{CatalogService, StockService};
use crate::store::{CartStore, StoreError};

/// Owns a cart and applies stock-checked mutations to it.
///
/// Share it between tasks with `Arc<CartManager>`; all methods take `&self`.
pub struct CartManager {
    cart: Mutex<Cart>,
    catalog: Arc<dyn CatalogService>,
    stock: Arc<dyn StockService>,
    store: Arc<dyn CartStore>,
    sink: Arc<dyn NotificationSink>,
}

impl CartManager {
    /// Restore the cart from `store`, starting empty if no snapshot exists.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the snapshot cannot be read, is corrupt, or
    /// violates a cart invariant.
    pub async fn load(
        catalog: Arc<dyn CatalogService>,
        stock: Arc<dyn StockService>,
        store: Arc<dyn CartStore>,
        sink: Arc<dyn NotificationSink>,
    ) -> Result<Self, StoreError> {
        let cart = store.load().await?.unwrap_or_default();
        info!(
            items = cart.len(),
            units = cart.total_units(),
            "Cart restored"
        );

        Ok(Self {
            cart: Mutex::new(cart),
            catalog,
            stock,
            store,
            sink,
        })
    }

    /// A copy of the current cart.
    ///
    /// Waits for any in-flight operation to finish first.
    pub async fn cart(&self) -> Cart {
        self.cart.lock().await.clone()
    }

    /// Add one unit of a product, fetching it from the catalog if it is new.
    ///
    /// Returns whether the cart changed. Failures are reported to the
    /// notification sink.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn add(&self, id: ProductId) -> bool {
        let result = self.try_add(id).await;
        self.settle(Operation::Add, id, result)
    }

    /// Remove a product's line.
    ///
    /// Returns whether the cart changed. Removing a product that is not in
    /// the cart is reported as a failure.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn remove(&self, id: ProductId) -> bool {
        let result = self.try_remove(id).await;
        self.settle(Operation::Remove, id, result)
    }

    /// Set a product's amount directly.
    ///
    /// Returns whether the cart changed. Amounts below one are rejected the
    /// same way as amounts above the available stock.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn update_amount(&self, id: ProductId, amount: i64) -> bool {
        let result = self.try_update_amount(id, amount).await;
        self.settle(Operation::UpdateAmount, id, result)
    }

    async fn try_add(&self, id: ProductId) -> Result<(), CartError> {
        let mut cart = self.cart.lock().await;

        let current = cart.amount_of(id);
        let available = self.available(id).await?;
        let requested = i64::from(current) + 1;
        if requested > i64::from(available) {
            return Err(CartError::StockExceeded {
                id,
                requested,
                available,
            });
        }

        let mut updated = cart.clone();
        if current > 0 {
            // current < available, so this cannot overflow
            updated.set_amount(id, current + 1)?;
        } else {
            let product = self.catalog.get_product(id).await?;
            updated.push(product)?;
        }

        self.commit(&mut cart, updated).await
    }

    async fn try_remove(&self, id: ProductId) -> Result<(), CartError> {
        let mut cart = self.cart.lock().await;

        if !cart.contains(id) {
            return Err(CartError::NotInCart(id));
        }

        let mut updated = cart.clone();
        updated.remove(id)?;
        self.commit(&mut cart, updated).await
    }

    async fn try_update_amount(&self, id: ProductId, amount: i64) -> Result<(), CartError> {
        let mut cart = self.cart.lock().await;

        let available = self.available(id).await?;
        let exceeded = CartError::StockExceeded {
            id,
            requested: amount,
            available,
        };
        if amount > i64::from(available) || amount < 1 {
            return Err(exceeded);
        }
        let amount = u32::try_from(amount).map_err(|_| exceeded)?;

        if !cart.contains(id) {
            return Err(CartError::NotInCart(id));
        }

        let mut updated = cart.clone();
        updated.set_amount(id, amount)?;
        self.commit(&mut cart, updated).await
    }

    /// Fresh stock reading for `id`.
    async fn available(&self, id: ProductId) -> Result<u32, CartError> {
        let stock = self.stock.get_stock(id).await?;
        Ok(stock.amount)
    }

    /// Persist `updated`, then make it the current cart.
    async fn commit(
        &self,
        cart: &mut MutexGuard<'_, Cart>,
        updated: Cart,
    ) -> Result<(), CartError> {
        self.store.save(&updated).await?;
        **cart = updated;
        Ok(())
    }

    /// Log the outcome and turn a failure into a notification.
    fn settle(&self, operation: Operation, id: ProductId, result: Result<(), CartError>) -> bool {
        match result {
            Ok(()) => {
                info!(%operation, product_id = %id, "Cart updated");
                true
            }
            Err(err) => {
                if matches!(err, CartError::Persist(_)) {
                    tracing::error!(
                        %operation,
                        product_id = %id,
                        error = %err,
                        "Cart snapshot write failed"
                    );
                } else {
                    tracing::warn!(
                        %operation,
                        product_id = %id,
                        error = %err,
                        "Cart operation rejected"
                    );
                }
                self.sink
                    .notify(Notification::new(err.kind(operation), operation, id));
                false
            }
        }
    }
}
