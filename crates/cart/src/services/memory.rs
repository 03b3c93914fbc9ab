//! In-process inventory.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use rocket_cart_core::{Product, ProductId, Stock};

use super::{CatalogService, ServiceError, StockService};

/// A programmable catalog and stock source.
///
/// Clones share state, so a test can keep a handle to adjust stock or
/// inject failures while the manager holds another.
#[derive(Debug, Clone, Default)]
pub struct InMemoryInventory {
    inner: Arc<Mutex<InventoryState>>,
    latency: Option<Duration>,
}

#[derive(Debug, Default)]
struct InventoryState {
    products: HashMap<ProductId, Product>,
    stock: HashMap<ProductId, u32>,
    failing_catalog: HashSet<ProductId>,
    failing_stock: HashSet<ProductId>,
    catalog_calls: usize,
    stock_calls: usize,
}

impl InMemoryInventory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a product together with its available stock.
    #[must_use]
    pub fn with_product(self, product: Product, stock: u32) -> Self {
        self.insert_product(product, stock);
        self
    }

    /// Delay every lookup by `latency`, yielding to other tasks meanwhile.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn insert_product(&self, product: Product, stock: u32) {
        let mut state = self.state();
        state.stock.insert(product.id, stock);
        state.products.insert(product.id, product);
    }

    pub fn set_stock(&self, id: ProductId, amount: u32) {
        self.state().stock.insert(id, amount);
    }

    /// Make catalog lookups for `id` fail until [`Self::recover`] is called.
    pub fn fail_catalog(&self, id: ProductId) {
        self.state().failing_catalog.insert(id);
    }

    /// Make stock lookups for `id` fail until [`Self::recover`] is called.
    pub fn fail_stock(&self, id: ProductId) {
        self.state().failing_stock.insert(id);
    }

    pub fn recover(&self, id: ProductId) {
        let mut state = self.state();
        state.failing_catalog.remove(&id);
        state.failing_stock.remove(&id);
    }

    /// Number of catalog lookups served so far.
    #[must_use]
    pub fn catalog_calls(&self) -> usize {
        self.state().catalog_calls
    }

    /// Number of stock lookups served so far.
    #[must_use]
    pub fn stock_calls(&self) -> usize {
        self.state().stock_calls
    }

    fn state(&self) -> MutexGuard<'_, InventoryState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn delay(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl CatalogService for InMemoryInventory {
    async fn get_product(&self, id: ProductId) -> Result<Product, ServiceError> {
        self.delay().await;
        let mut state = self.state();
        state.catalog_calls += 1;
        if state.failing_catalog.contains(&id) {
            return Err(ServiceError::Unavailable(format!("catalog lookup for {id}")));
        }
        state
            .products
            .get(&id)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(format!("product {id}")))
    }
}

#[async_trait]
impl StockService for InMemoryInventory {
    async fn get_stock(&self, id: ProductId) -> Result<Stock, ServiceError> {
        self.delay().await;
        let mut state = self.state();
        state.stock_calls += 1;
        if state.failing_stock.contains(&id) {
            return Err(ServiceError::Unavailable(format!("stock lookup for {id}")));
        }
        state
            .stock
            .get(&id)
            .map(|&amount| Stock { id, amount })
            .ok_or_else(|| ServiceError::NotFound(format!("stock {id}")))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn shoe(id: i32) -> Product {
        Product {
            id: ProductId::new(id),
            title: format!("Shoe {id}"),
            price: Decimal::new(17990, 2),
            image: String::new(),
        }
    }

    #[tokio::test]
    async fn test_lookups_and_counters() {
        let inventory = InMemoryInventory::new().with_product(shoe(1), 3);

        let stock = inventory.get_stock(ProductId::new(1)).await.unwrap();
        assert_eq!(stock.amount, 3);
        let product = inventory.get_product(ProductId::new(1)).await.unwrap();
        assert_eq!(product.title, "Shoe 1");

        assert_eq!(inventory.stock_calls(), 1);
        assert_eq!(inventory.catalog_calls(), 1);
    }

    #[tokio::test]
    async fn test_unknown_product_is_not_found() {
        let inventory = InMemoryInventory::new();
        assert!(matches!(
            inventory.get_stock(ProductId::new(5)).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            inventory.get_product(ProductId::new(5)).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_failure_injection_and_recovery() {
        let inventory = InMemoryInventory::new().with_product(shoe(1), 3);
        let handle = inventory.clone();
        handle.fail_stock(ProductId::new(1));
        handle.fail_catalog(ProductId::new(1));

        assert!(matches!(
            inventory.get_stock(ProductId::new(1)).await,
            Err(ServiceError::Unavailable(_))
        ));
        assert!(inventory.get_product(ProductId::new(1)).await.is_err());

        handle.recover(ProductId::new(1));
        handle.set_stock(ProductId::new(1), 7);
        assert_eq!(inventory.get_stock(ProductId::new(1)).await.unwrap().amount, 7);
    }
}
