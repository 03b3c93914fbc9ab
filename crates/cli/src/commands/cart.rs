//! Cart commands.
//!
//! Each invocation restores the cart from its snapshot, applies at most one
//! operation through the manager, and exits. The snapshot is written by the
//! manager itself, so nothing needs flushing here.
//!
//! Listing only reads the snapshot and works without the inventory API.

use std::sync::Arc;

use rocket_cart::{
    ApiClient, CartConfig, CartManager, CartStore, FileStore, LocalConfig, StoreError,
    TracingSink,
};
use rocket_cart_core::{Cart, CurrencyCode, Price, ProductId};
use thiserror::Error;
use tracing::info;

/// The manager rejected the requested operation.
///
/// Details have already been reported through the notification sink.
#[derive(Debug, Error)]
#[error("{operation} of product {id} was rejected")]
pub struct Rejected {
    operation: &'static str,
    id: ProductId,
}

/// A loaded cart plus the settings needed to display it.
pub struct Session {
    manager: CartManager,
    currency: CurrencyCode,
}

impl Session {
    /// Load configuration and restore the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is missing or invalid, the HTTP
    /// client cannot be built, or the snapshot cannot be read.
    pub async fn open() -> Result<Self, Box<dyn std::error::Error>> {
        let config = CartConfig::from_env()?;
        info!(
            api = %config.api.base_url,
            snapshot_dir = %config.snapshot.dir.display(),
            snapshot_key = %config.snapshot.key,
            "Opening cart"
        );

        let api = Arc::new(ApiClient::new(&config.api)?);
        let store = Arc::new(FileStore::new(&config.snapshot.dir, &config.snapshot.key));
        let manager = CartManager::load(api.clone(), api, store, Arc::new(TracingSink)).await?;

        Ok(Self {
            manager,
            currency: config.currency,
        })
    }

    /// Log the cart contents.
    pub async fn list(&self) {
        let cart = self.manager.cart().await;
        for line in render_cart(&cart, self.currency) {
            info!("{line}");
        }
    }

    /// Add one unit of `id`.
    ///
    /// # Errors
    ///
    /// Returns `Rejected` if the manager refused the operation.
    pub async fn add(&self, id: ProductId) -> Result<(), Rejected> {
        accepted(self.manager.add(id).await, "add", id)?;
        self.list().await;
        Ok(())
    }

    /// Remove `id` from the cart.
    ///
    /// # Errors
    ///
    /// Returns `Rejected` if the manager refused the operation.
    pub async fn remove(&self, id: ProductId) -> Result<(), Rejected> {
        accepted(self.manager.remove(id).await, "remove", id)?;
        self.list().await;
        Ok(())
    }

    /// Set the amount of `id`.
    ///
    /// # Errors
    ///
    /// Returns `Rejected` if the manager refused the operation.
    pub async fn update(&self, id: ProductId, amount: i64) -> Result<(), Rejected> {
        accepted(self.manager.update_amount(id, amount).await, "update", id)?;
        self.list().await;
        Ok(())
    }
}

/// Log the saved cart without opening an inventory session.
///
/// # Errors
///
/// Returns an error if configuration is invalid or the snapshot cannot be
/// read.
pub async fn list_saved() -> Result<(), Box<dyn std::error::Error>> {
    let config = LocalConfig::from_env()?;
    for line in saved_cart_lines(&config).await? {
        info!("{line}");
    }
    Ok(())
}

async fn saved_cart_lines(config: &LocalConfig) -> Result<Vec<String>, StoreError> {
    let store = FileStore::new(&config.snapshot.dir, &config.snapshot.key);
    let cart = store.load().await?.unwrap_or_default();
    Ok(render_cart(&cart, config.currency))
}

const fn accepted(changed: bool, operation: &'static str, id: ProductId) -> Result<(), Rejected> {
    if changed {
        Ok(())
    } else {
        Err(Rejected { operation, id })
    }
}

/// One line per cart item, followed by a totals line.
fn render_cart(cart: &Cart, currency: CurrencyCode) -> Vec<String> {
    if cart.is_empty() {
        return vec!["Cart is empty".to_string()];
    }

    let mut lines: Vec<String> = cart
        .iter()
        .map(|item| {
            format!(
                "#{id} {title} x{amount} @ {unit} = {total}",
                id = item.id(),
                title = item.product.title,
                amount = item.amount,
                unit = item.product.price_in(currency),
                total = Price::new(item.line_total(), currency),
            )
        })
        .collect();

    lines.push(format!(
        "{products} product(s), {units} unit(s), subtotal {subtotal}",
        products = cart.len(),
        units = cart.total_units(),
        subtotal = Price::new(cart.subtotal(), currency),
    ));
    lines
}
