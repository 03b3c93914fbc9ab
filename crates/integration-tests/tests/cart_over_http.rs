//! End-to-end cart tests against the fake inventory API.
//!
//! Each test runs a real `ApiClient` over HTTP and a `FileStore` in a
//! temporary directory, so stock checks, catalog lookups and snapshots all
//! take their production paths.

use std::sync::Arc;
use std::time::Duration;

use rocket_cart::{
    ApiClient, ApiConfig, Cart, CartManager, CartStore, FileStore, Notification, NotificationKind,
    ProductId,
};
use rocket_cart_integration_tests::{InventoryServer, shoe};
use secrecy::SecretString;
use tempfile::TempDir;
use tokio::sync::mpsc;

struct Fixture {
    manager: CartManager,
    store: FileStore,
    notifications: mpsc::UnboundedReceiver<Notification>,
}

impl Fixture {
    async fn open(config: &ApiConfig, dir: &TempDir) -> Self {
        let api = Arc::new(ApiClient::new(config).expect("Failed to build API client"));
        let store = FileStore::new(dir.path(), "rocketshoes-cart");
        let (tx, notifications) = mpsc::unbounded_channel();
        let manager = CartManager::load(api.clone(), api, Arc::new(store.clone()), Arc::new(tx))
            .await
            .expect("Failed to load cart");
        Self {
            manager,
            store,
            notifications,
        }
    }

    async fn connect(server: &InventoryServer, dir: &TempDir) -> Self {
        Self::open(&ApiConfig::new(server.base_url()), dir).await
    }

    fn kinds(&mut self) -> Vec<NotificationKind> {
        let mut kinds = Vec::new();
        while let Ok(n) = self.notifications.try_recv() {
            kinds.push(n.kind);
        }
        kinds
    }

    async fn amounts(&self) -> Vec<(i32, u32)> {
        self.manager
            .cart()
            .await
            .iter()
            .map(|item| (item.id().as_i32(), item.amount))
            .collect()
    }

    async fn stored(&self) -> Option<Cart> {
        self.store.load().await.expect("Failed to read snapshot")
    }
}

// =============================================================================
// Add
// =============================================================================

#[tokio::test]
async fn test_add_creates_then_increments() {
    let server = InventoryServer::start().await;
    server.insert(shoe(1, "Tênis de Caminhada Leve Confortável", 17990), 5);
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let mut fx = Fixture::connect(&server, &dir).await;

    assert!(fx.manager.add(ProductId::new(1)).await);
    assert_eq!(fx.amounts().await, vec![(1, 1)]);

    assert!(fx.manager.add(ProductId::new(1)).await);
    assert_eq!(fx.amounts().await, vec![(1, 2)]);

    assert!(fx.kinds().is_empty());
    assert_eq!(fx.stored().await, Some(fx.manager.cart().await));
}

#[tokio::test]
async fn test_snapshot_file_is_plain_item_array() {
    let server = InventoryServer::start().await;
    server.insert(shoe(1, "Tênis de Caminhada Leve Confortável", 17990), 5);
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let fx = Fixture::connect(&server, &dir).await;

    fx.manager.add(ProductId::new(1)).await;
    fx.manager.add(ProductId::new(1)).await;

    let raw = std::fs::read_to_string(fx.store.path()).expect("Snapshot file missing");
    assert_eq!(
        raw,
        r#"[{"id":1,"title":"Tênis de Caminhada Leve Confortável","price":179.90,"image":"https://rocketseat-cdn.s3-sa-east-1.amazonaws.com/modulo-redux/tenis1.jpg","amount":2}]"#
    );
}

#[tokio::test]
async fn test_add_at_stock_limit_is_rejected() {
    let server = InventoryServer::start().await;
    server.insert(shoe(1, "Tênis", 17990), 2);
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let mut fx = Fixture::connect(&server, &dir).await;

    assert!(fx.manager.add(ProductId::new(1)).await);
    assert!(fx.manager.add(ProductId::new(1)).await);
    assert!(!fx.manager.add(ProductId::new(1)).await);
    assert!(!fx.manager.add(ProductId::new(1)).await);

    assert_eq!(fx.amounts().await, vec![(1, 2)]);
    assert_eq!(fx.kinds(), vec![NotificationKind::StockExceeded; 2]);
}

#[tokio::test]
async fn test_add_with_missing_catalog_entry() {
    let server = InventoryServer::start().await;
    server.set_stock(ProductId::new(99), 4);
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let mut fx = Fixture::connect(&server, &dir).await;

    assert!(!fx.manager.add(ProductId::new(99)).await);

    assert!(fx.manager.cart().await.is_empty());
    assert_eq!(fx.kinds(), vec![NotificationKind::AddFailed]);
    assert_eq!(fx.stored().await, None);
}

#[tokio::test]
async fn test_catalog_is_cached_but_stock_is_not() {
    let server = InventoryServer::with_catalog().await;
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let fx = Fixture::connect(&server, &dir).await;

    assert!(fx.manager.add(ProductId::new(2)).await);
    assert!(fx.manager.remove(ProductId::new(2)).await);
    assert!(fx.manager.add(ProductId::new(2)).await);

    assert_eq!(server.product_hits(), 1);
    assert_eq!(server.stock_hits(), 2);
}

// =============================================================================
// Remove
// =============================================================================

#[tokio::test]
async fn test_remove_twice() {
    let server = InventoryServer::with_catalog().await;
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let mut fx = Fixture::connect(&server, &dir).await;

    fx.manager.add(ProductId::new(1)).await;
    fx.manager.add(ProductId::new(1)).await;

    assert!(fx.manager.remove(ProductId::new(1)).await);
    assert!(fx.manager.cart().await.is_empty());
    assert_eq!(fx.stored().await, Some(Cart::new()));

    assert!(!fx.manager.remove(ProductId::new(1)).await);
    assert_eq!(fx.kinds(), vec![NotificationKind::RemoveFailed]);
}

// =============================================================================
// Update amount
// =============================================================================

#[tokio::test]
async fn test_update_amount_bounds() {
    let server = InventoryServer::with_catalog().await;
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let mut fx = Fixture::connect(&server, &dir).await;

    // Product 1 has 3 units in stock
    fx.manager.add(ProductId::new(1)).await;
    assert!(fx.manager.update_amount(ProductId::new(1), 3).await);
    assert_eq!(fx.amounts().await, vec![(1, 3)]);

    assert!(!fx.manager.update_amount(ProductId::new(1), 0).await);
    assert!(!fx.manager.update_amount(ProductId::new(1), 4).await);
    assert_eq!(fx.amounts().await, vec![(1, 3)]);
    assert_eq!(fx.kinds(), vec![NotificationKind::StockExceeded; 2]);
}

#[tokio::test]
async fn test_update_amount_of_absent_product() {
    let server = InventoryServer::with_catalog().await;
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let mut fx = Fixture::connect(&server, &dir).await;

    assert!(!fx.manager.update_amount(ProductId::new(6), 2).await);
    assert_eq!(fx.kinds(), vec![NotificationKind::UpdateFailed]);
    assert_eq!(server.stock_hits(), 1);
}

// =============================================================================
// Failures and recovery
// =============================================================================

#[tokio::test]
async fn test_outage_leaves_cart_unchanged() {
    let server = InventoryServer::with_catalog().await;
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let mut fx = Fixture::connect(&server, &dir).await;

    fx.manager.add(ProductId::new(5)).await;
    server.set_outage(true);

    assert!(!fx.manager.add(ProductId::new(5)).await);
    assert!(!fx.manager.add(ProductId::new(6)).await);
    assert!(!fx.manager.update_amount(ProductId::new(5), 2).await);

    assert_eq!(fx.amounts().await, vec![(5, 1)]);
    assert_eq!(
        fx.kinds(),
        vec![
            NotificationKind::AddFailed,
            NotificationKind::AddFailed,
            NotificationKind::UpdateFailed,
        ]
    );

    server.set_outage(false);
    assert!(fx.manager.add(ProductId::new(5)).await);
    assert_eq!(fx.amounts().await, vec![(5, 2)]);
}

#[tokio::test]
async fn test_timeout_is_an_ordinary_failure() {
    let server = InventoryServer::with_catalog().await;
    server.set_delay(Some(Duration::from_millis(500)));
    let dir = tempfile::tempdir().expect("Failed to create temp dir");

    let mut config = ApiConfig::new(server.base_url());
    config.timeout = Duration::from_millis(50);
    let mut fx = Fixture::open(&config, &dir).await;

    assert!(!fx.manager.add(ProductId::new(1)).await);
    assert!(fx.manager.cart().await.is_empty());
    assert_eq!(fx.kinds(), vec![NotificationKind::AddFailed]);
}

#[tokio::test]
async fn test_bearer_token_is_sent() {
    let server = InventoryServer::with_catalog().await;
    let dir = tempfile::tempdir().expect("Failed to create temp dir");

    let mut config = ApiConfig::new(server.base_url());
    config.token = Some(SecretString::from("rk_live_9f8e7d6c"));
    let fx = Fixture::open(&config, &dir).await;

    assert!(fx.manager.add(ProductId::new(3)).await);
    assert_eq!(
        server.last_authorization().as_deref(),
        Some("Bearer rk_live_9f8e7d6c")
    );
}

// =============================================================================
// Restart
// =============================================================================

#[tokio::test]
async fn test_cart_survives_restart() {
    let server = InventoryServer::with_catalog().await;
    let dir = tempfile::tempdir().expect("Failed to create temp dir");

    let before = {
        let fx = Fixture::connect(&server, &dir).await;
        fx.manager.add(ProductId::new(3)).await;
        fx.manager.add(ProductId::new(6)).await;
        fx.manager.add(ProductId::new(3)).await;
        fx.manager.update_amount(ProductId::new(6), 7).await;
        fx.manager.cart().await
    };

    let fx = Fixture::connect(&server, &dir).await;
    assert_eq!(fx.manager.cart().await, before);
    assert_eq!(fx.amounts().await, vec![(3, 2), (6, 7)]);
}

#[tokio::test]
async fn test_concurrent_callers_are_serialized() {
    let server = InventoryServer::with_catalog().await;
    server.set_delay(Some(Duration::from_millis(5)));
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let fx = Fixture::connect(&server, &dir).await;
    let manager = Arc::new(fx.manager);

    // Product 3 has 2 units in stock
    let tasks: Vec<_> = (0..6)
        .map(|_| {
            let manager = Arc::clone(&manager);
            tokio::spawn(async move { manager.add(ProductId::new(3)).await })
        })
        .collect();

    let mut accepted = 0;
    for task in tasks {
        if task.await.expect("Task panicked") {
            accepted += 1;
        }
    }

    assert_eq!(accepted, 2);
    let cart = manager.cart().await;
    assert_eq!(cart.amount_of(ProductId::new(3)), 2);
    assert_eq!(fx.store.load().await.expect("Failed to read snapshot"), Some(cart));
}
