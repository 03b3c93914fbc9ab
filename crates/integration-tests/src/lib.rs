//! Integration tests for Rocket Cart.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p rocket-cart-integration-tests
//! ```
//!
//! No external services are needed: [`InventoryServer`] serves a fake
//! inventory API (`/products/{id}`, `/stock/{id}`) with `axum` on an
//! ephemeral local port, and the tests drive a real [`rocket_cart::ApiClient`]
//! against it.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header::AUTHORIZATION};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing::get};
use rocket_cart_core::{Product, ProductId};
use rust_decimal::Decimal;
use serde_json::json;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use url::Url;

/// Shared, mutable state behind the fake API.
#[derive(Clone, Default)]
struct ApiState {
    inner: Arc<Mutex<ApiData>>,
}

#[derive(Default)]
struct ApiData {
    products: HashMap<i32, Product>,
    stock: HashMap<i32, u32>,
    outage: bool,
    delay: Option<Duration>,
    product_hits: usize,
    stock_hits: usize,
    last_authorization: Option<String>,
}

impl ApiState {
    fn data(&self) -> MutexGuard<'_, ApiData> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record the request and return the configured delay, or an error
    /// response while an outage is simulated.
    fn observe(&self, headers: &HeaderMap) -> Result<Option<Duration>, Response> {
        let mut data = self.data();
        data.last_authorization = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        if data.outage {
            return Err((StatusCode::SERVICE_UNAVAILABLE, "maintenance").into_response());
        }
        Ok(data.delay)
    }
}

async fn get_product(
    State(state): State<ApiState>,
    Path(id): Path<i32>,
    headers: HeaderMap,
) -> Response {
    let delay = match state.observe(&headers) {
        Ok(delay) => delay,
        Err(response) => return response,
    };
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let mut data = state.data();
    data.product_hits += 1;
    match data.products.get(&id) {
        Some(product) => Json(product.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({}))).into_response(),
    }
}

async fn get_stock(
    State(state): State<ApiState>,
    Path(id): Path<i32>,
    headers: HeaderMap,
) -> Response {
    let delay = match state.observe(&headers) {
        Ok(delay) => delay,
        Err(response) => return response,
    };
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let mut data = state.data();
    data.stock_hits += 1;
    match data.stock.get(&id) {
        Some(amount) => Json(json!({ "id": id, "amount": amount })).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({}))).into_response(),
    }
}

/// A fake inventory API running in the background.
///
/// The server task is aborted when this handle is dropped.
pub struct InventoryServer {
    addr: SocketAddr,
    state: ApiState,
    handle: JoinHandle<()>,
}

impl InventoryServer {
    /// Bind to an ephemeral port and start serving.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn start() -> Self {
        let state = ApiState::default();
        let app = Router::new()
            .route("/products/{id}", get(get_product))
            .route("/stock/{id}", get(get_stock))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake inventory API");
        let addr = listener
            .local_addr()
            .expect("Failed to read fake inventory API address");

        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            addr,
            state,
            handle,
        }
    }

    /// Start a server preloaded with [`rocketshoes_catalog`].
    pub async fn with_catalog() -> Self {
        let server = Self::start().await;
        for (product, stock) in rocketshoes_catalog() {
            server.insert(product, stock);
        }
        server
    }

    /// Base URL to configure an `ApiClient` with.
    ///
    /// # Panics
    ///
    /// Panics if the bound address does not form a valid URL.
    #[must_use]
    pub fn base_url(&self) -> Url {
        Url::parse(&format!("http://{}", self.addr)).expect("Bound address is a valid URL")
    }

    /// Serve `product` with `stock` units available.
    pub fn insert(&self, product: Product, stock: u32) {
        let mut data = self.state.data();
        data.stock.insert(product.id.as_i32(), stock);
        data.products.insert(product.id.as_i32(), product);
    }

    /// Serve stock for an ID without a catalog entry.
    pub fn set_stock(&self, id: ProductId, amount: u32) {
        self.state.data().stock.insert(id.as_i32(), amount);
    }

    /// Answer every request with 503 while `outage` is set.
    pub fn set_outage(&self, outage: bool) {
        self.state.data().outage = outage;
    }

    /// Delay every successful answer.
    pub fn set_delay(&self, delay: Option<Duration>) {
        self.state.data().delay = delay;
    }

    /// Product requests answered so far (outages excluded).
    #[must_use]
    pub fn product_hits(&self) -> usize {
        self.state.data().product_hits
    }

    /// Stock requests answered so far (outages excluded).
    #[must_use]
    pub fn stock_hits(&self) -> usize {
        self.state.data().stock_hits
    }

    /// `Authorization` header of the most recent request.
    #[must_use]
    pub fn last_authorization(&self) -> Option<String> {
        self.state.data().last_authorization.clone()
    }
}

impl Drop for InventoryServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Build a catalog product.
#[must_use]
pub fn shoe(id: i32, title: &str, price_cents: i64) -> Product {
    Product {
        id: ProductId::new(id),
        title: title.to_string(),
        price: Decimal::new(price_cents, 2),
        image: format!("https://rocketseat-cdn.s3-sa-east-1.amazonaws.com/modulo-redux/tenis{id}.jpg"),
    }
}

/// Sample catalog with stock levels.
#[must_use]
pub fn rocketshoes_catalog() -> Vec<(Product, u32)> {
    vec![
        (shoe(1, "Tênis de Caminhada Leve Confortável", 17990), 3),
        (shoe(2, "Tênis VR Caminhada Confortável Detalhes Couro Masculino", 13990), 5),
        (shoe(3, "Tênis Adidas Duramo Lite 2.0", 21990), 2),
        (shoe(4, "Tênis VR Caminhada Confortável Detalhes Couro Masculino", 13990), 1),
        (shoe(5, "Tênis VR Caminhada Confortável Detalhes Couro Masculino", 13990), 5),
        (shoe(6, "Tênis Adidas Duramo Lite 2.0", 21990), 10),
    ]
}
