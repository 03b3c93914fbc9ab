//! HTTP inventory API client.
//!
//! Talks to a JSON API exposing `GET {base}/products/{id}` and
//! `GET {base}/stock/{id}`. Product attributes are cached using `moka`
//! (default 5-minute TTL); stock readings always go to the network.

use std::sync::Arc;

use async_trait::async_trait;
use moka::future::Cache;
use reqwest::StatusCode;
use reqwest::header::ACCEPT;
use rocket_cart_core::{Product, ProductId, Stock};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use super::{CatalogService, ServiceError, StockService};
use crate::config::ApiConfig;

/// Maximum number of response body characters kept in errors and logs.
const BODY_PREVIEW_CHARS: usize = 200;

/// Client for the inventory API.
///
/// Cheap to clone; clones share the connection pool and catalog cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    token: Option<SecretString>,
    catalog_cache: Cache<ProductId, Product>,
}

impl ApiClient {
    /// Create a new inventory API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or the base URL
    /// cannot carry path segments.
    pub fn new(config: &ApiConfig) -> Result<Self, ServiceError> {
        if config.base_url.cannot_be_a_base() {
            return Err(ServiceError::InvalidUrl(config.base_url.to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        let catalog_cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(config.catalog_cache_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base_url.clone(),
                token: config.token.clone(),
                catalog_cache,
            }),
        })
    }

    /// Build `{base}/{resource}/{id}`, keeping any path prefix of the base.
    fn endpoint(&self, resource: &str, id: ProductId) -> Result<Url, ServiceError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ServiceError::InvalidUrl(self.inner.base_url.to_string()))?
            .pop_if_empty()
            .push(resource)
            .push(&id.to_string());
        Ok(url)
    }

    /// GET a JSON resource.
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ServiceError> {
        let mut request = self
            .inner
            .client
            .get(url.clone())
            .header(ACCEPT, "application/json");
        if let Some(token) = &self.inner.token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().await?;
        let status = response.status();

        // Get response body as text first for better error diagnostics
        let body = response.text().await?;

        if status == StatusCode::NOT_FOUND {
            return Err(ServiceError::NotFound(url.path().to_string()));
        }

        if !status.is_success() {
            let preview: String = body.chars().take(BODY_PREVIEW_CHARS).collect();
            tracing::error!(
                status = %status,
                url = %url,
                body = %preview,
                "Inventory API returned non-success status"
            );
            return Err(ServiceError::Status {
                status: status.as_u16(),
                body: preview,
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                url = %url,
                body = %body.chars().take(BODY_PREVIEW_CHARS).collect::<String>(),
                "Failed to parse inventory API response"
            );
            ServiceError::Parse(e)
        })
    }
}

#[async_trait]
impl CatalogService for ApiClient {
    #[instrument(skip(self), fields(product_id = %id))]
    async fn get_product(&self, id: ProductId) -> Result<Product, ServiceError> {
        if let Some(product) = self.inner.catalog_cache.get(&id).await {
            debug!("Cache hit for product");
            return Ok(product);
        }

        let product: Product = self.get_json(self.endpoint("products", id)?).await?;
        if product.id != id {
            return Err(ServiceError::Mismatch {
                requested: id,
                received: product.id,
            });
        }

        self.inner.catalog_cache.insert(id, product.clone()).await;
        Ok(product)
    }
}

#[async_trait]
impl StockService for ApiClient {
    #[instrument(skip(self), fields(product_id = %id))]
    async fn get_stock(&self, id: ProductId) -> Result<Stock, ServiceError> {
        let stock: Stock = self.get_json(self.endpoint("stock", id)?).await?;
        if stock.id != id {
            return Err(ServiceError::Mismatch {
                requested: id,
                received: stock.id,
            });
        }
        debug!(available = stock.amount, "Stock reading");
        Ok(stock)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(&ApiConfig::new(Url::parse(base).unwrap())).unwrap()
    }

    #[test]
    fn test_endpoint_without_prefix() {
        let api = client("http://localhost:3333");
        let url = api.endpoint("stock", ProductId::new(4)).unwrap();
        assert_eq!(url.as_str(), "http://localhost:3333/stock/4");
    }

    #[test]
    fn test_endpoint_keeps_path_prefix() {
        let api = client("https://shop.example.com/api/v1/");
        let url = api.endpoint("products", ProductId::new(12)).unwrap();
        assert_eq!(url.as_str(), "https://shop.example.com/api/v1/products/12");
    }

    #[test]
    fn test_rejects_non_base_url() {
        let config = ApiConfig::new(Url::parse("mailto:shop@example.com").unwrap());
        assert!(matches!(
            ApiClient::new(&config),
            Err(ServiceError::InvalidUrl(_))
        ));
    }
}
