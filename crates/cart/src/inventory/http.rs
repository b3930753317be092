//! REST inventory API client.
//!
//! Products are cached using `moka` (TTL from configuration). Stock levels are
//! never cached: every call goes to the API.

use std::sync::Arc;

use moka::future::Cache;
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use rocketshoes_core::{Product, ProductId, Stock};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use super::{InventoryError, InventoryLookup};
use crate::config::InventoryConfig;

/// Longest slice of an error body kept in logs and errors.
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Client for the inventory API.
///
/// Cheap to clone; clones share the HTTP connection pool and product cache.
#[derive(Clone)]
pub struct HttpInventory {
    inner: Arc<HttpInventoryInner>,
}

struct HttpInventoryInner {
    client: reqwest::Client,
    base_url: Url,
    products: Cache<ProductId, Product>,
}

impl HttpInventory {
    /// Create a new inventory API client.
    ///
    /// # Errors
    ///
    /// Returns error if the token is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &InventoryConfig) -> Result<Self, InventoryError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(token) = &config.api_token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
                .map_err(|_| InventoryError::InvalidToken)?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()?;

        let products = Cache::builder()
            .max_capacity(1000)
            .time_to_live(config.product_cache_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(HttpInventoryInner {
                client,
                base_url: config.api_url.clone(),
                products,
            }),
        })
    }

    /// GET `{base_url}/{collection}/{id}` and decode the JSON body.
    async fn fetch<T: DeserializeOwned>(
        &self,
        collection: &str,
        id: ProductId,
    ) -> Result<T, InventoryError> {
        let url = self.inner.base_url.join(&format!("{collection}/{id}"))?;

        let response = self.inner.client.get(url).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(InventoryError::NotFound(id));
        }

        // Get response body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            let message = body.chars().take(MAX_ERROR_BODY_CHARS).collect::<String>();
            tracing::error!(
                status = %status,
                body = %message,
                "Inventory API returned non-success status"
            );
            return Err(InventoryError::Api {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(MAX_ERROR_BODY_CHARS).collect::<String>(),
                "Failed to parse inventory API response"
            );
            InventoryError::Parse(e)
        })
    }
}

impl InventoryLookup for HttpInventory {
    #[instrument(skip(self))]
    async fn get_stock(&self, id: ProductId) -> Result<Stock, InventoryError> {
        self.fetch("stock", id).await
    }

    #[instrument(skip(self))]
    async fn get_product(&self, id: ProductId) -> Result<Product, InventoryError> {
        if let Some(product) = self.inner.products.get(&id).await {
            debug!("Cache hit for product");
            return Ok(product);
        }

        let product: Product = self.fetch("products", id).await?;
        self.inner.products.insert(id, product.clone()).await;
        Ok(product)
    }
}
