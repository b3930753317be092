//! Product and stock lookups.
//!
//! The cart never decides on its own how many units of a product exist. Every
//! add or quantity change asks an [`InventoryLookup`] for a fresh [`Stock`]
//! record, and the first add of a product fetches its display data.
//!
//! [`HttpInventory`] talks to the storefront's REST inventory API:
//!
//! - `GET {api_url}/stock/{id}` → `{ "id": 1, "amount": 3 }`
//! - `GET {api_url}/products/{id}` → `{ "id": 1, "title": "...", "price": 179.9, "image": "..." }`

mod http;

use std::future::Future;

use rocketshoes_core::{Product, ProductId, Stock};
use thiserror::Error;

pub use http::HttpInventory;

/// Errors that can occur when querying the inventory API.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API has no record for this product.
    #[error("Product not found: {0}")]
    NotFound(ProductId),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The API answered with a record for a different product.
    #[error("Requested product {requested} but received {received}")]
    Mismatch {
        requested: ProductId,
        received: ProductId,
    },

    /// The configured API token cannot be sent as a header.
    #[error("Invalid API token format")]
    InvalidToken,

    /// A request URL could not be built from the configured base URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Source of product display data and stock levels.
pub trait InventoryLookup {
    /// Fetch the current stock level for a product.
    fn get_stock(
        &self,
        id: ProductId,
    ) -> impl Future<Output = Result<Stock, InventoryError>> + Send;

    /// Fetch display data for a product.
    fn get_product(
        &self,
        id: ProductId,
    ) -> impl Future<Output = Result<Product, InventoryError>> + Send;
}
