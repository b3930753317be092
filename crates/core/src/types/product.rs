//! Product and stock records served by the inventory API.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::id::ProductId;
use super::price::Price;

/// Display data for a product.
///
/// Only `id` is interpreted. Every other attribute the inventory API returns
/// (title, price, image, ...) is kept verbatim in `attributes` and serialized
/// back unchanged, so a stored cart line carries exactly what the API sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Product {
    /// Create a product with the usual display attributes.
    #[must_use]
    pub fn new(id: ProductId, title: impl Into<String>, price: Price, image: impl Into<String>) -> Self {
        let mut attributes = Map::new();
        attributes.insert("title".to_string(), Value::String(title.into()));
        attributes.insert(
            "price".to_string(),
            serde_json::to_value(price).unwrap_or(Value::Null),
        );
        attributes.insert("image".to_string(), Value::String(image.into()));
        Self { id, attributes }
    }

    /// The `title` attribute, if present and a string.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.attributes.get("title").and_then(Value::as_str)
    }

    /// The `price` attribute, if present and a number or numeric string.
    #[must_use]
    pub fn price(&self) -> Option<Price> {
        self.attributes
            .get("price")
            .and_then(|value| Price::deserialize(value).ok())
    }
}

/// Units of a product available for purchase.
///
/// Always fetched fresh from the inventory API; never cached or persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stock {
    pub id: ProductId,
    pub amount: u32,
}
