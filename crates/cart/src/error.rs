//! Unified error handling for cart operations.
//!
//! `CartError` is what the `try_*` operations on
//! [`CartStore`](crate::CartStore) return. The notifying operations turn it
//! into one of the [`messages`](crate::messages) instead.

use rocketshoes_core::ProductId;
use thiserror::Error;

use crate::inventory::InventoryError;
use crate::messages;
use crate::storage::StorageError;

/// Cart operation that failed, used to pick the message shown to the shopper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Add,
    Remove,
    Update,
}

/// Cart-level error type.
#[derive(Debug, Error)]
pub enum CartError {
    /// Requested amount is more than the inventory has.
    #[error("Stock exceeded for product {product_id}: requested {requested}, available {available}")]
    StockExceeded {
        product_id: ProductId,
        requested: u32,
        available: u32,
    },

    /// The product is not in the cart.
    #[error("Product not in cart: {0}")]
    ItemNotFound(ProductId),

    /// Inventory lookup failed.
    #[error("Inventory error: {0}")]
    Lookup(#[from] InventoryError),

    /// Writing the cart to storage failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The cart could not be serialized.
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl CartError {
    /// Message shown to the shopper when `operation` fails with this error.
    #[must_use]
    pub const fn user_message(&self, operation: Operation) -> &'static str {
        match (self, operation) {
            (Self::StockExceeded { .. }, _) => messages::STOCK_EXCEEDED,
            (_, Operation::Add) => messages::ADD_FAILED,
            (_, Operation::Remove) => messages::REMOVE_FAILED,
            (_, Operation::Update) => messages::UPDATE_FAILED,
        }
    }
}

/// Result type alias for `CartError`.
pub type Result<T> = std::result::Result<T, CartError>;
