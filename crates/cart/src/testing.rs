//! In-memory test doubles for the cart's collaborators.
//!
//! Available in this crate's tests and to other crates through the `testing`
//! feature.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rocketshoes_core::{Price, Product, ProductId, Stock};

use crate::inventory::{InventoryError, InventoryLookup};
use crate::notify::Notifier;
use crate::storage::{KeyValueStore, StorageError};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A product with a predictable title, image and price.
#[must_use]
pub fn sample_product(id: i32) -> Product {
    Product::new(
        ProductId::new(id),
        format!("Tênis {id}"),
        Price::from_cents(13990 + i64::from(id)),
        format!("https://rocketseat-cdn.s3-sa-east-1.amazonaws.com/modulo-redux/tenis{id}.jpg"),
    )
}

#[derive(Debug, Default)]
struct InventoryState {
    products: HashMap<ProductId, Product>,
    stock: HashMap<ProductId, u32>,
    failing: Vec<ProductId>,
    stock_calls: HashMap<ProductId, usize>,
    product_calls: HashMap<ProductId, usize>,
}

/// An [`InventoryLookup`] answering from a fixed table.
///
/// Unknown ids answer [`InventoryError::NotFound`]. Ids marked with
/// [`StaticInventory::fail_on`] answer an API error, standing in for a
/// network failure. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct StaticInventory {
    state: Arc<Mutex<InventoryState>>,
}

impl StaticInventory {
    /// Create an empty inventory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a product with the given stock level.
    #[must_use]
    pub fn with_product(self, product: Product, stock: u32) -> Self {
        self.with_product_at(product.id, product, stock)
    }

    /// Serve `product` and `stock` for lookups of `id`, whatever id the
    /// product record itself carries.
    #[must_use]
    pub fn with_product_at(self, id: ProductId, product: Product, stock: u32) -> Self {
        {
            let mut state = lock(&self.state);
            state.stock.insert(id, stock);
            state.products.insert(id, product);
        }
        self
    }

    /// Change the stock level of a product.
    pub fn set_stock(&self, id: ProductId, amount: u32) {
        lock(&self.state).stock.insert(id, amount);
    }

    /// Make every lookup for `id` fail.
    pub fn fail_on(&self, id: ProductId) {
        lock(&self.state).failing.push(id);
    }

    /// Number of stock lookups made for `id`.
    #[must_use]
    pub fn stock_calls(&self, id: ProductId) -> usize {
        lock(&self.state).stock_calls.get(&id).copied().unwrap_or(0)
    }

    /// Number of product lookups made for `id`.
    #[must_use]
    pub fn product_calls(&self, id: ProductId) -> usize {
        lock(&self.state).product_calls.get(&id).copied().unwrap_or(0)
    }
}

impl InventoryLookup for StaticInventory {
    async fn get_stock(&self, id: ProductId) -> Result<Stock, InventoryError> {
        let mut state = lock(&self.state);
        *state.stock_calls.entry(id).or_default() += 1;
        if state.failing.contains(&id) {
            return Err(InventoryError::Api {
                status: 503,
                message: "inventory unavailable".to_string(),
            });
        }
        state
            .stock
            .get(&id)
            .map(|&amount| Stock { id, amount })
            .ok_or(InventoryError::NotFound(id))
    }

    async fn get_product(&self, id: ProductId) -> Result<Product, InventoryError> {
        let mut state = lock(&self.state);
        *state.product_calls.entry(id).or_default() += 1;
        if state.failing.contains(&id) {
            return Err(InventoryError::Api {
                status: 503,
                message: "inventory unavailable".to_string(),
            });
        }
        state
            .products
            .get(&id)
            .cloned()
            .ok_or(InventoryError::NotFound(id))
    }
}

/// A [`Notifier`] that records every message.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    messages: Arc<Mutex<Vec<String>>>,
}

impl RecordingNotifier {
    /// Create a notifier with no messages.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages emitted so far, oldest first.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        lock(&self.messages).clone()
    }
}

impl Notifier for RecordingNotifier {
    fn error(&self, message: &str) {
        lock(&self.messages).push(message.to_string());
    }
}

/// A [`KeyValueStore`] that rejects every write.
#[derive(Debug, Clone)]
pub struct FailingStore {
    /// What every read returns; `None` makes reads fail too.
    stored: Option<String>,
}

impl FailingStore {
    /// A store that reads `value` for every key.
    #[must_use]
    pub fn with_value(value: &str) -> Self {
        Self {
            stored: Some(value.to_string()),
        }
    }

    /// A store whose reads fail as well as its writes.
    #[must_use]
    pub const fn unreadable() -> Self {
        Self { stored: None }
    }
}

impl KeyValueStore for FailingStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        self.stored
            .clone()
            .map(Some)
            .ok_or_else(|| StorageError::Io(std::io::Error::other("permission denied")))
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Io(std::io::Error::other("disk full")))
    }
}
