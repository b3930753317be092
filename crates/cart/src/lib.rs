//! RocketShoes Cart - Shopping cart state for the storefront.
//!
//! [`CartStore`] holds the shopper's cart, validates every change against live
//! stock from an [`InventoryLookup`], mirrors the cart to a [`KeyValueStore`]
//! after each change, and reports failures through a [`Notifier`].
//!
//! # Architecture
//!
//! The store is generic over its three collaborators, so the same logic runs
//! against the real inventory API and file storage in the CLI and against
//! in-memory doubles in tests.
//!
//! - [`HttpInventory`] - REST inventory API client with a product cache
//! - [`FileStore`] / [`MemoryStore`] - key-value storage
//!
//! # Example
//!
//! ```rust,ignore
//! use rocketshoes_cart::{CartConfig, CartStore, FileStore, HttpInventory, Notifier};
//!
//! struct Toast;
//!
//! impl Notifier for Toast {
//!     fn error(&self, message: &str) {
//!         eprintln!("{message}");
//!     }
//! }
//!
//! let config = CartConfig::from_env()?;
//! let mut store = CartStore::hydrate(
//!     HttpInventory::new(&config.inventory)?,
//!     FileStore::new(&config.storage.path),
//!     Toast,
//!     config.storage.key.clone(),
//! );
//!
//! store.add_product(ProductId::new(1)).await;
//! println!("{} items", store.cart().item_count());
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod inventory;
pub mod messages;
pub mod notify;
pub mod storage;
pub mod store;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use config::{CartConfig, ConfigError, DEFAULT_STORAGE_KEY, InventoryConfig, StorageConfig};
pub use error::{CartError, Operation, Result};
pub use inventory::{HttpInventory, InventoryError, InventoryLookup};
pub use notify::Notifier;
pub use rocketshoes_core::{Cart, LineItem, Price, Product, ProductId, Stock};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
pub use store::{CartStore, UpdateProductAmount};
