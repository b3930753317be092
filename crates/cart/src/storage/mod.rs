//! Durable string key-value storage for the cart.
//!
//! The cart is written as one JSON string under one key after every
//! successful mutation (a full overwrite, last write wins), much like a
//! browser's `localStorage`.

mod file;
mod memory;

use thiserror::Error;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Errors that can occur when reading or writing the store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file exists but is not a JSON object of strings.
    #[error("Corrupt store: {0}")]
    Corrupt(#[from] serde_json::Error),

    /// Another thread panicked while holding the store lock.
    #[error("Store lock poisoned")]
    Poisoned,
}

/// A string-keyed durable store.
pub trait KeyValueStore {
    /// Read the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}
