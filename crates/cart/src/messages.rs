//! Messages shown to the shopper when a cart operation fails.

/// Requested amount exceeds the available stock (add or update).
pub const STOCK_EXCEEDED: &str = "Requested quantity is out of stock";

/// Adding a product failed for any other reason.
pub const ADD_FAILED: &str = "Failed to add product";

/// Removing a product failed.
pub const REMOVE_FAILED: &str = "Failed to remove product";

/// Changing a product's amount failed for any reason other than stock.
pub const UPDATE_FAILED: &str = "Failed to update product quantity";
