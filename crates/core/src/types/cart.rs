//! Cart line items and the cart collection.
//!
//! A [`Cart`] is an ordered list of [`LineItem`]s in the order products were
//! first added. It holds at most one line per product, and every line has an
//! amount of at least one.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::id::ProductId;
use super::price::Price;
use super::product::Product;

/// Errors that can occur when building a [`LineItem`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    /// Line items must hold at least one unit.
    #[error("amount for product {0} must be at least 1")]
    Zero(ProductId),
}

/// A product in the cart together with how many units were requested.
///
/// Serialized flat: the product's fields and `amount` sit side by side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(flatten)]
    pub product: Product,
    pub amount: u32,
}

impl LineItem {
    /// Create a line item.
    ///
    /// # Errors
    ///
    /// Returns [`AmountError::Zero`] if `amount` is zero.
    pub fn new(product: Product, amount: u32) -> Result<Self, AmountError> {
        if amount == 0 {
            return Err(AmountError::Zero(product.id));
        }
        Ok(Self { product, amount })
    }

    /// The product this line refers to.
    #[must_use]
    pub const fn id(&self) -> ProductId {
        self.product.id
    }

    /// Unit price times amount, if the product carries a readable price.
    #[must_use]
    pub fn subtotal(&self) -> Option<Price> {
        self.product.price().map(|price| price.times(self.amount))
    }
}

/// An ordered collection of line items.
///
/// The only ways to change a cart are [`Cart::insert`], [`Cart::set_amount`]
/// and [`Cart::remove`], each of which keeps the one-line-per-product and
/// amount-at-least-one rules.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a cart from stored lines, discarding any that break the cart rules.
    ///
    /// Lines with a zero amount are dropped, and when an id appears more than
    /// once only its first line is kept. The dropped lines are returned
    /// alongside the cart so the caller can report them.
    #[must_use]
    pub fn from_lines(lines: Vec<LineItem>) -> (Self, Vec<LineItem>) {
        let mut seen = HashSet::new();
        let mut items = Vec::with_capacity(lines.len());
        let mut rejected = Vec::new();

        for line in lines {
            if line.amount == 0 || !seen.insert(line.id()) {
                rejected.push(line);
            } else {
                items.push(line);
            }
        }

        (Self { items }, rejected)
    }

    /// Iterate over line items in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, LineItem> {
        self.items.iter()
    }

    /// Number of distinct products in the cart.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Find the line for a product.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&LineItem> {
        self.items.iter().find(|line| line.id() == id)
    }

    /// Position of the line for a product.
    #[must_use]
    pub fn position(&self, id: ProductId) -> Option<usize> {
        self.items.iter().position(|line| line.id() == id)
    }

    /// Amount held for a product, zero if it is not in the cart.
    #[must_use]
    pub fn amount_of(&self, id: ProductId) -> u32 {
        self.get(id).map_or(0, |line| line.amount)
    }

    /// Append a line, or replace the existing line for the same product in
    /// place. Returns the replaced line.
    pub fn insert(&mut self, line: LineItem) -> Option<LineItem> {
        let id = line.id();
        match self.items.iter_mut().find(|existing| existing.id() == id) {
            Some(existing) => Some(std::mem::replace(existing, line)),
            None => {
                self.items.push(line);
                None
            }
        }
    }

    /// Set the amount of an existing line.
    ///
    /// Returns `false` if the product is not in the cart or `amount` is zero.
    pub fn set_amount(&mut self, id: ProductId, amount: u32) -> bool {
        if amount == 0 {
            return false;
        }
        match self.items.iter_mut().find(|line| line.id() == id) {
            Some(line) => {
                line.amount = amount;
                true
            }
            None => false,
        }
    }

    /// Remove the line for a product, returning it if it was present.
    pub fn remove(&mut self, id: ProductId) -> Option<LineItem> {
        self.position(id).map(|index| self.items.remove(index))
    }

    /// Sum of all line subtotals. Lines without a readable price count as zero.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.items.iter().filter_map(LineItem::subtotal).sum()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|line| u64::from(line.amount)).sum()
    }

    /// Amount held per product.
    #[must_use]
    pub fn amounts(&self) -> BTreeMap<ProductId, u32> {
        self.items
            .iter()
            .map(|line| (line.id(), line.amount))
            .collect()
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a LineItem;
    type IntoIter = std::slice::Iter<'a, LineItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
