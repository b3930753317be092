//! The cart state service.
//!
//! [`CartStore`] owns the shopper's [`Cart`] for the length of a session. It is
//! hydrated once from a [`KeyValueStore`] and changed only through
//! [`add_product`](CartStore::add_product),
//! [`remove_product`](CartStore::remove_product) and
//! [`update_product_amount`](CartStore::update_product_amount).
//!
//! Every operation works on a copy of the cart. The copy is validated, written
//! to storage, and only then swapped in, so the in-memory and stored carts
//! never disagree and a failed operation leaves both untouched.

use rocketshoes_core::{Cart, LineItem, ProductId};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

use crate::error::{CartError, Operation, Result};
use crate::inventory::{InventoryError, InventoryLookup};
use crate::notify::Notifier;
use crate::storage::KeyValueStore;

/// Request to set a product's amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductAmount {
    pub product_id: ProductId,
    pub amount: u32,
}

/// Shopping cart state, mirrored to durable storage after every change.
pub struct CartStore<I, S, N> {
    inventory: I,
    storage: S,
    notifier: N,
    storage_key: String,
    cart: Cart,
}

impl<I, S, N> CartStore<I, S, N>
where
    I: InventoryLookup,
    S: KeyValueStore,
    N: Notifier,
{
    /// Build a store, loading the cart saved under `storage_key`.
    ///
    /// A missing entry gives an empty cart. So does an entry that cannot be
    /// read or parsed; that case is logged as a warning. Stored lines that
    /// cannot be read or break the cart rules (zero amount, repeated id) are
    /// dropped one at a time.
    pub fn hydrate(inventory: I, storage: S, notifier: N, storage_key: impl Into<String>) -> Self {
        let storage_key = storage_key.into();
        let cart = load_cart(&storage, &storage_key);

        Self {
            inventory,
            storage,
            notifier,
            storage_key,
            cart,
        }
    }

    /// The current cart.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Key the cart is persisted under.
    #[must_use]
    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    /// Add one unit of a product, notifying the shopper on failure.
    pub async fn add_product(&mut self, product_id: ProductId) {
        if let Err(e) = self.try_add_product(product_id).await {
            self.report(Operation::Add, &e);
        }
    }

    /// Remove a product's line, notifying the shopper on failure.
    ///
    /// The zero id is ignored without a notification.
    pub fn remove_product(&mut self, product_id: ProductId) {
        if let Err(e) = self.try_remove_product(product_id) {
            self.report(Operation::Remove, &e);
        }
    }

    /// Set a product's amount, notifying the shopper on failure.
    ///
    /// An amount of zero is ignored without a notification.
    pub async fn update_product_amount(&mut self, request: UpdateProductAmount) {
        if let Err(e) = self.try_update_product_amount(request).await {
            self.report(Operation::Update, &e);
        }
    }

    /// Add one unit of a product.
    ///
    /// A product not yet in the cart gets a new line with amount 1, built from
    /// the inventory's product record.
    ///
    /// # Errors
    ///
    /// - `StockExceeded` if one more unit is more than the inventory has
    /// - `Lookup` if the stock or product lookup fails
    /// - `Storage`/`Serialize` if the updated cart cannot be persisted
    #[instrument(skip(self))]
    pub async fn try_add_product(&mut self, product_id: ProductId) -> Result<()> {
        let mut next = self.cart.clone();
        let current = next.amount_of(product_id);

        let stock = self.inventory.get_stock(product_id).await?;
        let requested = current
            .checked_add(1)
            .filter(|&amount| amount <= stock.amount)
            .ok_or(CartError::StockExceeded {
                product_id,
                requested: current.saturating_add(1),
                available: stock.amount,
            })?;

        if current > 0 {
            next.set_amount(product_id, requested);
        } else {
            let product = self.inventory.get_product(product_id).await?;
            if product.id != product_id {
                return Err(InventoryError::Mismatch {
                    requested: product_id,
                    received: product.id,
                }
                .into());
            }
            next.insert(LineItem {
                product,
                amount: requested,
            });
        }

        self.commit(next)?;
        debug!(amount = requested, "Product added");
        Ok(())
    }

    /// Remove a product's line.
    ///
    /// The zero id means "no product" and is a no-op.
    ///
    /// # Errors
    ///
    /// - `ItemNotFound` if the product is not in the cart
    /// - `Storage`/`Serialize` if the updated cart cannot be persisted
    #[instrument(skip(self))]
    pub fn try_remove_product(&mut self, product_id: ProductId) -> Result<()> {
        if product_id.is_unset() {
            debug!("Ignoring remove without a product id");
            return Ok(());
        }

        let mut next = self.cart.clone();
        next.remove(product_id)
            .ok_or(CartError::ItemNotFound(product_id))?;

        self.commit(next)?;
        debug!("Product removed");
        Ok(())
    }

    /// Set a product's amount.
    ///
    /// A zero amount is a no-op; it does not remove the line.
    ///
    /// # Errors
    ///
    /// - `StockExceeded` if `amount` is more than the inventory has
    /// - `Lookup` if the stock lookup fails
    /// - `ItemNotFound` if the product is not in the cart
    /// - `Storage`/`Serialize` if the updated cart cannot be persisted
    #[instrument(skip(self))]
    pub async fn try_update_product_amount(&mut self, request: UpdateProductAmount) -> Result<()> {
        let UpdateProductAmount { product_id, amount } = request;
        if amount == 0 {
            return Ok(());
        }

        let stock = self.inventory.get_stock(product_id).await?;
        if amount > stock.amount {
            return Err(CartError::StockExceeded {
                product_id,
                requested: amount,
                available: stock.amount,
            });
        }

        let mut next = self.cart.clone();
        if !next.set_amount(product_id, amount) {
            return Err(CartError::ItemNotFound(product_id));
        }

        self.commit(next)?;
        debug!("Product amount updated");
        Ok(())
    }

    /// Persist `next` and make it the current cart.
    fn commit(&mut self, next: Cart) -> Result<()> {
        let serialized = serde_json::to_string(&next)?;
        self.storage.set(&self.storage_key, &serialized)?;
        self.cart = next;
        Ok(())
    }

    fn report(&self, operation: Operation, error: &CartError) {
        match error {
            CartError::StockExceeded { .. } | CartError::ItemNotFound(_) => {
                warn!(?operation, error = %error, "Cart operation rejected");
            }
            _ => {
                error!(?operation, error = %error, "Cart operation failed");
            }
        }
        self.notifier.error(error.user_message(operation));
    }
}

/// Read and normalize the stored cart, falling back to an empty one.
fn load_cart<S: KeyValueStore>(storage: &S, key: &str) -> Cart {
    let stored = match storage.get(key) {
        Ok(Some(stored)) => stored,
        Ok(None) => {
            debug!(key, "No stored cart");
            return Cart::new();
        }
        Err(e) => {
            warn!(key, error = %e, "Failed to read stored cart, starting empty");
            return Cart::new();
        }
    };

    let entries = match serde_json::from_str::<Vec<serde_json::Value>>(&stored) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(key, error = %e, "Stored cart is corrupt, starting empty");
            return Cart::new();
        }
    };

    let lines = entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_json::from_value::<LineItem>(entry) {
            Ok(line) => Some(line),
            Err(e) => {
                warn!(key, index, error = %e, "Dropping unreadable stored cart line");
                None
            }
        })
        .collect();

    let (cart, rejected) = Cart::from_lines(lines);
    for line in &rejected {
        warn!(
            product_id = %line.id(),
            amount = line.amount,
            "Dropping invalid stored cart line"
        );
    }

    info!(key, lines = cart.len(), "Cart hydrated");
    cart
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rocketshoes_core::{Price, Product};

    use super::*;
    use crate::messages;
    use crate::storage::MemoryStore;
    use crate::testing::{FailingStore, RecordingNotifier, StaticInventory, sample_product};

    const KEY: &str = "@RocketShoes:cart";

    type TestStore = CartStore<StaticInventory, MemoryStore, RecordingNotifier>;

    struct Harness {
        store: TestStore,
        inventory: StaticInventory,
        storage: MemoryStore,
        notifier: RecordingNotifier,
    }

    fn id(raw: i32) -> ProductId {
        ProductId::new(raw)
    }

    fn harness(inventory: StaticInventory, storage: MemoryStore) -> Harness {
        let notifier = RecordingNotifier::new();
        let store = CartStore::hydrate(inventory.clone(), storage.clone(), notifier.clone(), KEY);
        Harness {
            store,
            inventory,
            storage,
            notifier,
        }
    }

    /// Stored JSON for a cart holding `(id, amount)` lines of sample products.
    fn stored_cart(lines: &[(i32, u32)]) -> String {
        let lines: Vec<LineItem> = lines
            .iter()
            .map(|&(raw, amount)| LineItem::new(sample_product(raw), amount).unwrap())
            .collect();
        serde_json::to_string(&lines).unwrap()
    }

    fn amounts(store: &TestStore) -> Vec<(i32, u32)> {
        store
            .cart()
            .iter()
            .map(|line| (line.id().as_i32(), line.amount))
            .collect()
    }

    fn persisted(storage: &MemoryStore) -> Option<Cart> {
        let raw = storage.get(KEY).unwrap()?;
        let lines: Vec<LineItem> = serde_json::from_str(&raw).unwrap();
        Some(Cart::from_lines(lines).0)
    }

    fn assert_invariants(cart: &Cart) {
        let mut ids: Vec<_> = cart.iter().map(LineItem::id).collect();
        let total = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), total, "duplicate product line");
        assert!(cart.iter().all(|line| line.amount >= 1), "zero amount line");
    }

    // -------------------------------------------------------------------------
    // Hydration
    // -------------------------------------------------------------------------

    #[test]
    fn test_hydrate_without_stored_cart_is_empty() {
        let h = harness(StaticInventory::new(), MemoryStore::new());
        assert!(h.store.cart().is_empty());
        assert_eq!(h.store.storage_key(), KEY);
    }

    #[test]
    fn test_hydrate_restores_stored_cart_in_order() {
        let storage = MemoryStore::with_entry(KEY, &stored_cart(&[(3, 2), (1, 1)]));
        let h = harness(StaticInventory::new(), storage);
        assert_eq!(amounts(&h.store), vec![(3, 2), (1, 1)]);
    }

    #[test]
    fn test_hydrate_corrupt_value_falls_back_to_empty() {
        let storage = MemoryStore::with_entry(KEY, "{not json");
        let h = harness(StaticInventory::new(), storage);
        assert!(h.store.cart().is_empty());
        assert!(h.notifier.messages().is_empty());
    }

    #[test]
    fn test_hydrate_drops_invalid_lines() {
        let raw = r#"[
            {"id": 1, "title": "A", "price": 10, "image": "a.jpg", "amount": 2},
            {"id": 2, "title": "B", "price": 10, "image": "b.jpg", "amount": 0},
            {"id": 1, "title": "A", "price": 10, "image": "a.jpg", "amount": 7}
        ]"#;
        let h = harness(StaticInventory::new(), MemoryStore::with_entry(KEY, raw));
        assert_eq!(amounts(&h.store), vec![(1, 2)]);
    }

    #[test]
    fn test_hydrate_unreadable_storage_falls_back_to_empty() {
        let store = CartStore::hydrate(
            StaticInventory::new(),
            FailingStore::unreadable(),
            RecordingNotifier::new(),
            KEY,
        );
        assert!(store.cart().is_empty());
    }

    #[test]
    fn test_hydrate_drops_only_unreadable_lines() {
        let raw = r#"[
            {"id": 1, "title": "A", "price": 10, "image": "a.jpg", "amount": 2},
            {"title": "no id", "amount": 1},
            {"id": 3, "amount": "many"},
            {"id": 4, "title": "D", "price": 10, "amount": 1}
        ]"#;
        let h = harness(StaticInventory::new(), MemoryStore::with_entry(KEY, raw));
        assert_eq!(amounts(&h.store), vec![(1, 2), (4, 1)]);
    }

    #[tokio::test]
    async fn test_stored_display_attributes_are_written_back_unchanged() {
        let raw = r#"[{"id":1,"title":"A","price":"139.90","amount":1}]"#;
        let storage = MemoryStore::with_entry(KEY, raw);
        let inventory = StaticInventory::new().with_product(sample_product(1), 5);
        let mut h = harness(inventory, storage);

        h.store
            .try_update_product_amount(UpdateProductAmount {
                product_id: id(1),
                amount: 2,
            })
            .await
            .unwrap();

        let stored: serde_json::Value =
            serde_json::from_str(&h.storage.get(KEY).unwrap().unwrap()).unwrap();
        assert_eq!(
            stored,
            serde_json::json!([{"id": 1, "title": "A", "price": "139.90", "amount": 2}])
        );
        assert_eq!(h.store.cart().subtotal(), Price::from_cents(27980));
    }

    // -------------------------------------------------------------------------
    // add_product
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_add_new_product_to_empty_cart() {
        let inventory = StaticInventory::new().with_product(sample_product(1), 5);
        let mut h = harness(inventory, MemoryStore::new());

        h.store.add_product(id(1)).await;

        assert_eq!(amounts(&h.store), vec![(1, 1)]);
        assert_eq!(h.store.cart().get(id(1)).unwrap().product, sample_product(1));
        assert!(h.notifier.messages().is_empty());
        assert_eq!(persisted(&h.storage).as_ref(), Some(h.store.cart()));
    }

    #[tokio::test]
    async fn test_add_existing_product_increments_without_product_lookup() {
        let inventory = StaticInventory::new().with_product(sample_product(1), 5);
        let mut h = harness(inventory, MemoryStore::new());

        h.store.add_product(id(1)).await;
        h.store.add_product(id(1)).await;
        h.store.add_product(id(1)).await;

        assert_eq!(amounts(&h.store), vec![(1, 3)]);
        assert_eq!(h.inventory.product_calls(id(1)), 1);
        assert_eq!(h.inventory.stock_calls(id(1)), 3);
    }

    #[tokio::test]
    async fn test_add_beyond_stock_is_rejected() {
        let storage = MemoryStore::with_entry(KEY, &stored_cart(&[(1, 1)]));
        let inventory = StaticInventory::new().with_product(sample_product(1), 1);
        let mut h = harness(inventory, storage);
        let before = h.storage.get(KEY).unwrap();

        h.store.add_product(id(1)).await;

        assert_eq!(amounts(&h.store), vec![(1, 1)]);
        assert_eq!(h.notifier.messages(), vec![messages::STOCK_EXCEEDED]);
        assert_eq!(h.storage.get(KEY).unwrap(), before);
    }

    #[tokio::test]
    async fn test_add_with_zero_stock_is_rejected() {
        let inventory = StaticInventory::new().with_product(sample_product(4), 0);
        let mut h = harness(inventory, MemoryStore::new());

        let err = h.store.try_add_product(id(4)).await.unwrap_err();

        assert!(matches!(
            err,
            CartError::StockExceeded {
                requested: 1,
                available: 0,
                ..
            }
        ));
        assert!(h.store.cart().is_empty());
        assert_eq!(h.inventory.product_calls(id(4)), 0);
    }

    #[tokio::test]
    async fn test_add_lookup_failure_notifies_generic_message() {
        let storage = MemoryStore::with_entry(KEY, &stored_cart(&[(2, 1)]));
        let inventory = StaticInventory::new().with_product(sample_product(1), 5);
        inventory.fail_on(id(1));
        let mut h = harness(inventory, storage);

        h.store.add_product(id(1)).await;
        h.store.add_product(id(99)).await;

        assert_eq!(amounts(&h.store), vec![(2, 1)]);
        assert_eq!(
            h.notifier.messages(),
            vec![messages::ADD_FAILED, messages::ADD_FAILED]
        );
    }

    #[tokio::test]
    async fn test_add_rejects_product_record_for_other_id() {
        let inventory = StaticInventory::new().with_product_at(id(8), sample_product(9), 5);
        let mut h = harness(inventory, MemoryStore::new());

        let err = h.store.try_add_product(id(8)).await.unwrap_err();

        assert!(matches!(
            err,
            CartError::Lookup(InventoryError::Mismatch { received, .. }) if received == id(9)
        ));
        assert!(h.store.cart().is_empty());
    }

    #[tokio::test]
    async fn test_add_persist_failure_leaves_cart_unchanged() {
        let inventory = StaticInventory::new().with_product(sample_product(1), 5);
        let notifier = RecordingNotifier::new();
        let mut store = CartStore::hydrate(
            inventory,
            FailingStore::with_value(&stored_cart(&[(1, 1)])),
            notifier.clone(),
            KEY,
        );

        store.add_product(id(1)).await;

        assert_eq!(store.cart().amount_of(id(1)), 1);
        assert_eq!(notifier.messages(), vec![messages::ADD_FAILED]);
    }

    #[tokio::test]
    async fn test_add_product_without_display_attributes() {
        let bare: Product = serde_json::from_str(r#"{"id": 6}"#).unwrap();
        let inventory = StaticInventory::new().with_product(bare.clone(), 2);
        let mut h = harness(inventory, MemoryStore::new());

        h.store.try_add_product(id(6)).await.unwrap();

        assert_eq!(h.store.cart().get(id(6)).unwrap().product, bare);
        assert_eq!(
            h.storage.get(KEY).unwrap().as_deref(),
            Some(r#"[{"id":6,"amount":1}]"#)
        );
    }

    #[tokio::test]
    async fn test_add_checks_current_stock_every_time() {
        let inventory = StaticInventory::new().with_product(sample_product(1), 5);
        let mut h = harness(inventory, MemoryStore::new());

        h.store.add_product(id(1)).await;
        h.inventory.set_stock(id(1), 1);
        h.store.add_product(id(1)).await;

        assert_eq!(amounts(&h.store), vec![(1, 1)]);
        assert_eq!(h.notifier.messages(), vec![messages::STOCK_EXCEEDED]);
        assert_eq!(h.inventory.stock_calls(id(1)), 2);
    }

    #[tokio::test]
    async fn test_add_keeps_insertion_order() {
        let inventory = StaticInventory::new()
            .with_product(sample_product(2), 5)
            .with_product(sample_product(1), 5)
            .with_product(sample_product(3), 5);
        let mut h = harness(inventory, MemoryStore::new());

        h.store.add_product(id(2)).await;
        h.store.add_product(id(1)).await;
        h.store.add_product(id(2)).await;
        h.store.add_product(id(3)).await;

        assert_eq!(amounts(&h.store), vec![(2, 2), (1, 1), (3, 1)]);
        assert_eq!(
            h.store.cart().subtotal(),
            Price::from_cents(2 * 13992 + 13991 + 13993)
        );
    }

    // -------------------------------------------------------------------------
    // remove_product
    // -------------------------------------------------------------------------

    #[test]
    fn test_remove_existing_product() {
        let storage = MemoryStore::with_entry(KEY, &stored_cart(&[(1, 2)]));
        let mut h = harness(StaticInventory::new(), storage);

        h.store.remove_product(id(1));

        assert!(h.store.cart().is_empty());
        assert!(h.notifier.messages().is_empty());
        assert_eq!(persisted(&h.storage), Some(Cart::new()));
    }

    #[test]
    fn test_remove_missing_product_notifies() {
        let mut h = harness(StaticInventory::new(), MemoryStore::new());

        h.store.remove_product(id(99));

        assert!(h.store.cart().is_empty());
        assert_eq!(h.notifier.messages(), vec![messages::REMOVE_FAILED]);
        assert_eq!(h.storage.get(KEY).unwrap(), None);
    }

    #[test]
    fn test_remove_unset_id_is_silent_noop() {
        let storage = MemoryStore::with_entry(KEY, &stored_cart(&[(1, 1)]));
        let mut h = harness(StaticInventory::new(), storage);

        h.store.remove_product(id(0));

        assert_eq!(amounts(&h.store), vec![(1, 1)]);
        assert!(h.notifier.messages().is_empty());
    }

    #[test]
    fn test_remove_persist_failure_leaves_cart_unchanged() {
        let notifier = RecordingNotifier::new();
        let mut store = CartStore::hydrate(
            StaticInventory::new(),
            FailingStore::with_value(&stored_cart(&[(1, 2)])),
            notifier.clone(),
            KEY,
        );

        store.remove_product(id(1));

        assert_eq!(store.cart().amount_of(id(1)), 2);
        assert_eq!(notifier.messages(), vec![messages::REMOVE_FAILED]);
    }

    #[test]
    fn test_remove_middle_line_keeps_order() {
        let storage = MemoryStore::with_entry(KEY, &stored_cart(&[(1, 1), (2, 1), (3, 4)]));
        let mut h = harness(StaticInventory::new(), storage);

        h.store.try_remove_product(id(2)).unwrap();

        assert_eq!(amounts(&h.store), vec![(1, 1), (3, 4)]);
    }

    // -------------------------------------------------------------------------
    // update_product_amount
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_update_sets_amount() {
        let storage = MemoryStore::with_entry(KEY, &stored_cart(&[(1, 1)]));
        let inventory = StaticInventory::new().with_product(sample_product(1), 10);
        let mut h = harness(inventory, storage);

        h.store
            .update_product_amount(UpdateProductAmount {
                product_id: id(1),
                amount: 5,
            })
            .await;

        assert_eq!(amounts(&h.store), vec![(1, 5)]);
        assert!(h.notifier.messages().is_empty());
        assert_eq!(persisted(&h.storage).as_ref(), Some(h.store.cart()));
    }

    #[tokio::test]
    async fn test_update_to_zero_is_silent_noop() {
        let storage = MemoryStore::with_entry(KEY, &stored_cart(&[(1, 3)]));
        let inventory = StaticInventory::new().with_product(sample_product(1), 10);
        let mut h = harness(inventory, storage);

        h.store
            .update_product_amount(UpdateProductAmount {
                product_id: id(1),
                amount: 0,
            })
            .await;

        assert_eq!(amounts(&h.store), vec![(1, 3)]);
        assert!(h.notifier.messages().is_empty());
        assert_eq!(h.inventory.stock_calls(id(1)), 0);
    }

    #[tokio::test]
    async fn test_update_beyond_stock_is_rejected() {
        let storage = MemoryStore::with_entry(KEY, &stored_cart(&[(1, 1)]));
        let inventory = StaticInventory::new().with_product(sample_product(1), 3);
        let mut h = harness(inventory, storage);

        h.store
            .update_product_amount(UpdateProductAmount {
                product_id: id(1),
                amount: 4,
            })
            .await;

        assert_eq!(amounts(&h.store), vec![(1, 1)]);
        assert_eq!(h.notifier.messages(), vec![messages::STOCK_EXCEEDED]);
    }

    #[tokio::test]
    async fn test_update_missing_product_notifies() {
        let inventory = StaticInventory::new().with_product(sample_product(1), 10);
        let mut h = harness(inventory, MemoryStore::new());

        let err = h
            .store
            .try_update_product_amount(UpdateProductAmount {
                product_id: id(1),
                amount: 2,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CartError::ItemNotFound(p) if p == id(1)));

        h.store
            .update_product_amount(UpdateProductAmount {
                product_id: id(1),
                amount: 2,
            })
            .await;
        assert_eq!(h.notifier.messages(), vec![messages::UPDATE_FAILED]);
        assert!(h.store.cart().is_empty());
    }

    #[tokio::test]
    async fn test_update_lookup_failure_notifies_generic_message() {
        let storage = MemoryStore::with_entry(KEY, &stored_cart(&[(1, 1)]));
        let inventory = StaticInventory::new().with_product(sample_product(1), 10);
        inventory.fail_on(id(1));
        let mut h = harness(inventory, storage);

        h.store
            .update_product_amount(UpdateProductAmount {
                product_id: id(1),
                amount: 2,
            })
            .await;

        assert_eq!(amounts(&h.store), vec![(1, 1)]);
        assert_eq!(h.notifier.messages(), vec![messages::UPDATE_FAILED]);
    }

    #[tokio::test]
    async fn test_update_persist_failure_leaves_cart_unchanged() {
        let inventory = StaticInventory::new().with_product(sample_product(1), 10);
        let notifier = RecordingNotifier::new();
        let mut store = CartStore::hydrate(
            inventory,
            FailingStore::with_value(&stored_cart(&[(1, 1)])),
            notifier.clone(),
            KEY,
        );

        store
            .update_product_amount(UpdateProductAmount {
                product_id: id(1),
                amount: 4,
            })
            .await;

        assert_eq!(store.cart().amount_of(id(1)), 1);
        assert_eq!(notifier.messages(), vec![messages::UPDATE_FAILED]);
    }

    #[tokio::test]
    async fn test_update_with_current_amount_changes_nothing() {
        let raw = stored_cart(&[(1, 2), (2, 1)]);
        let storage = MemoryStore::with_entry(KEY, &raw);
        let inventory = StaticInventory::new().with_product(sample_product(1), 10);
        let mut h = harness(inventory, storage);
        let before = serde_json::to_string(h.store.cart()).unwrap();

        h.store
            .try_update_product_amount(UpdateProductAmount {
                product_id: id(1),
                amount: 2,
            })
            .await
            .unwrap();

        assert_eq!(serde_json::to_string(h.store.cart()).unwrap(), before);
        assert_eq!(h.storage.get(KEY).unwrap().as_deref(), Some(before.as_str()));
        assert!(h.notifier.messages().is_empty());
    }

    #[test]
    fn test_update_request_uses_camel_case() {
        let request: UpdateProductAmount =
            serde_json::from_str(r#"{"productId": 3, "amount": 2}"#).unwrap();
        assert_eq!(
            request,
            UpdateProductAmount {
                product_id: id(3),
                amount: 2,
            }
        );
    }

    // -------------------------------------------------------------------------
    // Invariants across a mixed sequence
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_mixed_operations_preserve_invariants() {
        let inventory = StaticInventory::new()
            .with_product(sample_product(1), 2)
            .with_product(sample_product(2), 3)
            .with_product(sample_product(3), 1);
        let mut h = harness(inventory, MemoryStore::new());

        for raw in [1, 2, 1, 1, 3, 3, 2, 0, 7] {
            h.store.add_product(id(raw)).await;
            assert_invariants(h.store.cart());
        }
        for (raw, amount) in [(2, 3), (2, 4), (1, 0), (3, 1), (5, 1)] {
            h.store
                .update_product_amount(UpdateProductAmount {
                    product_id: id(raw),
                    amount,
                })
                .await;
            assert_invariants(h.store.cart());
        }
        for raw in [3, 3, 0] {
            h.store.remove_product(id(raw));
            assert_invariants(h.store.cart());
        }

        assert_eq!(amounts(&h.store), vec![(1, 2), (2, 3)]);
        assert_eq!(persisted(&h.storage).as_ref(), Some(h.store.cart()));
    }
}
