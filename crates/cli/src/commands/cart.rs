//! Cart commands.

use std::fmt::Write as _;

use rocketshoes_cart::{
    Cart, CartConfig, CartError, CartStore, FileStore, HttpInventory, InventoryError, LineItem,
    Notifier, Price, ProductId, UpdateProductAmount,
};
use tracing::info;

/// Cart store as wired up by the CLI.
pub type CliCartStore = CartStore<HttpInventory, FileStore, ConsoleNotifier>;

/// A mutating cart operation requested on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Add(ProductId),
    Remove(ProductId),
    Update { product_id: ProductId, amount: u32 },
}

/// Prints notifications to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    #[allow(clippy::print_stderr)]
    fn error(&self, message: &str) {
        eprintln!("error: {message}");
    }
}

/// Build the cart store from configuration, loading the saved cart.
///
/// # Errors
///
/// Returns error if the inventory client cannot be created.
pub fn open(config: &CartConfig) -> Result<CliCartStore, InventoryError> {
    let inventory = HttpInventory::new(&config.inventory)?;
    let storage = FileStore::new(&config.storage.path);
    info!(path = %storage.path().display(), "Opening cart");

    Ok(CartStore::hydrate(
        inventory,
        storage,
        ConsoleNotifier,
        config.storage.key.clone(),
    ))
}

/// Run one operation against the store.
///
/// With `strict`, failures are returned instead of being shown as
/// notifications.
///
/// # Errors
///
/// Returns `CartError` only in strict mode.
pub async fn apply(store: &mut CliCartStore, action: Action, strict: bool) -> Result<(), CartError> {
    if strict {
        return match action {
            Action::Add(product_id) => store.try_add_product(product_id).await,
            Action::Remove(product_id) => store.try_remove_product(product_id),
            Action::Update { product_id, amount } => {
                store
                    .try_update_product_amount(UpdateProductAmount { product_id, amount })
                    .await
            }
        };
    }

    match action {
        Action::Add(product_id) => store.add_product(product_id).await,
        Action::Remove(product_id) => store.remove_product(product_id),
        Action::Update { product_id, amount } => {
            store
                .update_product_amount(UpdateProductAmount { product_id, amount })
                .await;
        }
    }
    Ok(())
}

/// Print the cart to stdout.
#[allow(clippy::print_stdout)]
pub fn print(cart: &Cart) {
    print!("{}", render(cart));
}

/// Placeholder for a missing title or price.
const MISSING: &str = "-";

fn title(line: &LineItem) -> &str {
    line.product.title().unwrap_or(MISSING)
}

fn money(price: Option<Price>) -> String {
    price.map_or_else(|| MISSING.to_string(), |price| price.display())
}

/// Render the cart as a plain-text table with a total line.
#[must_use]
pub fn render(cart: &Cart) -> String {
    if cart.is_empty() {
        return "Cart is empty\n".to_string();
    }

    let title_width = cart
        .iter()
        .map(|line| title(line).chars().count())
        .max()
        .unwrap_or(0)
        .max("PRODUCT".len());

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>4}  {:<title_width$}  {:>10}  {:>4}  {:>10}",
        "ID", "PRODUCT", "PRICE", "QTY", "SUBTOTAL"
    );
    for line in cart {
        let _ = writeln!(
            out,
            "{:>4}  {:<title_width$}  {:>10}  {:>4}  {:>10}",
            line.id(),
            title(line),
            money(line.product.price()),
            line.amount,
            money(line.subtotal())
        );
    }

    let items = cart.item_count();
    let _ = writeln!(
        out,
        "TOTAL {} ({items} {})",
        cart.subtotal().display(),
        if items == 1 { "item" } else { "items" }
    );
    out
}
