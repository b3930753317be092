//! Integration tests for RocketShoes.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p rocketshoes-integration-tests
//! ```
//!
//! No external services are needed: [`MockInventoryApi`] serves the
//! inventory endpoints from an in-process `axum` server on a random port, and
//! [`ScratchDir`] gives each test its own storage directory.
//!
//! # Test Categories
//!
//! - `http_inventory` - `HttpInventory` against the mock API
//! - `cart_scenarios` - `CartStore` end to end with HTTP inventory and file storage

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::extract::{Path as UrlPath, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use rocketshoes_cart::{Product, ProductId};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A canned HTTP response.
type Canned = (StatusCode, String);

#[derive(Default)]
struct MockState {
    stock: Mutex<HashMap<i32, Canned>>,
    products: Mutex<HashMap<i32, Canned>>,
    stock_requests: AtomicUsize,
    product_requests: AtomicUsize,
    last_authorization: Mutex<Option<String>>,
}

/// In-process stand-in for the inventory REST API.
///
/// Serves `GET /stock/{id}` and `GET /products/{id}` from tables that tests
/// can change while the server runs. Unknown ids answer `404 {}`, as
/// json-server does. Clones share state.
#[derive(Clone, Default)]
pub struct MockInventoryApi {
    state: Arc<MockState>,
}

impl MockInventoryApi {
    /// Create an API with empty tables.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `product` with `amount` units in stock.
    #[must_use]
    pub fn with_product(self, product: &Product, amount: u32) -> Self {
        self.set_product(product);
        self.set_stock(product.id, amount);
        self
    }

    /// Serve `product` from `/products/{id}`.
    pub fn set_product(&self, product: &Product) {
        let body = serde_json::to_string(product).unwrap_or_default();
        lock(&self.state.products).insert(product.id.as_i32(), (StatusCode::OK, body));
    }

    /// Serve `amount` units from `/stock/{id}`.
    pub fn set_stock(&self, id: ProductId, amount: u32) {
        let body = serde_json::json!({ "id": id, "amount": amount }).to_string();
        lock(&self.state.stock).insert(id.as_i32(), (StatusCode::OK, body));
    }

    /// Answer `/stock/{id}` with an arbitrary status and body.
    pub fn set_stock_response(&self, id: ProductId, status: StatusCode, body: &str) {
        lock(&self.state.stock).insert(id.as_i32(), (status, body.to_string()));
    }

    /// Answer `/products/{id}` with an arbitrary status and body.
    pub fn set_product_response(&self, id: ProductId, status: StatusCode, body: &str) {
        lock(&self.state.products).insert(id.as_i32(), (status, body.to_string()));
    }

    /// Number of `/stock` requests served.
    #[must_use]
    pub fn stock_requests(&self) -> usize {
        self.state.stock_requests.load(Ordering::SeqCst)
    }

    /// Number of `/products` requests served.
    #[must_use]
    pub fn product_requests(&self) -> usize {
        self.state.product_requests.load(Ordering::SeqCst)
    }

    /// `Authorization` header of the most recent request.
    #[must_use]
    pub fn last_authorization(&self) -> Option<String> {
        lock(&self.state.last_authorization).clone()
    }

    /// Start serving on a random local port and return the base URL.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn start(&self) -> String {
        let app = Router::new()
            .route("/stock/{id}", get(stock))
            .route("/products/{id}", get(product))
            .with_state(self.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock inventory API");
        let addr = listener
            .local_addr()
            .expect("Mock inventory API has no local address");

        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        format!("http://{addr}")
    }

    fn record_authorization(&self, headers: &HeaderMap) {
        let value = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        *lock(&self.state.last_authorization) = value;
    }
}

fn respond(table: &Mutex<HashMap<i32, Canned>>, id: i32) -> Response {
    let (status, body) = lock(table)
        .get(&id)
        .cloned()
        .unwrap_or((StatusCode::NOT_FOUND, "{}".to_string()));
    (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}

async fn stock(
    State(api): State<MockInventoryApi>,
    UrlPath(id): UrlPath<i32>,
    headers: HeaderMap,
) -> Response {
    api.record_authorization(&headers);
    api.state.stock_requests.fetch_add(1, Ordering::SeqCst);
    respond(&api.state.stock, id)
}

async fn product(
    State(api): State<MockInventoryApi>,
    UrlPath(id): UrlPath<i32>,
    headers: HeaderMap,
) -> Response {
    api.record_authorization(&headers);
    api.state.product_requests.fetch_add(1, Ordering::SeqCst);
    respond(&api.state.products, id)
}

/// A scratch directory under the system temp dir, removed when dropped.
pub struct ScratchDir {
    path: PathBuf,
}

impl ScratchDir {
    /// Create an empty scratch directory unique to this process and `name`.
    #[must_use]
    pub fn new(name: &str) -> Self {
        let path = std::env::temp_dir().join(format!(
            "rocketshoes-it-{}-{name}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&path);
        Self { path }
    }

    /// Path of the directory (created lazily by whoever writes into it).
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the cart storage file inside the directory.
    #[must_use]
    pub fn storage_file(&self) -> PathBuf {
        self.path.join("storage.json")
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}
