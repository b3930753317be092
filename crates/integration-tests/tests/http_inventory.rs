//! `HttpInventory` against the mock inventory API.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use axum::http::StatusCode;
use rocketshoes_cart::testing::sample_product;
use rocketshoes_cart::{HttpInventory, InventoryConfig, InventoryError, InventoryLookup, ProductId};
use rocketshoes_integration_tests::MockInventoryApi;

async fn client_for(api: &MockInventoryApi) -> HttpInventory {
    let base_url = api.start().await;
    let config = InventoryConfig::with_api_url(&base_url).expect("mock URL is valid");
    HttpInventory::new(&config).expect("client builds")
}

#[tokio::test]
async fn test_get_stock() {
    let api = MockInventoryApi::new().with_product(&sample_product(1), 3);
    let inventory = client_for(&api).await;

    let stock = inventory.get_stock(ProductId::new(1)).await.unwrap();

    assert_eq!(stock.id, ProductId::new(1));
    assert_eq!(stock.amount, 3);
}

#[tokio::test]
async fn test_get_product() {
    let api = MockInventoryApi::new().with_product(&sample_product(2), 3);
    let inventory = client_for(&api).await;

    let product = inventory.get_product(ProductId::new(2)).await.unwrap();

    assert_eq!(product, sample_product(2));
}

#[tokio::test]
async fn test_unknown_id_is_not_found() {
    let api = MockInventoryApi::new();
    let inventory = client_for(&api).await;

    let err = inventory.get_stock(ProductId::new(42)).await.unwrap_err();
    assert!(matches!(err, InventoryError::NotFound(id) if id == ProductId::new(42)));

    let err = inventory.get_product(ProductId::new(42)).await.unwrap_err();
    assert!(matches!(err, InventoryError::NotFound(_)));
}

#[tokio::test]
async fn test_server_error_is_reported_with_status() {
    let api = MockInventoryApi::new();
    api.set_stock_response(
        ProductId::new(1),
        StatusCode::SERVICE_UNAVAILABLE,
        "maintenance window",
    );
    let inventory = client_for(&api).await;

    let err = inventory.get_stock(ProductId::new(1)).await.unwrap_err();

    match err {
        InventoryError::Api { status, message } => {
            assert_eq!(status, 503);
            assert_eq!(message, "maintenance window");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_body_is_parse_error() {
    let api = MockInventoryApi::new();
    api.set_stock_response(ProductId::new(1), StatusCode::OK, r#"{"amount": "lots"}"#);
    let inventory = client_for(&api).await;

    let err = inventory.get_stock(ProductId::new(1)).await.unwrap_err();

    assert!(matches!(err, InventoryError::Parse(_)));
}

#[tokio::test]
async fn test_products_are_cached_but_stock_is_not() {
    let api = MockInventoryApi::new().with_product(&sample_product(1), 3);
    let inventory = client_for(&api).await;

    for _ in 0..3 {
        inventory.get_product(ProductId::new(1)).await.unwrap();
        inventory.get_stock(ProductId::new(1)).await.unwrap();
    }

    assert_eq!(api.product_requests(), 1);
    assert_eq!(api.stock_requests(), 3);
}

#[tokio::test]
async fn test_stock_changes_are_seen_immediately() {
    let api = MockInventoryApi::new().with_product(&sample_product(1), 3);
    let inventory = client_for(&api).await;

    assert_eq!(inventory.get_stock(ProductId::new(1)).await.unwrap().amount, 3);
    api.set_stock(ProductId::new(1), 0);
    assert_eq!(inventory.get_stock(ProductId::new(1)).await.unwrap().amount, 0);
}

#[tokio::test]
async fn test_bearer_token_is_sent() {
    let api = MockInventoryApi::new().with_product(&sample_product(1), 3);
    let base_url = api.start().await;
    let mut config = InventoryConfig::with_api_url(&base_url).unwrap();
    config.api_token = Some("k9Qz7vLx2mWp4RtY".to_string().into());
    let inventory = HttpInventory::new(&config).unwrap();

    inventory.get_stock(ProductId::new(1)).await.unwrap();

    assert_eq!(
        api.last_authorization().as_deref(),
        Some("Bearer k9Qz7vLx2mWp4RtY")
    );
}

#[tokio::test]
async fn test_no_token_sends_no_authorization() {
    let api = MockInventoryApi::new().with_product(&sample_product(1), 3);
    let inventory = client_for(&api).await;

    inventory.get_stock(ProductId::new(1)).await.unwrap();

    assert_eq!(api.last_authorization(), None);
}

#[tokio::test]
async fn test_unreachable_api_is_http_error() {
    // Bind then drop a listener to get a port nothing listens on
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();
    let mut config = InventoryConfig::with_api_url(&format!("http://{addr}")).unwrap();
    config.request_timeout = Duration::from_secs(2);
    let inventory = HttpInventory::new(&config).unwrap();

    let err = inventory.get_stock(ProductId::new(1)).await.unwrap_err();

    assert!(matches!(err, InventoryError::Http(_)));
}
