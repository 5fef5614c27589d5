//! Catalog pages against the fake backend: featured, grid, detail.

#![allow(clippy::unwrap_used)]

use axum::http::{Method, StatusCode};
use glasscart_integration_tests::{FakeBackend, product_json, products_json};
use glasscart_storefront::Route;
use glasscart_storefront::api::ProductFilter;
use glasscart_storefront::pages::{FeaturedPage, LoadOutcome, ProductDetailPage, ProductsPage};
use serde_json::json;

#[tokio::test]
async fn test_featured_products_are_shown_without_fallback() {
    let backend = FakeBackend::start().await;
    backend.ok("/api/products/featured/", products_json(3));
    let client = backend.client(Route::Home);

    let page = FeaturedPage::new(client.state.clone());
    assert_eq!(page.load().await, LoadOutcome::Applied);

    assert_eq!(page.products().len(), 3);
    assert_eq!(backend.count(&Method::GET, "/api/products/"), 0);
    assert!(page.render().unwrap().html.contains("Product 2"));
}

#[tokio::test]
async fn test_empty_featured_falls_back_once_to_first_six() {
    let backend = FakeBackend::start().await;
    backend.ok("/api/products/featured/", json!([]));
    backend.ok("/api/products/", products_json(10));
    let client = backend.client(Route::Home);

    let page = FeaturedPage::new(client.state.clone());
    page.load().await;

    let ids: Vec<i64> = page.products().iter().map(|p| p.id.as_i64()).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5, 6]);

    let fallback = backend.hits_for(&Method::GET, "/api/products/");
    assert_eq!(fallback.len(), 1);
    assert_eq!(fallback[0].query, None);

    page.load().await;
    assert_eq!(backend.count(&Method::GET, "/api/products/"), 1);
    assert_eq!(backend.count(&Method::GET, "/api/products/featured/"), 2);
}

#[tokio::test]
async fn test_featured_accepts_paginated_envelope() {
    let backend = FakeBackend::start().await;
    backend.ok(
        "/api/products/featured/",
        json!({"count": 1, "next": null, "results": [product_json(9, "Brass Lamp", "1299.00")]}),
    );
    let client = backend.client(Route::Home);

    let page = FeaturedPage::new(client.state.clone());
    page.load().await;

    let html = page.render().unwrap().html;
    assert!(html.contains("Brass Lamp"));
    assert!(html.contains("₹1299.00"));
}

#[tokio::test]
async fn test_featured_failure_shows_error_state() {
    let backend = FakeBackend::start().await;
    backend.respond(
        Method::GET,
        "/api/products/featured/",
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({"detail": "boom"}),
    );
    let client = backend.client(Route::Home);

    let page = FeaturedPage::new(client.state.clone());
    page.load().await;

    assert!(page.error().unwrap().starts_with("Failed to load products"));
    let html = page.render().unwrap().html;
    assert!(html.contains("Error Loading Products"));
    assert!(html.contains("Try Again"));
}

#[tokio::test]
async fn test_empty_catalog_shows_empty_state() {
    let backend = FakeBackend::start().await;
    backend.ok("/api/products/featured/", json!([]));
    backend.ok("/api/products/", json!([]));
    let client = backend.client(Route::Home);

    let page = FeaturedPage::new(client.state.clone());
    page.load().await;

    let html = page.render().unwrap().html;
    assert!(html.contains("No Products Available"));
    assert!(html.contains("Browse All Products"));

    page.browse_all();
    assert_eq!(client.router.current(), Route::Products);
}

#[tokio::test]
async fn test_product_grid_sends_only_non_empty_filters() {
    let backend = FakeBackend::start().await;
    backend.ok("/api/products/", products_json(2));
    backend.ok("/api/categories/", json!([{"id": 2, "name": "Lighting"}]));
    let client = backend.client(Route::Products);

    let page = ProductsPage::new(client.state.clone());
    page.load().await;

    let filter = ProductFilter {
        category: "2".into(),
        name: "lamp".into(),
    };
    assert_eq!(
        page.apply_filter(filter.clone()).await,
        Some(LoadOutcome::Applied)
    );
    assert_eq!(page.apply_filter(filter.clone()).await, None);
    assert_eq!(page.applied_filter(), filter);

    let queries: Vec<Option<String>> = backend
        .hits_for(&Method::GET, "/api/products/")
        .into_iter()
        .map(|hit| hit.query)
        .collect();
    assert_eq!(queries, vec![None, Some("category=2&name=lamp".into())]);

    let html = page.render().unwrap().html;
    assert!(html.contains("All Categories"));
    assert!(html.contains("Lighting"));
}

#[tokio::test]
async fn test_categories_are_fetched_once() {
    let backend = FakeBackend::start().await;
    backend.ok("/api/products/", products_json(1));
    backend.ok("/api/categories/", json!([]));
    let client = backend.client(Route::Products);

    let page = ProductsPage::new(client.state.clone());
    page.load().await;
    page.load().await;

    assert_eq!(backend.count(&Method::GET, "/api/categories/"), 1);
    assert_eq!(backend.count(&Method::GET, "/api/products/"), 2);
}

#[tokio::test]
async fn test_product_detail_renders_product() {
    let backend = FakeBackend::start().await;
    backend.ok("/api/products/42/", product_json(42, "Teak Bowl", "450"));
    let client = backend.client(Route::product(42));

    let page = ProductDetailPage::new(client.state.clone(), "42");
    page.load().await;

    assert_eq!(page.product().unwrap().name, "Teak Bowl");
    let html = page.render().unwrap().html;
    assert!(html.contains("Teak Bowl"));
    assert!(html.contains("₹450.00"));
    assert!(html.contains("https://picsum.photos/seed/42/800/600"));
}

#[tokio::test]
async fn test_missing_product_shows_not_found() {
    let backend = FakeBackend::start().await;
    let client = backend.client(Route::product(404));

    let page = ProductDetailPage::new(client.state.clone(), "404");
    page.load().await;

    assert!(page.product().is_none());
    assert!(page.render().unwrap().html.contains("Not found"));
}
