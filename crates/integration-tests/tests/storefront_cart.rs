//! Cart, checkout and wishlist against the fake backend.

#![allow(clippy::unwrap_used)]

use axum::http::{Method, StatusCode};
use glasscart_core::{CartLineId, ProductId, WishlistEntryId};
use glasscart_integration_tests::{FakeBackend, product_json};
use glasscart_storefront::Route;
use glasscart_storefront::notify::Notice;
use glasscart_storefront::pages::{CartPage, ProductDetailPage, WishlistPage, actions};
use serde_json::{Value, json};

fn cart_json() -> Value {
    json!([
        {"id": 1, "product": product_json(1, "Mug", "5.25"), "quantity": 2, "total_price": "10.50"},
        {"id": 2, "product": product_json(2, "Coaster", "5.25"), "quantity": 1, "total_price": 5.25},
        {"id": 3, "product": product_json(3, "Sample", "0"), "quantity": 1, "total_price": "0.00"}
    ])
}

#[tokio::test]
async fn test_cart_total_sums_line_totals() {
    let backend = FakeBackend::start().await;
    backend.ok("/api/cart/", cart_json());
    let client = backend.client(Route::Cart);
    client.login_as("tok");

    let page = CartPage::new(client.state.clone());
    page.load().await;

    assert_eq!(page.lines().len(), 3);
    assert_eq!(page.total().display(), "₹15.75");

    let html = page.render().unwrap().html;
    assert!(html.contains("Your Cart"));
    assert!(html.contains("Total: ₹15.75"));
    assert!(html.contains("Checkout via WhatsApp"));
}

#[tokio::test]
async fn test_empty_cart_message() {
    let backend = FakeBackend::start().await;
    backend.ok("/api/cart/", json!([]));
    let client = backend.client(Route::Cart);

    let page = CartPage::new(client.state.clone());
    page.load().await;

    let html = page.render().unwrap().html;
    assert!(html.contains("No items in cart."));
    assert!(html.contains("Total: ₹0.00"));
}

#[tokio::test]
async fn test_failed_cart_load_reports_error() {
    let backend = FakeBackend::start().await;
    backend.respond(
        Method::GET,
        "/api/cart/",
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({"detail": "boom"}),
    );
    let client = backend.client(Route::Cart);

    let page = CartPage::new(client.state.clone());
    page.load().await;

    assert_eq!(page.error().as_deref(), Some("Failed to load cart"));
    assert!(page.lines().is_empty());
    assert_eq!(client.router.current(), Route::Cart);
    assert!(page.render().unwrap().html.contains("Failed to load cart"));
}

#[tokio::test]
async fn test_failed_wishlist_load_reports_error() {
    let backend = FakeBackend::start().await;
    backend.respond(
        Method::GET,
        "/api/wishlist/",
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({}),
    );
    let client = backend.client(Route::Wishlist);

    let page = WishlistPage::new(client.state.clone());
    page.load().await;

    assert_eq!(page.error().as_deref(), Some("Failed to load wishlist"));
    assert!(page.entries().is_empty());
}

#[tokio::test]
async fn test_quantity_update_clamps_and_reloads() {
    let backend = FakeBackend::start().await;
    backend.ok("/api/cart/", cart_json());
    backend.respond(Method::PATCH, "/api/cart/7/", StatusCode::OK, json!({}));
    let client = backend.client(Route::Cart);

    let page = CartPage::new(client.state.clone());
    page.load().await;
    page.update_quantity(CartLineId::new(7), 0).await.unwrap();

    let patch = &backend.hits_for(&Method::PATCH, "/api/cart/7/")[0];
    assert_eq!(patch.body, Some(json!({"quantity": 1})));
    assert_eq!(backend.count(&Method::GET, "/api/cart/"), 2);
}

#[tokio::test]
async fn test_remove_line_reloads() {
    let backend = FakeBackend::start().await;
    backend.ok("/api/cart/", json!([]));
    backend.respond(Method::DELETE, "/api/cart/3/", StatusCode::OK, json!({}));
    let client = backend.client(Route::Cart);

    let page = CartPage::new(client.state.clone());
    page.remove(CartLineId::new(3)).await.unwrap();

    assert_eq!(backend.count(&Method::DELETE, "/api/cart/3/"), 1);
    assert_eq!(backend.count(&Method::GET, "/api/cart/"), 1);
}

#[tokio::test]
async fn test_failed_mutation_is_reported() {
    let backend = FakeBackend::start().await;
    backend.ok("/api/cart/", json!([]));
    backend.respond(
        Method::PATCH,
        "/api/cart/1/",
        StatusCode::BAD_REQUEST,
        json!({"quantity": ["Not enough stock."]}),
    );
    let client = backend.client(Route::Cart);
    let mut notices = client.state.notifier().subscribe();

    let page = CartPage::new(client.state.clone());
    assert!(page.update_quantity(CartLineId::new(1), 99).await.is_err());

    match notices.recv().await.unwrap() {
        Notice::ActionFailed { action, .. } => assert_eq!(action, "update quantity"),
        other => panic!("unexpected notice: {other:?}"),
    }
    assert_eq!(backend.count(&Method::GET, "/api/cart/"), 1);
}

#[tokio::test]
async fn test_checkout_opens_whatsapp_link() {
    let backend = FakeBackend::start().await;
    backend.ok(
        "/api/checkout/whatsapp/",
        json!({"wa_url": "https://wa.me/919800000000?text=Order"}),
    );
    let client = backend.client(Route::Cart);

    let page = CartPage::new(client.state.clone());
    let opened = page.checkout().await.unwrap();

    assert_eq!(
        opened.as_deref(),
        Some("https://wa.me/919800000000?text=Order")
    );
    assert_eq!(
        client.opener.opened(),
        vec!["https://wa.me/919800000000?text=Order".to_owned()]
    );
}

#[tokio::test]
async fn test_checkout_without_link_opens_nothing() {
    let backend = FakeBackend::start().await;
    backend.ok("/api/checkout/whatsapp/", json!({}));
    let client = backend.client(Route::Cart);

    let page = CartPage::new(client.state.clone());
    assert_eq!(page.checkout().await.unwrap(), None);
    assert!(client.opener.opened().is_empty());
}

#[tokio::test]
async fn test_add_to_cart_posts_one_and_notifies() {
    let backend = FakeBackend::start().await;
    backend.respond(Method::POST, "/api/cart/", StatusCode::CREATED, json!({"id": 1}));
    let client = backend.client(Route::Home);
    let mut notices = client.state.notifier().subscribe();

    actions::add_to_cart(&client.state, ProductId::new(4))
        .await
        .unwrap();

    let post = &backend.hits_for(&Method::POST, "/api/cart/")[0];
    assert_eq!(post.body, Some(json!({"product_id": 4, "quantity": 1})));
    assert_eq!(
        notices.recv().await.unwrap(),
        Notice::AddedToCart {
            product_id: ProductId::new(4)
        }
    );
}

#[tokio::test]
async fn test_detail_page_add_to_wishlist() {
    let backend = FakeBackend::start().await;
    backend.ok("/api/products/8/", product_json(8, "Rug", "2000"));
    backend.respond(Method::POST, "/api/wishlist/", StatusCode::CREATED, json!({}));
    let client = backend.client(Route::product(8));

    let page = ProductDetailPage::new(client.state.clone(), "8");
    page.load().await;

    assert!(page.add_to_wishlist().await.unwrap());
    let post = &backend.hits_for(&Method::POST, "/api/wishlist/")[0];
    assert_eq!(post.body, Some(json!({"product_id": 8})));
}

#[tokio::test]
async fn test_wishlist_move_to_cart_reloads() {
    let backend = FakeBackend::start().await;
    backend.ok(
        "/api/wishlist/",
        json!([{"id": 11, "product": product_json(5, "Vase", "700")}]),
    );
    backend.respond(
        Method::POST,
        "/api/wishlist/move_to_cart/",
        StatusCode::OK,
        json!({"status": "moved"}),
    );
    let client = backend.client(Route::Wishlist);

    let page = WishlistPage::new(client.state.clone());
    page.load().await;
    assert_eq!(page.entries()[0].id, WishlistEntryId::new(11));
    assert!(page.render().unwrap().html.contains("Vase"));

    page.move_to_cart(ProductId::new(5)).await.unwrap();

    let post = &backend.hits_for(&Method::POST, "/api/wishlist/move_to_cart/")[0];
    assert_eq!(post.body, Some(json!({"product_id": 5})));
    assert_eq!(backend.count(&Method::GET, "/api/wishlist/"), 2);
}

#[tokio::test]
async fn test_wishlist_remove_entry() {
    let backend = FakeBackend::start().await;
    backend.ok("/api/wishlist/", json!([]));
    backend.respond(Method::DELETE, "/api/wishlist/11/", StatusCode::OK, json!({}));
    let client = backend.client(Route::Wishlist);

    let page = WishlistPage::new(client.state.clone());
    page.remove(WishlistEntryId::new(11)).await.unwrap();

    assert_eq!(backend.count(&Method::DELETE, "/api/wishlist/11/"), 1);
    assert!(page.render().unwrap().html.contains("No items in wishlist."));
}
