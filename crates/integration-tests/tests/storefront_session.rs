//! Login, signup, logout and 401 handling against the fake backend.

#![allow(clippy::unwrap_used)]

use std::time::{Duration, Instant};

use axum::http::{Method, StatusCode};
use glasscart_integration_tests::FakeBackend;
use glasscart_storefront::Route;
use glasscart_storefront::api::{ApiError, Credentials, SignupForm};
use glasscart_storefront::notify::Notice;
use glasscart_storefront::pages::signup::{SIGNUP_FAILED, SIGNUP_SUCCESS};
use glasscart_storefront::pages::{CartPage, LoginPage, SignupPage};
use secrecy::ExposeSecret;
use serde_json::json;

#[tokio::test]
async fn test_login_stores_token_and_goes_home() {
    let backend = FakeBackend::start().await;
    backend.respond(
        Method::POST,
        "/api/token/",
        StatusCode::OK,
        json!({"access": "tok-1", "refresh": "r"}),
    );
    let client = backend.client(Route::Login);
    let mut notices = client.state.notifier().subscribe();

    let page = LoginPage::new(client.state.clone());
    assert!(page.submit(&Credentials::new("asha", "hunter2")).await);

    let token = client.state.auth().token().unwrap();
    assert_eq!(token.expose_secret(), "tok-1");
    assert_eq!(client.router.current(), Route::Home);
    assert_eq!(notices.recv().await.unwrap(), Notice::LoggedIn);

    let hit = &backend.hits_for(&Method::POST, "/api/token/")[0];
    assert_eq!(
        hit.body,
        Some(json!({"username": "asha", "password": "hunter2"}))
    );
    assert_eq!(hit.authorization, None);
}

#[tokio::test]
async fn test_rejected_login_stays_on_login_page() {
    let backend = FakeBackend::start().await;
    backend.respond(
        Method::POST,
        "/api/token/",
        StatusCode::UNAUTHORIZED,
        json!({"detail": "No active account found with the given credentials"}),
    );
    let client = backend.client(Route::Login);

    let page = LoginPage::new(client.state.clone());
    assert!(!page.submit(&Credentials::new("asha", "wrong")).await);

    assert_eq!(page.error().as_deref(), Some("Invalid credentials"));
    assert!(client.state.auth().token().is_none());
    assert_eq!(client.router.current(), Route::Login);
    assert!(page.render().unwrap().html.contains("Invalid credentials"));
}

#[tokio::test]
async fn test_bearer_header_follows_login_state() {
    let backend = FakeBackend::start().await;
    backend.ok("/api/cart/", json!([]));
    let client = backend.client(Route::Cart);

    client.login_as("tok-2");
    client.state.api().cart().await.unwrap();

    client.state.logout();
    assert_eq!(client.router.current(), Route::Login);
    client.state.api().cart().await.unwrap();

    let auth: Vec<Option<String>> = backend
        .hits_for(&Method::GET, "/api/cart/")
        .into_iter()
        .map(|hit| hit.authorization)
        .collect();
    assert_eq!(auth, vec![Some("Bearer tok-2".into()), None]);
}

#[tokio::test]
async fn test_unauthorized_response_redirects_to_login() {
    let backend = FakeBackend::start().await;
    backend.respond(
        Method::GET,
        "/api/cart/",
        StatusCode::UNAUTHORIZED,
        json!({"detail": "Authentication credentials were not provided."}),
    );
    let client = backend.client(Route::Cart);

    let err = client.state.api().cart().await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized));
    assert_eq!(client.router.current(), Route::Login);
}

#[tokio::test]
async fn test_unauthorized_page_load_records_error_and_redirects() {
    let backend = FakeBackend::start().await;
    backend.respond(
        Method::GET,
        "/api/cart/",
        StatusCode::UNAUTHORIZED,
        json!({}),
    );
    let client = backend.client(Route::Cart);

    let page = CartPage::new(client.state.clone());
    page.load().await;

    assert!(page.lines().is_empty());
    assert_eq!(client.router.current(), Route::Login);
}

#[tokio::test]
async fn test_signup_redirects_to_login_after_delay() {
    let backend = FakeBackend::start().await;
    backend.respond(Method::POST, "/api/signup/", StatusCode::CREATED, json!({"id": 5}));
    let client = backend.client(Route::Signup);
    let mut routes = client.router.subscribe();

    let form = SignupForm {
        username: "asha".into(),
        password: "pw".to_owned().into(),
        email: "asha@example.com".into(),
        ..SignupForm::default()
    };

    let page = SignupPage::new(client.state.clone());
    let started = Instant::now();
    assert!(page.submit(&form).await);
    assert_eq!(page.message().as_deref(), Some(SIGNUP_SUCCESS));
    assert_eq!(client.router.current(), Route::Signup);

    tokio::time::timeout(Duration::from_secs(3), routes.changed())
        .await
        .unwrap()
        .unwrap();
    assert!(started.elapsed() >= Duration::from_millis(800));
    assert_eq!(client.router.current(), Route::Login);

    let body = backend.hits_for(&Method::POST, "/api/signup/")[0]
        .body
        .clone()
        .unwrap();
    assert_eq!(body["email"], "asha@example.com");
    assert_eq!(body["password"], "pw");
}

#[tokio::test]
async fn test_rejected_signup_does_not_redirect() {
    let backend = FakeBackend::start().await;
    backend.respond(
        Method::POST,
        "/api/signup/",
        StatusCode::BAD_REQUEST,
        json!({"username": ["A user with that username already exists."]}),
    );
    let client = backend.client(Route::Signup);

    let page = SignupPage::new(client.state.clone());
    assert!(!page.submit(&SignupForm::default()).await);
    assert_eq!(page.message().as_deref(), Some(SIGNUP_FAILED));

    tokio::time::sleep(Duration::from_millis(900)).await;
    assert_eq!(client.router.current(), Route::Signup);
}

#[tokio::test]
async fn test_dropping_signup_page_cancels_redirect() {
    let backend = FakeBackend::start().await;
    backend.respond(Method::POST, "/api/signup/", StatusCode::CREATED, json!({}));
    let client = backend.client(Route::Signup);

    let page = SignupPage::new(client.state.clone());
    assert!(page.submit(&SignupForm::default()).await);
    drop(page);

    tokio::time::sleep(Duration::from_millis(900)).await;
    assert_eq!(client.router.current(), Route::Signup);
}
