//! Integration tests for Glasscart.
//!
//! The tests drive the storefront against [`FakeBackend`], an in-process
//! axum server that answers every request from a table of canned responses
//! and records what it was sent.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p glasscart-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use glasscart_storefront::config::StorefrontConfig;
use glasscart_storefront::dom::RecordingOpener;
use glasscart_storefront::storage::MemoryStorage;
use glasscart_storefront::{AppState, Route, Router};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// A request the fake backend received.
#[derive(Debug, Clone)]
pub struct Hit {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub body: Option<Value>,
}

#[derive(Default)]
struct Backend {
    routes: Mutex<HashMap<(Method, String), (StatusCode, Value)>>,
    hits: Mutex<Vec<Hit>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

async fn handle(
    State(backend): State<Arc<Backend>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    let path = uri.path().to_owned();
    lock(&backend.hits).push(Hit {
        method: method.clone(),
        path: path.clone(),
        query: uri.query().map(str::to_owned),
        authorization: headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned),
        body: serde_json::from_slice(&body).ok(),
    });

    let canned = lock(&backend.routes).get(&(method, path)).cloned();
    let (status, body) =
        canned.unwrap_or_else(|| (StatusCode::NOT_FOUND, json!({"detail": "Not found."})));
    (status, Json(body))
}

/// In-process shop backend.
///
/// Unconfigured routes answer `404`. The server stops when dropped.
pub struct FakeBackend {
    addr: SocketAddr,
    backend: Arc<Backend>,
    task: JoinHandle<()>,
}

impl FakeBackend {
    /// Start a backend on an ephemeral port.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn start() -> Self {
        let backend = Arc::new(Backend::default());
        let app = axum::Router::new()
            .fallback(handle)
            .with_state(Arc::clone(&backend));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake backend");
        let addr = listener.local_addr().expect("Failed to read local address");

        let task = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(error = %e, "Fake backend stopped");
            }
        });

        Self {
            addr,
            backend,
            task,
        }
    }

    /// Base URL to point the storefront at.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    /// Answer `method path` with `status` and a JSON `body`.
    pub fn respond(&self, method: Method, path: &str, status: StatusCode, body: Value) {
        lock(&self.backend.routes).insert((method, path.to_owned()), (status, body));
    }

    /// Answer `GET path` with `200` and `body`.
    pub fn ok(&self, path: &str, body: Value) {
        self.respond(Method::GET, path, StatusCode::OK, body);
    }

    /// Every request received, oldest first.
    #[must_use]
    pub fn hits(&self) -> Vec<Hit> {
        lock(&self.backend.hits).clone()
    }

    /// Requests received for `method path`.
    #[must_use]
    pub fn hits_for(&self, method: &Method, path: &str) -> Vec<Hit> {
        self.hits()
            .into_iter()
            .filter(|hit| hit.method == *method && hit.path == path)
            .collect()
    }

    /// Number of requests received for `method path`.
    #[must_use]
    pub fn count(&self, method: &Method, path: &str) -> usize {
        self.hits_for(method, path).len()
    }

    /// Connect a storefront client starting at `route`.
    ///
    /// # Panics
    ///
    /// Panics if the client cannot be built.
    #[must_use]
    pub fn client(&self, route: Route) -> TestClient {
        let config = StorefrontConfig::for_base_url(&self.base_url())
            .expect("Fake backend URL is valid");
        let storage = Arc::new(MemoryStorage::new());
        let opener = Arc::new(RecordingOpener::new());
        let router = Router::new(route);
        let state = AppState::new(config, storage, router.navigator(), opener.clone())
            .expect("Failed to build app state");

        TestClient {
            state,
            router,
            opener,
        }
    }
}

impl Drop for FakeBackend {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// A storefront client wired to a [`FakeBackend`].
pub struct TestClient {
    pub state: AppState,
    pub router: Router,
    pub opener: Arc<RecordingOpener>,
}

impl TestClient {
    /// Store a token as if the user had logged in.
    pub fn login_as(&self, token: &str) {
        self.state
            .auth()
            .set_token(&secrecy::SecretString::from(token.to_owned()));
    }
}

/// A product as the backend serializes it.
#[must_use]
pub fn product_json(id: i64, name: &str, price: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "description": format!("{name} description"),
        "price": price,
        "stock": 10,
        "category": {"id": 1, "name": "Decor"},
        "category_name": "Decor",
        "image": null,
        "image_url": null
    })
}

/// `count` products with ids starting at 1.
#[must_use]
pub fn products_json(count: i64) -> Value {
    Value::Array(
        (1..=count)
            .map(|id| product_json(id, &format!("Product {id}"), "10.00"))
            .collect(),
    )
}
