//! Shop REST API client.
//!
//! # Architecture
//!
//! - [`ApiClient::fetch`] is the single authenticated-fetch wrapper: it sets
//!   the JSON content type, attaches the bearer token when asked to and one
//!   is stored, and classifies the response.
//! - A `401` on an authenticated request is handled here, once: the client
//!   navigates to the login route and returns [`ApiError::Unauthorized`].
//!   Pages only decide what to show.
//! - List endpoints are normalized through [`payload::decode_list`].
//! - No caching and no retries; every call is one request.
//!
//! # Example
//!
//! ```rust,ignore
//! use glasscart_storefront::api::ApiClient;
//!
//! let client = ApiClient::new(&config, auth, router.navigator())?;
//!
//! let featured = client.featured_products().await?;
//! client.add_to_cart(featured[0].id, 1).await?;
//! ```

pub mod payload;
pub mod types;

use std::fmt;
use std::sync::Arc;

use glasscart_core::{CartLineId, ProductId, WishlistEntryId};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use crate::auth::AuthContext;
use crate::config::StorefrontConfig;
use crate::router::{Navigator, Route};

pub use payload::{decode_list, normalize_list};
pub use types::{
    CartLine, Category, Credentials, Product, ProductFilter, SignupForm, WhatsappCheckout,
    WishlistEntry, cart_total,
};

/// Errors that can occur when talking to the shop API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (connection, DNS, TLS, ...).
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("HTTP {status}")]
    Status {
        /// Response status.
        status: StatusCode,
        /// First part of the response body, for logs.
        body: String,
    },

    /// The backend rejected the credentials (401).
    #[error("unauthorized")]
    Unauthorized,

    /// The response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Decode(#[from] serde_json::Error),

    /// The configured base URL cannot carry a path.
    #[error("API base URL cannot be used as a base")]
    InvalidBaseUrl,

    /// A header value (usually the token) contained invalid characters.
    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
}

impl ApiError {
    /// Whether this error is the unauthorized signal.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    /// HTTP status of the failed response, if there was one.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Unauthorized => Some(StatusCode::UNAUTHORIZED),
            _ => None,
        }
    }
}

/// Whether a request carries the stored bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Auth {
    /// Never attach credentials.
    None,
    /// Attach `Authorization: Bearer <token>` when a token is stored.
    Bearer,
}

// =============================================================================
// ApiRequest
// =============================================================================

/// Description of one API call.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    segments: Vec<String>,
    query: Vec<(String, String)>,
    body: Option<Value>,
    headers: HeaderMap,
}

impl ApiRequest {
    /// Request `method` on `path`, e.g. `"/api/cart/"`.
    #[must_use]
    pub fn new(method: Method, path: &str) -> Self {
        Self {
            method,
            segments: path
                .split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
                .collect(),
            query: Vec::new(),
            body: None,
            headers: HeaderMap::new(),
        }
    }

    #[must_use]
    pub fn get(path: &str) -> Self {
        Self::new(Method::GET, path)
    }

    #[must_use]
    pub fn post(path: &str) -> Self {
        Self::new(Method::POST, path)
    }

    #[must_use]
    pub fn patch(path: &str) -> Self {
        Self::new(Method::PATCH, path)
    }

    #[must_use]
    pub fn delete(path: &str) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Append one path segment. The value is percent-encoded as a unit.
    #[must_use]
    pub fn segment(mut self, segment: impl fmt::Display) -> Self {
        self.segments.push(segment.to_string());
        self
    }

    /// Add a query parameter.
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Set a JSON body.
    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Set a header, overriding the client defaults.
    #[must_use]
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// The request path with its trailing slash, for logs.
    #[must_use]
    pub fn path(&self) -> String {
        format!("/{}/", self.segments.join("/"))
    }

    /// The HTTP method.
    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }
}

// =============================================================================
// ApiClient
// =============================================================================

#[derive(Deserialize)]
struct TokenResponse {
    access: String,
}

/// Client for the shop REST API.
///
/// Cheap to clone; clones share the HTTP connection pool.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: reqwest::Client,
    base_url: Url,
    auth: AuthContext,
    navigator: Navigator,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        config: &StorefrontConfig,
        auth: AuthContext,
        navigator: Navigator,
    ) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder();
        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent.clone());
        }

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                http: builder.build()?,
                base_url: config.api_base_url.clone(),
                auth,
                navigator,
            }),
        })
    }

    /// The auth context this client reads tokens from.
    #[must_use]
    pub fn auth(&self) -> &AuthContext {
        &self.inner.auth
    }

    fn url(&self, request: &ApiRequest) -> Result<Url, ApiError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidBaseUrl)?
            .pop_if_empty()
            .extend(&request.segments)
            .push("");

        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&request.query);
        }

        Ok(url)
    }

    fn headers(&self, request: &ApiRequest, auth: Auth) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        for (name, value) in &request.headers {
            headers.insert(name, value.clone());
        }

        if auth == Auth::Bearer {
            if let Some(token) = self.inner.auth.token() {
                let mut value =
                    HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))?;
                value.set_sensitive(true);
                headers.insert(AUTHORIZATION, value);
            }
        }

        Ok(headers)
    }

    /// Send a request and classify the response.
    ///
    /// Returns the response only for 2xx statuses. A 401 on an
    /// [`Auth::Bearer`] request navigates to the login route before
    /// returning [`ApiError::Unauthorized`].
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or non-success status.
    pub async fn fetch(
        &self,
        request: ApiRequest,
        auth: Auth,
    ) -> Result<reqwest::Response, ApiError> {
        let url = self.url(&request)?;
        let headers = self.headers(&request, auth)?;

        debug!(method = %request.method, path = %request.path(), "API request");

        let mut builder = self
            .inner
            .http
            .request(request.method.clone(), url)
            .headers(headers);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            if auth == Auth::Bearer {
                tracing::info!(path = %request.path(), "Unauthorized, redirecting to login");
                self.inner.navigator.go(Route::Login);
            }
            return Err(ApiError::Unauthorized);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                status = %status,
                path = %request.path(),
                body = %body.chars().take(200).collect::<String>(),
                "API returned non-success status"
            );
            return Err(ApiError::Status {
                status,
                body: body.chars().take(500).collect(),
            });
        }

        Ok(response)
    }

    /// Send a request and decode the JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not decode.
    pub async fn fetch_json<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
        auth: Auth,
    ) -> Result<T, ApiError> {
        let bytes = self.fetch(request, auth).await?.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Send a request to a list endpoint and normalize the payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not JSON.
    pub async fn fetch_list<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
        auth: Auth,
    ) -> Result<Vec<T>, ApiError> {
        let payload: Value = self.fetch_json(request, auth).await?;
        Ok(decode_list(payload))
    }

    /// Send a request and discard the response body.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn fetch_empty(&self, request: ApiRequest, auth: Auth) -> Result<(), ApiError> {
        self.fetch(request, auth).await.map(drop)
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// List all categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        self.fetch_list(ApiRequest::get("/api/categories/"), Auth::None)
            .await
    }

    /// List products matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn products(&self, filter: &ProductFilter) -> Result<Vec<Product>, ApiError> {
        let request = filter
            .query_pairs()
            .into_iter()
            .fold(ApiRequest::get("/api/products/"), |req, (key, value)| {
                req.query(key, value)
            });
        self.fetch_list(request, Auth::None).await
    }

    /// List featured products.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn featured_products(&self) -> Result<Vec<Product>, ApiError> {
        self.fetch_list(ApiRequest::get("/api/products/featured/"), Auth::None)
            .await
    }

    /// Get a single product.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found or the API request fails.
    #[instrument(skip(self))]
    pub async fn product(&self, id: &str) -> Result<Product, ApiError> {
        self.fetch_json(ApiRequest::get("/api/products/").segment(id), Auth::None)
            .await
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// List the cart lines of the current user.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn cart(&self) -> Result<Vec<CartLine>, ApiError> {
        self.fetch_list(ApiRequest::get("/api/cart/"), Auth::Bearer)
            .await
    }

    /// Add `quantity` of a product to the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn add_to_cart(&self, product_id: ProductId, quantity: u32) -> Result<(), ApiError> {
        let body = json!({ "product_id": product_id, "quantity": quantity });
        self.fetch_empty(ApiRequest::post("/api/cart/").json(body), Auth::Bearer)
            .await
    }

    /// Change the quantity of a cart line.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn update_cart_line(&self, id: CartLineId, quantity: u32) -> Result<(), ApiError> {
        let request = ApiRequest::patch("/api/cart/")
            .segment(id)
            .json(json!({ "quantity": quantity }));
        self.fetch_empty(request, Auth::Bearer).await
    }

    /// Remove a cart line.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn remove_cart_line(&self, id: CartLineId) -> Result<(), ApiError> {
        self.fetch_empty(ApiRequest::delete("/api/cart/").segment(id), Auth::Bearer)
            .await
    }

    /// Prepare the WhatsApp checkout link for the current cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn whatsapp_checkout(&self) -> Result<WhatsappCheckout, ApiError> {
        self.fetch_json(ApiRequest::get("/api/checkout/whatsapp/"), Auth::Bearer)
            .await
    }

    // =========================================================================
    // Wishlist
    // =========================================================================

    /// List the wishlist of the current user.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn wishlist(&self) -> Result<Vec<WishlistEntry>, ApiError> {
        self.fetch_list(ApiRequest::get("/api/wishlist/"), Auth::Bearer)
            .await
    }

    /// Add a product to the wishlist.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn add_to_wishlist(&self, product_id: ProductId) -> Result<(), ApiError> {
        let request = ApiRequest::post("/api/wishlist/").json(json!({ "product_id": product_id }));
        self.fetch_empty(request, Auth::Bearer).await
    }

    /// Remove a wishlist entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn remove_wishlist_entry(&self, id: WishlistEntryId) -> Result<(), ApiError> {
        self.fetch_empty(ApiRequest::delete("/api/wishlist/").segment(id), Auth::Bearer)
            .await
    }

    /// Move a wishlisted product into the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn move_to_cart(&self, product_id: ProductId) -> Result<(), ApiError> {
        let request = ApiRequest::post("/api/wishlist/move_to_cart/")
            .json(json!({ "product_id": product_id }));
        self.fetch_empty(request, Auth::Bearer).await
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Exchange credentials for an access token.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are rejected or the API request
    /// fails.
    #[instrument(skip(self, credentials), fields(username = %credentials.username))]
    pub async fn obtain_token(&self, credentials: &Credentials) -> Result<SecretString, ApiError> {
        let request = ApiRequest::post("/api/token/").json(serde_json::to_value(credentials)?);
        let response: TokenResponse = self.fetch_json(request, Auth::None).await?;
        Ok(SecretString::from(response.access))
    }

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the form or the API request
    /// fails.
    #[instrument(skip(self, form), fields(username = %form.username))]
    pub async fn signup(&self, form: &SignupForm) -> Result<(), ApiError> {
        let request = ApiRequest::post("/api/signup/").json(serde_json::to_value(form)?);
        self.fetch_empty(request, Auth::None).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::router::Router;
    use crate::storage::MemoryStorage;

    fn client(base: &str) -> ApiClient {
        let config = StorefrontConfig::for_base_url(base).unwrap();
        let auth = AuthContext::new(Arc::new(MemoryStorage::new()));
        ApiClient::new(&config, auth, Router::default().navigator()).unwrap()
    }

    #[test]
    fn test_url_joins_segments_with_trailing_slash() {
        let client = client("http://shop.local");
        let url = client.url(&ApiRequest::get("/api/products/").segment(42)).unwrap();
        assert_eq!(url.as_str(), "http://shop.local/api/products/42/");
    }

    #[test]
    fn test_url_keeps_base_path_prefix() {
        let client = client("http://shop.local/backend/");
        let url = client.url(&ApiRequest::get("/api/cart/")).unwrap();
        assert_eq!(url.as_str(), "http://shop.local/backend/api/cart/");
    }

    #[test]
    fn test_url_encodes_segment() {
        let client = client("http://shop.local");
        let url = client.url(&ApiRequest::get("/api/products/").segment("a/b")).unwrap();
        assert_eq!(url.as_str(), "http://shop.local/api/products/a%2Fb/");
    }

    #[test]
    fn test_url_query_pairs() {
        let client = client("http://shop.local");
        let request = ApiRequest::get("/api/products/")
            .query("category", "2")
            .query("name", "brass lamp");
        let url = client.url(&request).unwrap();
        assert_eq!(
            url.as_str(),
            "http://shop.local/api/products/?category=2&name=brass+lamp"
        );
    }

    #[test]
    fn test_headers_without_token_omit_authorization() {
        let client = client("http://shop.local");
        let headers = client
            .headers(&ApiRequest::get("/api/cart/"), Auth::Bearer)
            .unwrap();
        assert_eq!(headers[CONTENT_TYPE], "application/json");
        assert!(!headers.contains_key(AUTHORIZATION));
    }

    #[test]
    fn test_headers_with_token_attach_bearer() {
        let client = client("http://shop.local");
        client.auth().set_token(&SecretString::from("tok"));

        let headers = client
            .headers(&ApiRequest::get("/api/cart/"), Auth::Bearer)
            .unwrap();
        assert_eq!(headers[AUTHORIZATION], "Bearer tok");
        assert!(headers[AUTHORIZATION].is_sensitive());

        let public = client
            .headers(&ApiRequest::get("/api/products/"), Auth::None)
            .unwrap();
        assert!(!public.contains_key(AUTHORIZATION));
    }

    #[test]
    fn test_caller_headers_override_content_type() {
        let client = client("http://shop.local");
        let request = ApiRequest::post("/api/signup/")
            .header(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        let headers = client.headers(&request, Auth::None).unwrap();
        assert_eq!(headers[CONTENT_TYPE], "text/plain");
    }

    #[test]
    fn test_request_path_for_logs() {
        let request = ApiRequest::delete("/api/wishlist/").segment(3);
        assert_eq!(request.path(), "/api/wishlist/3/");
        assert_eq!(request.method(), Method::DELETE);
    }

    #[test]
    fn test_error_status_helpers() {
        assert!(ApiError::Unauthorized.is_unauthorized());
        assert_eq!(
            ApiError::Unauthorized.status(),
            Some(StatusCode::UNAUTHORIZED)
        );
        let err = ApiError::Status {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: String::new(),
        };
        assert_eq!(err.to_string(), "HTTP 500 Internal Server Error");
        assert!(!err.is_unauthorized());
    }
}
