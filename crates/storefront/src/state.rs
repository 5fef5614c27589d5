//! Application state shared across pages.

use std::fmt;
use std::sync::Arc;

use crate::api::{ApiClient, ApiError};
use crate::auth::AuthContext;
use crate::config::StorefrontConfig;
use crate::dom::LinkOpener;
use crate::notify::{Notice, Notifier};
use crate::router::{Navigator, Route};
use crate::storage::KeyValueStorage;

/// Application state shared across all pages.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// API client, the token store and the navigation handle.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    api: ApiClient,
    auth: AuthContext,
    navigator: Navigator,
    notifier: Notifier,
    opener: Arc<dyn LinkOpener>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("api", &self.inner.api)
            .field("auth", &self.inner.auth)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `storage` - Persistent key-value storage holding the token
    /// * `navigator` - Handle used for in-app navigation and 401 redirects
    /// * `opener` - Opens checkout links
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        config: StorefrontConfig,
        storage: Arc<dyn KeyValueStorage>,
        navigator: Navigator,
        opener: Arc<dyn LinkOpener>,
    ) -> Result<Self, ApiError> {
        let auth = AuthContext::new(storage);
        let api = ApiClient::new(&config, auth.clone(), navigator.clone())?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                api,
                auth,
                navigator,
                notifier: Notifier::new(),
                opener,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    #[must_use]
    pub fn auth(&self) -> &AuthContext {
        &self.inner.auth
    }

    #[must_use]
    pub fn navigator(&self) -> &Navigator {
        &self.inner.navigator
    }

    #[must_use]
    pub fn notifier(&self) -> &Notifier {
        &self.inner.notifier
    }

    #[must_use]
    pub fn opener(&self) -> &dyn LinkOpener {
        self.inner.opener.as_ref()
    }

    /// Forget the token and go to the login page.
    pub fn logout(&self) {
        self.inner.auth.clear_token();
        self.inner.notifier.publish(Notice::LoggedOut);
        self.inner.navigator.go(Route::Login);
    }
}
