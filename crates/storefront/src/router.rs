//! Fragment router.
//!
//! # Routes
//!
//! ```text
//! #/                 - Featured products (home, also the fallback)
//! #/products         - Filterable product grid
//! #/product/<id>     - Product detail
//! #/wishlist         - Wishlist (requires auth)
//! #/cart             - Cart (requires auth)
//! #/login            - Login form
//! #/signup           - Signup form
//! ```
//!
//! The fragment is parsed exactly once into a [`Route`]; everything past the
//! router works with the enum. Unknown fragments resolve to [`Route::Home`].

use core::fmt;
use core::str::FromStr;

use std::sync::Arc;

use tokio::sync::watch;

/// A client-side location.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Route {
    /// Featured products.
    #[default]
    Home,
    /// Product grid with filters.
    Products,
    /// A single product.
    ProductDetail {
        /// Product identifier, exactly as it appeared in the fragment.
        id: String,
    },
    Wishlist,
    Cart,
    Login,
    Signup,
}

/// Fixed routes, checked in priority order after `#/product/`.
const STATIC_ROUTES: &[(&str, Route)] = &[
    ("#/products", Route::Products),
    ("#/wishlist", Route::Wishlist),
    ("#/cart", Route::Cart),
    ("#/login", Route::Login),
    ("#/signup", Route::Signup),
];

fn parse_product_detail(rest: &str) -> Option<Route> {
    let id = rest.split('/').next().unwrap_or_default();
    if id.is_empty() {
        return None;
    }
    Some(Route::ProductDetail { id: id.to_owned() })
}

impl Route {
    /// Parse a location fragment (`#/cart`, `#/product/42`, ...).
    ///
    /// The leading `#` may be omitted. Anything unrecognised is `Home`.
    #[must_use]
    pub fn parse(fragment: &str) -> Self {
        let fragment = fragment.trim();
        let normalized;
        let fragment = if fragment.starts_with('#') {
            fragment
        } else {
            normalized = format!("#{fragment}");
            normalized.as_str()
        };

        if let Some(rest) = fragment.strip_prefix("#/product/") {
            return parse_product_detail(rest).unwrap_or_default();
        }

        STATIC_ROUTES
            .iter()
            .find(|(prefix, _)| fragment.starts_with(prefix))
            .map_or(Self::Home, |(_, route)| route.clone())
    }

    /// Canonical fragment for this route.
    #[must_use]
    pub fn fragment(&self) -> String {
        match self {
            Self::Home => "#/".to_owned(),
            Self::Products => "#/products".to_owned(),
            Self::ProductDetail { id } => format!("#/product/{id}"),
            Self::Wishlist => "#/wishlist".to_owned(),
            Self::Cart => "#/cart".to_owned(),
            Self::Login => "#/login".to_owned(),
            Self::Signup => "#/signup".to_owned(),
        }
    }

    /// Route to a product detail page.
    #[must_use]
    pub fn product(id: impl fmt::Display) -> Self {
        Self::ProductDetail { id: id.to_string() }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fragment())
    }
}

impl FromStr for Route {
    type Err = core::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

// =============================================================================
// Router / Navigator
// =============================================================================

/// Owner of the current route.
///
/// The route lives in a `watch` channel: the app subscribes to it, and
/// [`Navigator`] handles given to pages and the API client write to it.
/// Clones share the same route.
#[derive(Debug, Clone)]
pub struct Router {
    tx: Arc<watch::Sender<Route>>,
}

impl Router {
    /// Create a router positioned at `initial`.
    #[must_use]
    pub fn new(initial: Route) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    /// Create a router positioned at the route parsed from `fragment`.
    #[must_use]
    pub fn from_fragment(fragment: &str) -> Self {
        Self::new(Route::parse(fragment))
    }

    /// The current route.
    #[must_use]
    pub fn current(&self) -> Route {
        self.tx.borrow().clone()
    }

    /// Entry point for external fragment changes (the `hashchange` event).
    pub fn hash_changed(&self, fragment: &str) {
        self.navigator().go(Route::parse(fragment));
    }

    /// A handle for in-app navigation.
    #[must_use]
    pub fn navigator(&self) -> Navigator {
        Navigator {
            tx: Arc::clone(&self.tx),
        }
    }

    /// Subscribe to route changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Route> {
        self.tx.subscribe()
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new(Route::Home)
    }
}

/// Cloneable handle that rewrites the current route.
#[derive(Debug, Clone)]
pub struct Navigator {
    tx: Arc<watch::Sender<Route>>,
}

impl Navigator {
    /// Navigate to `route`.
    ///
    /// Navigating to the current route still notifies subscribers, matching
    /// a user re-selecting the same link.
    pub fn go(&self, route: Route) {
        tracing::info!(route = %route, "Navigating");
        self.tx.send_replace(route);
    }

    /// The current route.
    #[must_use]
    pub fn current(&self) -> Route {
        self.tx.borrow().clone()
    }
}
