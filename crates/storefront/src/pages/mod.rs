//! Page controllers.
//!
//! A page is created for one route, loads its data, and renders into a
//! [`View`]. Each page owns its state; nothing is shared between page
//! instances except the [`AppState`].

pub mod actions;
pub mod cart;
pub mod featured;
pub mod login;
pub mod product_detail;
pub mod products;
pub mod resource;
pub mod signup;
pub mod wishlist;

pub use cart::CartPage;
pub use featured::FeaturedPage;
pub use login::LoginPage;
pub use product_detail::ProductDetailPage;
pub use products::ProductsPage;
pub use resource::{LoadOutcome, Resource, Snapshot};
pub use signup::SignupPage;
pub use wishlist::WishlistPage;

use crate::api::{Product, ProductFilter};
use crate::components::ProductCardView;
use crate::components::product_card::card_element_id;
use crate::dom::{ElementId, View};
use crate::error::Result;
use crate::router::Route;
use crate::state::AppState;

/// Card views plus their animation tags.
fn product_cards(products: &[Product]) -> (Vec<ProductCardView>, Vec<ElementId>) {
    products
        .iter()
        .map(|p| (ProductCardView::from(p), card_element_id(p)))
        .unzip()
}

/// The page mounted for a route.
#[derive(Debug)]
pub enum Page {
    Featured(FeaturedPage),
    Products(ProductsPage),
    ProductDetail(ProductDetailPage),
    Wishlist(WishlistPage),
    Cart(CartPage),
    Login(LoginPage),
    Signup(SignupPage),
}

impl Page {
    /// Create the page for `route`. Must be called within a Tokio runtime.
    #[must_use]
    pub fn for_route(route: &Route, state: &AppState) -> Self {
        let state = state.clone();
        match route {
            Route::Home => Self::Featured(FeaturedPage::new(state)),
            Route::Products => Self::Products(ProductsPage::new(state)),
            Route::ProductDetail { id } => Self::ProductDetail(ProductDetailPage::new(state, id)),
            Route::Wishlist => Self::Wishlist(WishlistPage::new(state)),
            Route::Cart => Self::Cart(CartPage::new(state)),
            Route::Login => Self::Login(LoginPage::new(state)),
            Route::Signup => Self::Signup(SignupPage::new(state)),
        }
    }

    /// Run the page's initial load. Form pages have nothing to load.
    pub async fn load(&self) -> Option<LoadOutcome> {
        match self {
            Self::Featured(page) => Some(page.load().await),
            Self::Products(page) => Some(page.load().await),
            Self::ProductDetail(page) => Some(page.load().await),
            Self::Wishlist(page) => Some(page.load().await),
            Self::Cart(page) => Some(page.load().await),
            Self::Login(_) | Self::Signup(_) => None,
        }
    }

    /// Wait for the product grid's filter bar to settle on a new filter.
    ///
    /// Cancel-safe. Never resolves on other pages.
    pub async fn settled_filter(&self) -> ProductFilter {
        if let Self::Products(page) = self {
            if let Some(filter) = page.filter_bar().settled().await {
                return filter;
            }
        }
        std::future::pending().await
    }

    /// Dependency key for the reveal animation: the number of items shown.
    #[must_use]
    pub fn item_count(&self) -> usize {
        match self {
            Self::Featured(page) => page.item_count(),
            Self::Products(page) => page.item_count(),
            Self::ProductDetail(page) => page.item_count(),
            Self::Wishlist(page) => page.item_count(),
            Self::Cart(page) => page.item_count(),
            Self::Login(_) | Self::Signup(_) => 0,
        }
    }

    /// # Errors
    ///
    /// Returns an error if a template fails to render.
    pub fn render(&self) -> Result<View> {
        match self {
            Self::Featured(page) => page.render(),
            Self::Products(page) => page.render(),
            Self::ProductDetail(page) => page.render(),
            Self::Wishlist(page) => page.render(),
            Self::Cart(page) => page.render(),
            Self::Login(page) => page.render(),
            Self::Signup(page) => page.render(),
        }
    }
}
