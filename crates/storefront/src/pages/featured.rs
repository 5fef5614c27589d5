//! Featured products page (`#/`).

use std::sync::atomic::{AtomicBool, Ordering};

use askama::Template;
use glasscart_core::ProductId;
use tracing::instrument;

use super::actions;
use super::product_cards;
use super::resource::{LoadOutcome, Resource};
use crate::api::{ApiError, Product, ProductFilter};
use crate::components::ProductCardView;
use crate::config::FEATURED_FALLBACK_LIMIT;
use crate::dom::View;
use crate::error::Result;
use crate::router::Route;
use crate::state::AppState;

#[derive(Template)]
#[template(path = "pages/featured.html")]
struct FeaturedTemplate {
    loading: bool,
    error: Option<String>,
    cards: Vec<ProductCardView>,
}

/// Featured products, falling back to the first catalog products when
/// nothing is featured.
#[derive(Debug)]
pub struct FeaturedPage {
    state: AppState,
    products: Resource<Vec<Product>>,
    fallback_used: AtomicBool,
}

impl FeaturedPage {
    #[must_use]
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            products: Resource::new(),
            fallback_used: AtomicBool::new(false),
        }
    }

    /// Fetch featured products.
    ///
    /// An empty featured list triggers one unfiltered catalog fetch per page
    /// instance, capped to the first few products.
    #[instrument(skip(self))]
    pub async fn load(&self) -> LoadOutcome {
        self.products
            .load(self.fetch(), |e: &ApiError| {
                format!("Failed to load products: {e}")
            })
            .await
    }

    async fn fetch(&self) -> std::result::Result<Vec<Product>, ApiError> {
        let api = self.state.api();
        let featured = api.featured_products().await?;
        if !featured.is_empty() || self.fallback_used.swap(true, Ordering::AcqRel) {
            return Ok(featured);
        }

        tracing::info!("No featured products, falling back to the catalog");
        let mut all = api.products(&ProductFilter::default()).await?;
        all.truncate(FEATURED_FALLBACK_LIMIT);
        Ok(all)
    }

    /// Products currently shown.
    #[must_use]
    pub fn products(&self) -> Vec<Product> {
        self.products.with(Clone::clone)
    }

    #[must_use]
    pub fn error(&self) -> Option<String> {
        self.products.error()
    }

    /// # Errors
    ///
    /// Returns the API error after it has been reported.
    pub async fn add_to_cart(&self, product_id: ProductId) -> std::result::Result<(), ApiError> {
        actions::add_to_cart(&self.state, product_id).await
    }

    /// # Errors
    ///
    /// Returns the API error after it has been reported.
    pub async fn add_to_wishlist(
        &self,
        product_id: ProductId,
    ) -> std::result::Result<(), ApiError> {
        actions::add_to_wishlist(&self.state, product_id).await
    }

    /// The empty state's "Browse All Products" action.
    pub fn browse_all(&self) {
        self.state.navigator().go(Route::Products);
    }

    pub fn details(&self, product_id: ProductId) {
        self.state.navigator().go(Route::product(product_id));
    }

    /// Number of products shown; the animator's dependency key.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.products.with(Vec::len)
    }

    /// # Errors
    ///
    /// Returns an error if the template fails to render.
    pub fn render(&self) -> Result<View> {
        let snapshot = self.products.snapshot();
        let (cards, animated) = if snapshot.loading || snapshot.error.is_some() {
            (Vec::new(), Vec::new())
        } else {
            product_cards(&snapshot.value)
        };

        let html = FeaturedTemplate {
            loading: snapshot.loading,
            error: snapshot.error,
            cards,
        }
        .render()?;
        Ok(View::new(html, animated))
    }
}
