//! Product grid page (`#/products`).

use std::sync::{Mutex, MutexGuard, PoisonError};

use askama::Template;
use glasscart_core::ProductId;
use tracing::instrument;

use super::actions;
use super::product_cards;
use super::resource::{LoadOutcome, Resource};
use crate::api::{ApiError, Product, ProductFilter};
use crate::components::{FilterBar, ProductCardView};
use crate::dom::View;
use crate::error::Result;
use crate::router::Route;
use crate::state::AppState;

#[derive(Template)]
#[template(path = "pages/products.html")]
struct ProductsTemplate {
    filter_bar: String,
    loading: bool,
    error: Option<String>,
    cards: Vec<ProductCardView>,
}

/// Filterable product grid.
///
/// The grid owns the applied filter and reloads only when a debounced filter
/// from its [`FilterBar`] differs from it.
#[derive(Debug)]
pub struct ProductsPage {
    state: AppState,
    filters: FilterBar,
    products: Resource<Vec<Product>>,
    applied: Mutex<ProductFilter>,
}

impl ProductsPage {
    /// Must be called within a Tokio runtime.
    #[must_use]
    pub fn new(state: AppState) -> Self {
        let filters = FilterBar::new(state.api().clone(), ProductFilter::default());
        Self {
            state,
            filters,
            products: Resource::new(),
            applied: Mutex::new(ProductFilter::default()),
        }
    }

    fn applied(&self) -> MutexGuard<'_, ProductFilter> {
        self.applied.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Load categories (once) and the products for the applied filter.
    #[instrument(skip(self))]
    pub async fn load(&self) -> LoadOutcome {
        let filter = self.applied().clone();
        let (_, outcome) = tokio::join!(self.filters.categories(), self.fetch(&filter));
        outcome
    }

    async fn fetch(&self, filter: &ProductFilter) -> LoadOutcome {
        self.products
            .load(self.state.api().products(filter), |_: &ApiError| {
                "Failed to load products".to_owned()
            })
            .await
    }

    /// Apply a filter, reloading only if it differs from the applied one.
    ///
    /// Returns `None` when nothing changed. A skipped reload leaves the
    /// applied filter untouched so the change is picked up next time.
    #[instrument(skip(self))]
    pub async fn apply_filter(&self, filter: ProductFilter) -> Option<LoadOutcome> {
        if *self.applied() == filter {
            return None;
        }

        let outcome = self.fetch(&filter).await;
        if outcome != LoadOutcome::Skipped {
            *self.applied() = filter;
        }
        Some(outcome)
    }

    /// Wait for the filter bar to settle, then apply its filter.
    ///
    /// Returns `None` once the filter bar can no longer emit.
    pub async fn next_filter(&self) -> Option<Option<LoadOutcome>> {
        let filter = self.filters.settled().await?;
        Some(self.apply_filter(filter).await)
    }

    #[must_use]
    pub const fn filter_bar(&self) -> &FilterBar {
        &self.filters
    }

    /// The filter the shown products were loaded with.
    #[must_use]
    pub fn applied_filter(&self) -> ProductFilter {
        self.applied().clone()
    }

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

    pub fn details(&self, product_id: ProductId) {
        self.state.navigator().go(Route::product(product_id));
    }

    #[must_use]
    pub fn item_count(&self) -> usize {
        self.products.with(Vec::len)
    }

    /// # Errors
    ///
    /// Returns an error if a template fails to render.
    pub fn render(&self) -> Result<View> {
        let snapshot = self.products.snapshot();
        let (cards, animated) = if snapshot.loading || snapshot.error.is_some() {
            (Vec::new(), Vec::new())
        } else {
            product_cards(&snapshot.value)
        };

        let html = ProductsTemplate {
            filter_bar: self.filters.view().render()?,
            loading: snapshot.loading,
            error: snapshot.error,
            cards,
        }
        .render()?;
        Ok(View::new(html, animated))
    }
}
