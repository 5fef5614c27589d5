//! Wishlist page (`#/wishlist`).

use askama::Template;
use glasscart_core::{ProductId, WishlistEntryId};
use tracing::instrument;

use super::actions::report;
use super::resource::{LoadOutcome, Resource};
use crate::api::{ApiError, WishlistEntry};
use crate::components::ProductCardView;
use crate::components::product_card::card_element_id;
use crate::dom::View;
use crate::error::Result;
use crate::state::AppState;

struct EntryView {
    entry_id: String,
    card: ProductCardView,
}

#[derive(Template)]
#[template(path = "pages/wishlist.html")]
struct WishlistTemplate {
    error: Option<String>,
    entries: Vec<EntryView>,
}

/// The current user's wishlist.
///
/// On this page a card's cart button moves the product to the cart and its
/// wishlist button removes the entry.
#[derive(Debug)]
pub struct WishlistPage {
    state: AppState,
    entries: Resource<Vec<WishlistEntry>>,
}

impl WishlistPage {
    #[must_use]
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            entries: Resource::new(),
        }
    }

    #[instrument(skip(self))]
    pub async fn load(&self) -> LoadOutcome {
        self.entries
            .load(self.state.api().wishlist(), |_: &ApiError| {
                "Failed to load wishlist".to_owned()
            })
            .await
    }

    #[must_use]
    pub fn entries(&self) -> Vec<WishlistEntry> {
        self.entries.with(Clone::clone)
    }

    /// The last load error, if the load failed.
    #[must_use]
    pub fn error(&self) -> Option<String> {
        self.entries.error()
    }

    /// Reload after a mutation unless the client already left for login.
    async fn reload_after(
        &self,
        result: std::result::Result<(), ApiError>,
    ) -> std::result::Result<(), ApiError> {
        if !matches!(result, Err(ApiError::Unauthorized)) {
            self.load().await;
        }
        result
    }

    /// Remove an entry, then reload.
    ///
    /// # Errors
    ///
    /// Returns the API error after it has been reported.
    pub async fn remove(&self, id: WishlistEntryId) -> std::result::Result<(), ApiError> {
        let result = self.state.api().remove_wishlist_entry(id).await;
        let result = report(&self.state, "remove from wishlist", result);
        self.reload_after(result).await
    }

    /// Move a product to the cart, then reload.
    ///
    /// # Errors
    ///
    /// Returns the API error after it has been reported.
    pub async fn move_to_cart(&self, product_id: ProductId) -> std::result::Result<(), ApiError> {
        let result = self.state.api().move_to_cart(product_id).await;
        let result = report(&self.state, "move to cart", result);
        self.reload_after(result).await
    }

    #[must_use]
    pub fn item_count(&self) -> usize {
        self.entries.with(Vec::len)
    }

    /// # Errors
    ///
    /// Returns an error if the template fails to render.
    pub fn render(&self) -> Result<View> {
        let snapshot = self.entries.snapshot();
        let entries: Vec<EntryView> = snapshot
            .value
            .iter()
            .map(|entry| EntryView {
                entry_id: entry.id.to_string(),
                card: ProductCardView::from(&entry.product),
            })
            .collect();
        let animated = snapshot
            .value
            .iter()
            .map(|entry| card_element_id(&entry.product))
            .collect();

        let html = WishlistTemplate {
            error: snapshot.error,
            entries,
        }
        .render()?;
        Ok(View::new(html, animated))
    }
}
