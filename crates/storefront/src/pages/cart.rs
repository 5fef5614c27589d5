//! Cart page (`#/cart`).

use askama::Template;
use glasscart_core::{CartLineId, Price};
use tracing::instrument;

use super::actions::report;
use super::resource::{LoadOutcome, Resource};
use crate::api::{ApiError, CartLine, cart_total};
use crate::components::CartRowView;
use crate::components::cart_row::row_element_id;
use crate::dom::View;
use crate::error::Result;
use crate::state::AppState;

#[derive(Template)]
#[template(path = "pages/cart.html")]
struct CartTemplate {
    error: Option<String>,
    rows: Vec<CartRowView>,
    total: String,
}

/// Parse a quantity input: blank or unparsable is 1, and 1 is the minimum.
#[must_use]
pub fn parse_quantity(raw: &str) -> u32 {
    raw.trim().parse::<i64>().map_or(1, |q| {
        u32::try_from(q.max(1)).unwrap_or(u32::MAX)
    })
}

/// The current user's cart.
#[derive(Debug)]
pub struct CartPage {
    state: AppState,
    lines: Resource<Vec<CartLine>>,
}

impl CartPage {
    #[must_use]
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            lines: Resource::new(),
        }
    }

    #[instrument(skip(self))]
    pub async fn load(&self) -> LoadOutcome {
        self.lines
            .load(self.state.api().cart(), |_: &ApiError| {
                "Failed to load cart".to_owned()
            })
            .await
    }

    #[must_use]
    pub fn lines(&self) -> Vec<CartLine> {
        self.lines.with(Clone::clone)
    }

    /// The last load error, if the load failed.
    #[must_use]
    pub fn error(&self) -> Option<String> {
        self.lines.error()
    }

    /// Sum of the server-computed line totals.
    #[must_use]
    pub fn total(&self) -> Price {
        self.lines.with(|lines| cart_total(lines))
    }

    async fn reload_after(
        &self,
        result: std::result::Result<(), ApiError>,
    ) -> std::result::Result<(), ApiError> {
        if !matches!(result, Err(ApiError::Unauthorized)) {
            self.load().await;
        }
        result
    }

    /// Set a line's quantity (at least 1), then reload.
    ///
    /// # Errors
    ///
    /// Returns the API error after it has been reported.
    pub async fn update_quantity(
        &self,
        id: CartLineId,
        quantity: u32,
    ) -> std::result::Result<(), ApiError> {
        let result = self.state.api().update_cart_line(id, quantity.max(1)).await;
        let result = report(&self.state, "update quantity", result);
        self.reload_after(result).await
    }

    /// Remove a line, then reload.
    ///
    /// # Errors
    ///
    /// Returns the API error after it has been reported.
    pub async fn remove(&self, id: CartLineId) -> std::result::Result<(), ApiError> {
        let result = self.state.api().remove_cart_line(id).await;
        let result = report(&self.state, "remove from cart", result);
        self.reload_after(result).await
    }

    /// Request the WhatsApp checkout link and open it.
    ///
    /// Returns the opened URL, or `None` when the backend sent none.
    ///
    /// # Errors
    ///
    /// Returns the API error after it has been reported.
    #[instrument(skip(self))]
    pub async fn checkout(&self) -> std::result::Result<Option<String>, ApiError> {
        let checkout = match self.state.api().whatsapp_checkout().await {
            Ok(checkout) => checkout,
            Err(e) => return report(&self.state, "checkout", Err(e)).map(|()| None),
        };

        match checkout.wa_url.filter(|url| !url.is_empty()) {
            Some(url) => {
                self.state.opener().open(&url);
                Ok(Some(url))
            }
            None => {
                tracing::warn!("Checkout returned no link");
                Ok(None)
            }
        }
    }

    #[must_use]
    pub fn item_count(&self) -> usize {
        self.lines.with(Vec::len)
    }

    /// # Errors
    ///
    /// Returns an error if the template fails to render.
    pub fn render(&self) -> Result<View> {
        let snapshot = self.lines.snapshot();
        let rows = snapshot.value.iter().map(CartRowView::from).collect();
        let animated = snapshot.value.iter().map(row_element_id).collect();

        let html = CartTemplate {
            error: snapshot.error,
            rows,
            total: cart_total(&snapshot.value).display(),
        }
        .render()?;
        Ok(View::new(html, animated))
    }
}
