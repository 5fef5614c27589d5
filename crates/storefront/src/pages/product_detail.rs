//! Product detail page (`#/product/<id>`).

use askama::Template;
use tracing::instrument;

use super::actions;
use super::resource::{LoadOutcome, Resource};
use crate::api::{ApiError, Product};
use crate::dom::{ElementId, View};
use crate::error::Result;
use crate::router::Route;
use crate::state::AppState;

/// Placeholder image size on the detail page.
pub const DETAIL_IMAGE_SIZE: (u32, u32) = (800, 600);

struct DetailView {
    id: String,
    name: String,
    description: String,
    price: String,
    stock: String,
    image: String,
    element_id: String,
}

#[derive(Template)]
#[template(path = "pages/product_detail.html")]
struct ProductDetailTemplate {
    loading: bool,
    product: Option<DetailView>,
}

fn detail_element_id(id: &str) -> ElementId {
    ElementId::new(format!("product-detail-{id}"))
}

/// A single product.
#[derive(Debug)]
pub struct ProductDetailPage {
    state: AppState,
    id: String,
    product: Resource<Option<Product>>,
}

impl ProductDetailPage {
    #[must_use]
    pub fn new(state: AppState, id: impl Into<String>) -> Self {
        Self {
            state,
            id: id.into(),
            product: Resource::new(),
        }
    }

    /// The product id from the route.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Fetch the product. Any failure shows as not found.
    #[instrument(skip(self), fields(id = %self.id))]
    pub async fn load(&self) -> LoadOutcome {
        let fetch = async { self.state.api().product(&self.id).await.map(Some) };
        self.product
            .load(fetch, |_: &ApiError| "Not found".to_owned())
            .await
    }

    #[must_use]
    pub fn product(&self) -> Option<Product> {
        self.product.with(Clone::clone)
    }

    /// Add the shown product to the cart.
    ///
    /// Returns `Ok(false)` when no product is loaded.
    ///
    /// # Errors
    ///
    /// Returns the API error after it has been reported.
    pub async fn add_to_cart(&self) -> std::result::Result<bool, ApiError> {
        let Some(product) = self.product() else {
            return Ok(false);
        };
        actions::add_to_cart(&self.state, product.id).await?;
        Ok(true)
    }

    /// Add the shown product to the wishlist.
    ///
    /// Returns `Ok(false)` when no product is loaded.
    ///
    /// # Errors
    ///
    /// Returns the API error after it has been reported.
    pub async fn add_to_wishlist(&self) -> std::result::Result<bool, ApiError> {
        let Some(product) = self.product() else {
            return Ok(false);
        };
        actions::add_to_wishlist(&self.state, product.id).await?;
        Ok(true)
    }

    /// The back link.
    pub fn back(&self) {
        self.state.navigator().go(Route::Home);
    }

    /// One element when a product is shown, none otherwise.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.product.with(|p| usize::from(p.is_some()))
    }

    /// # Errors
    ///
    /// Returns an error if the template fails to render.
    pub fn render(&self) -> Result<View> {
        let snapshot = self.product.snapshot();
        let (width, height) = DETAIL_IMAGE_SIZE;

        let product = if snapshot.loading || snapshot.error.is_some() {
            None
        } else {
            snapshot.value.as_ref().map(|p| DetailView {
                id: p.id.to_string(),
                name: p.name.clone(),
                description: p.description.clone().unwrap_or_default(),
                price: p.price().display(),
                stock: p.stock.map(|s| s.to_string()).unwrap_or_default(),
                image: p.image_src(width, height),
                element_id: detail_element_id(&self.id).to_string(),
            })
        };

        let animated = product
            .as_ref()
            .map(|_| vec![detail_element_id(&self.id)])
            .unwrap_or_default();

        let html = ProductDetailTemplate {
            loading: snapshot.loading,
            product,
        }
        .render()?;
        Ok(View::new(html, animated))
    }
}
