//! Product card.

use askama::Template;

use crate::api::Product;
use crate::dom::ElementId;
use crate::router::Route;

/// Placeholder image size used on cards.
pub const CARD_IMAGE_SIZE: (u32, u32) = (400, 300);

/// Card display data for templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductCardView {
    pub id: String,
    pub name: String,
    pub price: String,
    pub category: String,
    pub image: String,
    pub detail_href: String,
    pub element_id: String,
}

impl From<&Product> for ProductCardView {
    fn from(product: &Product) -> Self {
        let (width, height) = CARD_IMAGE_SIZE;
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            price: product.price().display(),
            category: product.category_label().to_owned(),
            image: product.image_src(width, height),
            detail_href: Route::product(product.id).fragment(),
            element_id: card_element_id(product).to_string(),
        }
    }
}

/// Animation tag of a product's card.
#[must_use]
pub fn card_element_id(product: &Product) -> ElementId {
    ElementId::new(format!("product-{}", product.id))
}

/// Standalone card template.
#[derive(Template)]
#[template(path = "components/product_card.html")]
pub struct ProductCardTemplate {
    pub card: ProductCardView,
}
