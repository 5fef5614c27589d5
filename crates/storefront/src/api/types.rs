//! Wire types for the shop REST API.
//!
//! These are read-only snapshots of backend resources. Every optional field
//! defaults when missing so that partial payloads still decode.

use std::fmt;

use glasscart_core::{CartLineId, CategoryId, Price, ProductId, WishlistEntryId};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, Serializer};

// =============================================================================
// Catalog
// =============================================================================

/// Product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

/// Catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<Price>,
    #[serde(default)]
    pub stock: Option<i64>,
    /// Nested category, `null` for uncategorised products.
    #[serde(default)]
    pub category: Option<Category>,
    /// Flattened category name, when the backend provides one.
    #[serde(default)]
    pub category_name: Option<String>,
    /// Relative media path of the uploaded image.
    #[serde(default)]
    pub image: Option<String>,
    /// Absolute image URL.
    #[serde(default)]
    pub image_url: Option<String>,
}

impl Product {
    /// Unit price, zero when the backend omitted it.
    #[must_use]
    pub fn price(&self) -> Price {
        self.price.unwrap_or_default()
    }

    /// Image to display: the absolute URL, then the media path, then a
    /// placeholder seeded by the product id.
    #[must_use]
    pub fn image_src(&self, width: u32, height: u32) -> String {
        let present: fn(&Option<String>) -> Option<&str> =
            |src| src.as_deref().filter(|s| !s.is_empty());
        present(&self.image_url)
            .or_else(|| present(&self.image))
            .map_or_else(
                || format!("https://picsum.photos/seed/{}/{width}/{height}", self.id),
                str::to_owned,
            )
    }

    /// Category label: flattened name, then nested name, then `General`.
    #[must_use]
    pub fn category_label(&self) -> &str {
        self.category_name
            .as_deref()
            .or_else(|| self.category.as_ref().map(|c| c.name.as_str()))
            .filter(|name| !name.is_empty())
            .unwrap_or("General")
    }
}

/// Product list filter (the grid's query parameters).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ProductFilter {
    /// Selected category id as chosen in the selector; empty for all.
    pub category: String,
    /// Free-text name search; empty for none.
    pub name: String,
}

impl ProductFilter {
    /// Query parameters with non-empty values only.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, &str)> {
        [("category", self.category.trim()), ("name", self.name.trim())]
            .into_iter()
            .filter(|(_, value)| !value.is_empty())
            .collect()
    }
}

// =============================================================================
// Cart & Wishlist
// =============================================================================

/// A line in the shopping cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: CartLineId,
    pub product: Product,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    /// Server-computed line total. The backend serializer names it
    /// `total_price`.
    #[serde(default, alias = "total_price")]
    pub line_total: Option<Price>,
}

const fn default_quantity() -> u32 {
    1
}

impl CartLine {
    /// Line total, zero when missing.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.line_total.unwrap_or_default()
    }
}

/// Sum of all line totals.
#[must_use]
pub fn cart_total(lines: &[CartLine]) -> Price {
    lines.iter().map(CartLine::line_total).sum()
}

/// A wishlist entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WishlistEntry {
    pub id: WishlistEntryId,
    pub product: Product,
}

/// Response of the WhatsApp checkout endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct WhatsappCheckout {
    #[serde(default)]
    pub wa_url: Option<String>,
}

// =============================================================================
// Auth
// =============================================================================

fn serialize_secret<S: Serializer>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

/// Login credentials.
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    #[serde(serialize_with = "serialize_secret")]
    pub password: SecretString,
}

impl Credentials {
    /// Build credentials from a username and password.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Registration form.
#[derive(Clone, Serialize)]
pub struct SignupForm {
    pub username: String,
    #[serde(serialize_with = "serialize_secret")]
    pub password: SecretString,
    pub email: String,
    pub full_name: String,
    pub phone: String,
    pub address: String,
}

impl Default for SignupForm {
    fn default() -> Self {
        Self {
            username: String::new(),
            password: SecretString::from(""),
            email: String::new(),
            full_name: String::new(),
            phone: String::new(),
            address: String::new(),
        }
    }
}

impl fmt::Debug for SignupForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignupForm")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("email", &self.email)
            .field("full_name", &self.full_name)
            .field("phone", &self.phone)
            .field("address", &self.address)
            .finish()
    }
}
