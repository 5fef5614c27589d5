//! Cart row.

use crate::api::CartLine;
use crate::dom::ElementId;

/// Cart line display data for templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartRowView {
    pub id: String,
    pub name: String,
    pub unit_price: String,
    pub quantity: u32,
    pub line_total: String,
    pub element_id: String,
}

impl From<&CartLine> for CartRowView {
    fn from(line: &CartLine) -> Self {
        Self {
            id: line.id.to_string(),
            name: line.product.name.clone(),
            unit_price: line.product.price().display(),
            quantity: line.quantity,
            line_total: line.line_total().display(),
            element_id: row_element_id(line).to_string(),
        }
    }
}

/// Animation tag of a cart row.
#[must_use]
pub fn row_element_id(line: &CartLine) -> ElementId {
    ElementId::new(format!("cart-line-{}", line.id))
}
