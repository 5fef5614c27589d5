//! Presentational components shared by pages.

pub mod cart_row;
pub mod filter_bar;
pub mod product_card;

pub use cart_row::CartRowView;
pub use filter_bar::{CategoryOption, FilterBar, FilterBarTemplate};
pub use product_card::{ProductCardTemplate, ProductCardView};
