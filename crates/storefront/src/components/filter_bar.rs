//! Product filter bar.
//!
//! [`FilterBar`] owns the free-text and category inputs. Every change is
//! pushed through a [`Debouncer`]; only the state left after a quiet period
//! is published through [`FilterBar::settled`]. Categories are fetched once
//! per instance and cached, an empty list standing in for a failed fetch.

use std::sync::{Mutex, MutexGuard, PoisonError};

use askama::Template;
use tokio::sync::{OnceCell, watch};

use crate::api::{ApiClient, Category, ProductFilter};
use crate::config::FILTER_DEBOUNCE;
use crate::debounce::Debouncer;

/// One `<option>` of the category selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

/// Filter bar template.
#[derive(Template)]
#[template(path = "components/filter_bar.html")]
pub struct FilterBarTemplate {
    pub search: String,
    pub options: Vec<CategoryOption>,
}

impl FilterBarTemplate {
    /// Build the view for `filter` over the loaded `categories`.
    #[must_use]
    pub fn new(filter: &ProductFilter, categories: &[Category]) -> Self {
        let mut options = vec![CategoryOption {
            value: String::new(),
            label: "All Categories".to_owned(),
            selected: filter.category.is_empty(),
        }];
        options.extend(categories.iter().map(|c| {
            let value = c.id.to_string();
            CategoryOption {
                selected: value == filter.category,
                value,
                label: c.name.clone(),
            }
        }));

        Self {
            search: filter.name.clone(),
            options,
        }
    }
}

/// Filter bar controller.
pub struct FilterBar {
    api: ApiClient,
    current: Mutex<ProductFilter>,
    categories: OnceCell<Vec<Category>>,
    debouncer: Debouncer<ProductFilter>,
    settled: tokio::sync::Mutex<watch::Receiver<ProductFilter>>,
}

impl std::fmt::Debug for FilterBar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterBar")
            .field("current", &*self.lock())
            .field("categories_loaded", &self.categories.initialized())
            .finish_non_exhaustive()
    }
}

impl FilterBar {
    /// Create a filter bar starting from `initial`.
    ///
    /// Must be called within a Tokio runtime.
    #[must_use]
    pub fn new(api: ApiClient, initial: ProductFilter) -> Self {
        let (tx, rx) = watch::channel(initial.clone());
        let debouncer = Debouncer::new(FILTER_DEBOUNCE, move |filter| {
            tx.send_replace(filter);
        });

        Self {
            api,
            current: Mutex::new(initial),
            categories: OnceCell::new(),
            debouncer,
            settled: tokio::sync::Mutex::new(rx),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ProductFilter> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn update(&self, change: impl FnOnce(&mut ProductFilter)) {
        let snapshot = {
            let mut current = self.lock();
            change(&mut current);
            current.clone()
        };
        self.debouncer.push(snapshot);
    }

    /// Set the free-text search.
    pub fn set_search(&self, text: &str) {
        self.update(|f| text.clone_into(&mut f.name));
    }

    /// Select a category by id; empty selects all categories.
    pub fn set_category(&self, category: &str) {
        self.update(|f| category.clone_into(&mut f.category));
    }

    /// The raw input state, before debouncing.
    #[must_use]
    pub fn current(&self) -> ProductFilter {
        self.lock().clone()
    }

    /// Wait for the next debounced filter.
    ///
    /// Returns `None` once the bar can no longer emit.
    pub async fn settled(&self) -> Option<ProductFilter> {
        let mut rx = self.settled.lock().await;
        rx.changed().await.ok()?;
        let filter = rx.borrow_and_update().clone();
        Some(filter)
    }

    /// The category list, fetched on first use.
    pub async fn categories(&self) -> &[Category] {
        self.categories
            .get_or_init(|| async {
                self.api.categories().await.unwrap_or_else(|e| {
                    tracing::warn!(error = %e, "Failed to load categories");
                    Vec::new()
                })
            })
            .await
    }

    /// The view for the current input state.
    ///
    /// Uses whatever categories are cached; none before the first load.
    #[must_use]
    pub fn view(&self) -> FilterBarTemplate {
        let categories = self.categories.get().map_or(&[][..], Vec::as_slice);
        FilterBarTemplate::new(&self.current(), categories)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use glasscart_core::CategoryId;

    use super::*;

    fn categories() -> Vec<Category> {
        vec![
            Category {
                id: CategoryId::new(1),
                name: "Decor".into(),
            },
            Category {
                id: CategoryId::new(2),
                name: "Kitchen".into(),
            },
        ]
    }

    #[test]
    fn test_view_marks_selected_category() {
        let filter = ProductFilter {
            category: "2".into(),
            name: "mug".into(),
        };
        let view = FilterBarTemplate::new(&filter, &categories());

        assert_eq!(view.options.len(), 3);
        assert_eq!(view.options[0].label, "All Categories");
        assert!(!view.options[0].selected);
        assert!(view.options[2].selected);

        let html = view.render().unwrap();
        assert!(html.contains(r#"value="mug""#));
        assert!(html.contains("Kitchen"));
    }

    #[test]
    fn test_view_defaults_to_all_categories() {
        let view = FilterBarTemplate::new(&ProductFilter::default(), &[]);
        assert_eq!(view.options.len(), 1);
        assert!(view.options[0].selected);
    }
}
