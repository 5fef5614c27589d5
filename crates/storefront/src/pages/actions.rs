//! User actions shared by several pages.
//!
//! Each action is one authenticated request. Success publishes a notice
//! where one exists; failure other than 401 publishes
//! [`Notice::ActionFailed`]. A 401 needs nothing here: the API client has
//! already navigated to the login page.

use glasscart_core::ProductId;

use crate::api::ApiError;
use crate::notify::Notice;
use crate::state::AppState;

/// Publish the outcome of a mutation and pass it through.
pub(crate) fn report(
    state: &AppState,
    action: &str,
    result: Result<(), ApiError>,
) -> Result<(), ApiError> {
    if let Err(e) = &result {
        if !e.is_unauthorized() {
            tracing::error!(action, error = %e, "Action failed");
            state.notifier().publish(Notice::ActionFailed {
                action: action.to_owned(),
                message: e.to_string(),
            });
        }
    }
    result
}

/// Add one unit of a product to the cart.
///
/// # Errors
///
/// Returns the API error after it has been reported.
pub async fn add_to_cart(state: &AppState, product_id: ProductId) -> Result<(), ApiError> {
    let result = state.api().add_to_cart(product_id, 1).await;
    if result.is_ok() {
        state.notifier().publish(Notice::AddedToCart { product_id });
    }
    report(state, "add to cart", result)
}

/// Add a product to the wishlist.
///
/// # Errors
///
/// Returns the API error after it has been reported.
pub async fn add_to_wishlist(state: &AppState, product_id: ProductId) -> Result<(), ApiError> {
    let result = state.api().add_to_wishlist(product_id).await;
    if result.is_ok() {
        state
            .notifier()
            .publish(Notice::AddedToWishlist { product_id });
    }
    report(state, "add to wishlist", result)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use reqwest::StatusCode;

    use super::*;
    use crate::config::StorefrontConfig;
    use crate::dom::LogOpener;
    use crate::router::Router;
    use crate::storage::MemoryStorage;

    fn state() -> AppState {
        let config = StorefrontConfig::for_base_url("http://127.0.0.1:9").unwrap();
        AppState::new(
            config,
            Arc::new(MemoryStorage::new()),
            Router::default().navigator(),
            Arc::new(LogOpener),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_failure_is_published() {
        let state = state();
        let mut rx = state.notifier().subscribe();

        let err = ApiError::Status {
            status: StatusCode::BAD_REQUEST,
            body: String::new(),
        };
        assert!(report(&state, "remove", Err(err)).is_err());

        match rx.try_recv() {
            Ok(Notice::ActionFailed { action, message }) => {
                assert_eq!(action, "remove");
                assert_eq!(message, "HTTP 400 Bad Request");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unauthorized_is_not_published() {
        let state = state();
        let mut rx = state.notifier().subscribe();

        assert!(report(&state, "remove", Err(ApiError::Unauthorized)).is_err());
        assert!(rx.try_recv().is_err());
    }
}
