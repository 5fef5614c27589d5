//! Catalog, cart and wishlist commands.
//!
//! # Usage
//!
//! ```bash
//! gc-cli browse '#/products'
//! gc-cli cart add 42
//! gc-cli cart update 7 3
//! gc-cli checkout
//! gc-cli wishlist move 42
//! ```

use glasscart_core::{CartLineId, ProductId, WishlistEntryId};
use glasscart_storefront::Route;
use glasscart_storefront::pages::cart::parse_quantity;
use glasscart_storefront::pages::{CartPage, Page, WishlistPage, actions};

use super::{CliError, Context, output};

/// Load the page for `fragment` and print its HTML.
///
/// # Errors
///
/// Returns an error if the page redirected to login or fails to render.
pub async fn browse(fragment: &str) -> Result<(), CliError> {
    let route = Route::parse(fragment);
    let ctx = Context::from_env(route.clone())?;

    let page = Page::for_route(&route, &ctx.state);
    page.load().await;
    ctx.ensure_not_redirected(&route)?;

    output(&page.render()?.html)?;
    Ok(())
}

async fn loaded_cart(ctx: &Context) -> Result<CartPage, CliError> {
    let page = CartPage::new(ctx.state.clone());
    page.load().await;
    ctx.ensure_loaded(&Route::Cart, page.error())?;
    Ok(page)
}

/// Print the cart lines and total.
///
/// # Errors
///
/// Returns an error if the cart cannot be loaded.
pub async fn cart_show() -> Result<(), CliError> {
    let ctx = Context::from_env(Route::Cart)?;
    let page = loaded_cart(&ctx).await?;

    let lines = page.lines();
    if lines.is_empty() {
        output("No items in cart.")?;
    }
    for line in &lines {
        output(&format!(
            "{:>6}  {:<32} {:>10} x{:<3} {:>10}",
            line.id,
            line.product.name,
            line.product.price().display(),
            line.quantity,
            line.line_total().display(),
        ))?;
    }
    output(&format!("Total: {}", page.total().display()))?;
    Ok(())
}

/// Add one unit of a product to the cart.
///
/// # Errors
///
/// Returns an error if the request fails.
pub async fn cart_add(product_id: ProductId) -> Result<(), CliError> {
    let ctx = Context::from_env(Route::Home)?;
    actions::add_to_cart(&ctx.state, product_id).await?;
    output(&format!("Added product {product_id} to cart"))?;
    Ok(())
}

/// Set a cart line's quantity. Blank, invalid or < 1 becomes 1.
///
/// # Errors
///
/// Returns an error if the request fails.
pub async fn cart_update(line_id: CartLineId, quantity: &str) -> Result<(), CliError> {
    let ctx = Context::from_env(Route::Cart)?;
    let page = CartPage::new(ctx.state.clone());
    let quantity = parse_quantity(quantity);

    page.update_quantity(line_id, quantity).await?;
    output(&format!("Line {line_id} quantity set to {quantity}"))?;
    Ok(())
}

/// Remove a cart line.
///
/// # Errors
///
/// Returns an error if the request fails.
pub async fn cart_remove(line_id: CartLineId) -> Result<(), CliError> {
    let ctx = Context::from_env(Route::Cart)?;
    CartPage::new(ctx.state.clone()).remove(line_id).await?;
    output(&format!("Removed line {line_id}"))?;
    Ok(())
}

/// Request the WhatsApp checkout link.
///
/// # Errors
///
/// Returns an error if the request fails.
pub async fn checkout() -> Result<(), CliError> {
    let ctx = Context::from_env(Route::Cart)?;
    let page = CartPage::new(ctx.state.clone());

    if page.checkout().await?.is_none() {
        output("Checkout returned no link")?;
    }
    Ok(())
}

/// Print the wishlist.
///
/// # Errors
///
/// Returns an error if the wishlist cannot be loaded.
pub async fn wishlist_show() -> Result<(), CliError> {
    let ctx = Context::from_env(Route::Wishlist)?;
    let page = WishlistPage::new(ctx.state.clone());
    page.load().await;
    ctx.ensure_loaded(&Route::Wishlist, page.error())?;

    let entries = page.entries();
    if entries.is_empty() {
        output("No items in wishlist.")?;
    }
    for entry in &entries {
        output(&format!(
            "{:>6}  {:<32} {:>10}  (product {})",
            entry.id,
            entry.product.name,
            entry.product.price().display(),
            entry.product.id,
        ))?;
    }
    Ok(())
}

/// Add a product to the wishlist.
///
/// # Errors
///
/// Returns an error if the request fails.
pub async fn wishlist_add(product_id: ProductId) -> Result<(), CliError> {
    let ctx = Context::from_env(Route::Home)?;
    actions::add_to_wishlist(&ctx.state, product_id).await?;
    output(&format!("Added product {product_id} to wishlist"))?;
    Ok(())
}

/// Remove a wishlist entry.
///
/// # Errors
///
/// Returns an error if the request fails.
pub async fn wishlist_remove(entry_id: WishlistEntryId) -> Result<(), CliError> {
    let ctx = Context::from_env(Route::Wishlist)?;
    WishlistPage::new(ctx.state.clone())
        .remove(entry_id)
        .await?;
    output(&format!("Removed wishlist entry {entry_id}"))?;
    Ok(())
}

/// Move a wishlisted product to the cart.
///
/// # Errors
///
/// Returns an error if the request fails.
pub async fn wishlist_move(product_id: ProductId) -> Result<(), CliError> {
    let ctx = Context::from_env(Route::Wishlist)?;
    WishlistPage::new(ctx.state.clone())
        .move_to_cart(product_id)
        .await?;
    output(&format!("Moved product {product_id} to cart"))?;
    Ok(())
}
