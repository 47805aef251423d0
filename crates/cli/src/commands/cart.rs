//! Cart commands.
//!
//! # Usage
//!
//! ```bash
//! cartline cart add <product-id>
//! cartline cart decrease <product-id>
//! cartline cart discount            # applies CART_DISCOUNT_CODE
//! cartline cart clear
//! ```

use tracing::info;

use cartline_core::{CustomerId, ProductId};
use cartline_storefront::platform::Cart;
use cartline_storefront::services::{CartOutcome, QuantityChange, cart};

use super::{CommandError, Context};

/// Create a new cart.
pub async fn create(ctx: &mut Context) -> Result<(), CommandError> {
    let id = ctx.gateway.create_cart(&mut ctx.session).await?;
    info!(cart_id = %id, "Cart is ready");
    Ok(())
}

/// Add one unit of a product.
pub async fn add(ctx: &mut Context, product_id: &str) -> Result<(), CommandError> {
    let outcome = ctx
        .gateway
        .add_item(&mut ctx.session, &ProductId::new(product_id))
        .await?;
    report(ctx, outcome);
    Ok(())
}

/// Remove a product's line.
pub async fn remove(ctx: &mut Context, product_id: &str) -> Result<(), CommandError> {
    let outcome = ctx
        .gateway
        .remove_item(&mut ctx.session, &ProductId::new(product_id))
        .await?;
    report(ctx, outcome);
    Ok(())
}

/// Increase a product's quantity by one.
pub async fn increase(ctx: &mut Context, product_id: &str) -> Result<(), CommandError> {
    change(ctx, product_id, QuantityChange::Increase).await
}

/// Decrease a product's quantity by one.
pub async fn decrease(ctx: &mut Context, product_id: &str) -> Result<(), CommandError> {
    change(ctx, product_id, QuantityChange::Decrease).await
}

async fn change(
    ctx: &mut Context,
    product_id: &str,
    change: QuantityChange,
) -> Result<(), CommandError> {
    let outcome = ctx
        .gateway
        .change_quantity(&mut ctx.session, &ProductId::new(product_id), change)
        .await?;
    report(ctx, outcome);
    Ok(())
}

/// Remove every line.
pub async fn clear(ctx: &mut Context) -> Result<(), CommandError> {
    let outcome = ctx.gateway.clear_cart(&mut ctx.session).await?;
    report(ctx, outcome);
    Ok(())
}

/// Show the stored cart.
pub async fn show(ctx: &Context) -> Result<(), CommandError> {
    let cart = ctx.gateway.get_anonymous_cart().await?;
    describe(&cart);
    Ok(())
}

/// Show the signed-in customer's cart.
pub async fn mine(ctx: &Context) -> Result<(), CommandError> {
    if ctx.session.customer().is_none() {
        return Err(CommandError::NotSignedIn);
    }
    let cart = ctx.gateway.get_customer_cart(&ctx.session).await?;
    describe(&cart);
    Ok(())
}

/// List carts in the project.
pub async fn list(ctx: &Context) -> Result<(), CommandError> {
    let page = ctx.gateway.get_all_carts().await?;
    info!(count = page.count, total = ?page.total, "Carts");
    for cart in &page.results {
        info!(
            cart_id = %cart.id,
            lines = cart.line_items.len(),
            total = %cart.total_price.to_price(),
            customer_id = cart.customer_id.as_ref().map_or("-", CustomerId::as_str),
            "Listed cart"
        );
    }
    Ok(())
}

/// Show the cart total.
pub async fn total(ctx: &mut Context) -> Result<(), CommandError> {
    let current = ctx.gateway.get_anonymous_cart().await?;
    let currency = current.total_price.currency_code;
    ctx.session.replace_cart(current);

    match cart::total_price(&ctx.session) {
        Some(amount) => info!(%amount, %currency, "Cart total"),
        None => info!("No cart"),
    }
    Ok(())
}

/// Apply a discount code.
pub async fn discount(ctx: &mut Context, code: Option<&str>) -> Result<(), CommandError> {
    let cart = ctx
        .gateway
        .add_discount_code(&mut ctx.session, code)
        .await?;
    info!(codes = cart.discount_codes.len(), "Discount applied");
    describe(&cart);
    Ok(())
}

/// Attach the current cart to a customer.
pub async fn assign(ctx: &mut Context, customer_id: &str) -> Result<(), CommandError> {
    let outcome = ctx
        .gateway
        .set_customer_id(&mut ctx.session, &CustomerId::new(customer_id))
        .await?;
    report(ctx, outcome);
    Ok(())
}

/// Merge the current cart into the signed-in customer's cart.
pub async fn merge(ctx: &mut Context) -> Result<(), CommandError> {
    let result = ctx.gateway.merge_carts(&mut ctx.session).await?;
    info!(customer_id = %result.customer.id, "Signed in with cart merge");
    match &result.cart {
        Some(cart) => describe(cart),
        None => info!("Customer has no active cart"),
    }
    Ok(())
}

fn report(ctx: &Context, outcome: CartOutcome) {
    match outcome {
        CartOutcome::Updated { version } => info!(version, "Cart updated"),
        CartOutcome::Unchanged(reason) => info!(?reason, "Cart unchanged"),
    }
    if let Some(cart) = ctx.session.cart() {
        describe(cart);
    }
}

fn describe(cart: &Cart) {
    info!(
        cart_id = %cart.id,
        version = cart.version,
        items = cart.total_quantity(),
        total = %cart.total_price.to_price(),
        "Cart"
    );
    for line in &cart.line_items {
        let name = line.name.values().next().map_or("", String::as_str);
        info!(
            line_item_id = %line.id,
            product_id = %line.product_id,
            quantity = line.quantity,
            name,
            "Line item"
        );
    }
}
