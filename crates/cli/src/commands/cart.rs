//! Cart commands.

use redseam_core::{ProductId, Quantity};
use redseam_storefront::{CartAddition, CartError, CartSnapshot, LineItemKey, StorefrontApp, cart};

/// Print the cart contents and totals.
#[allow(clippy::print_stdout)]
pub fn show(app: &StorefrontApp) {
    print_snapshot(&app.store().snapshot());
}

/// Run the expiry transition when a mutation came back 401.
fn settle_error(app: &StorefrontApp, e: CartError) -> Box<dyn std::error::Error> {
    if matches!(e, CartError::AuthExpired) {
        app.tracker().handle_auth_expired();
    }
    e.into()
}

/// Add a product to the cart.
///
/// Fetches the product first so a guest cart can build the line locally;
/// when no variant is given the product's first color/size is selected.
#[allow(clippy::print_stdout)]
pub async fn add(
    app: &StorefrontApp,
    id: i64,
    quantity: u32,
    color: Option<String>,
    size: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let quantity = Quantity::new(quantity)?;

    let token = app.session().token();
    let product = app
        .api()
        .fetch_product(ProductId::new(id), token.as_ref())
        .await?;

    let addition = CartAddition {
        product_id: product.id,
        name: product.name.clone(),
        unit_price: product.price,
        quantity,
        color: color.or_else(|| product.available_colors.first().cloned()),
        size: size.or_else(|| product.available_sizes.first().cloned()),
        cover_image: product.cover_image.clone(),
        brand: product.brand.clone(),
    };

    let snapshot = app
        .engine()
        .add(addition)
        .await
        .map_err(|e| settle_error(app, e))?;
    println!("added {} x{quantity}", product.name);
    print_snapshot(&snapshot);

    Ok(())
}

/// Set a cart line's quantity.
#[allow(clippy::print_stdout)]
pub async fn update(
    app: &StorefrontApp,
    id: i64,
    quantity: u32,
    color: Option<String>,
    size: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let key = LineItemKey::new(ProductId::new(id), color, size);
    let snapshot = app
        .engine()
        .update_quantity(&key, quantity)
        .await
        .map_err(|e| settle_error(app, e))?;
    print_snapshot(&snapshot);
    Ok(())
}

/// Remove a cart line.
#[allow(clippy::print_stdout)]
pub async fn remove(
    app: &StorefrontApp,
    id: i64,
    color: Option<String>,
    size: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let key = LineItemKey::new(ProductId::new(id), color, size);
    let snapshot = app
        .engine()
        .remove_item(&key)
        .await
        .map_err(|e| settle_error(app, e))?;
    print_snapshot(&snapshot);
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_snapshot(snapshot: &CartSnapshot) {
    if snapshot.is_empty() {
        println!("cart is empty");
        return;
    }

    for item in snapshot.items() {
        let variant = [item.color.as_deref(), item.size.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join("/");

        println!(
            "{:>6}  {:<30} {:>8} x{:<3} = ${}",
            item.product_id,
            if variant.is_empty() {
                item.name.clone()
            } else {
                format!("{} ({variant})", item.name)
            },
            format!("${}", item.unit_price),
            item.quantity,
            item.total_price,
        );
    }

    let delivery = cart::delivery_fee();
    println!("subtotal: ${}", snapshot.subtotal());
    println!("delivery: ${delivery}");
    println!("total:    ${}", snapshot.total(delivery));
}
