//! Catalog browsing commands.

use rust_decimal::Decimal;

use redseam_core::ProductId;
use redseam_storefront::StorefrontApp;
use redseam_storefront::api::{ProductQuery, ProductSort};

/// List a page of products.
#[allow(clippy::print_stdout)]
pub async fn list(
    app: &StorefrontApp,
    page: u32,
    sort: Option<ProductSort>,
    min_price: Option<Decimal>,
    max_price: Option<Decimal>,
) -> Result<(), Box<dyn std::error::Error>> {
    let query = ProductQuery {
        page,
        sort,
        price_from: min_price,
        price_to: max_price,
    };

    let token = app.session().token();
    let listing = app.api().fetch_products(&query, token.as_ref()).await?;

    for product in &listing.products {
        println!("{:>6}  ${:<10}  {}", product.id, product.price, product.name);
    }
    println!(
        "page {}/{} ({} products)",
        listing.current_page, listing.last_page, listing.total
    );

    Ok(())
}

/// Show one product's detail.
#[allow(clippy::print_stdout)]
pub async fn show(app: &StorefrontApp, id: i64) -> Result<(), Box<dyn std::error::Error>> {
    let token = app.session().token();
    let product = app
        .api()
        .fetch_product(ProductId::new(id), token.as_ref())
        .await?;

    println!("{} (#{})", product.name, product.id);
    println!("price: ${}", product.price);
    if let Some(brand) = &product.brand {
        println!("brand: {}", brand.name);
    }
    if !product.available_colors.is_empty() {
        println!("colors: {}", product.available_colors.join(", "));
    }
    if !product.available_sizes.is_empty() {
        println!("sizes: {}", product.available_sizes.join(", "));
    }
    if let Some(description) = &product.description {
        println!("\n{description}");
    }

    Ok(())
}
