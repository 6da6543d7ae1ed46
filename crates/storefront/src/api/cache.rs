//! Catalog cache value types.

use super::products::{Product, ProductPage};

/// Values stored in the catalog cache.
#[derive(Clone)]
pub(crate) enum CatalogCacheValue {
    Product(Box<Product>),
    Page(ProductPage),
}
