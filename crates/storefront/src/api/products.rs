//! Catalog surface of the remote API.
//!
//! Listings and product details are cached for 5 minutes; filtered or
//! sorted listings bypass the cache since their combinations are
//! unbounded.

use reqwest::header::ACCEPT;
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, instrument};

use redseam_core::ProductId;

use crate::cart::Brand;

use super::cache::CatalogCacheValue;
use super::types::{BrandDto, ProductDto, ProductPageDto, ProductSummaryDto};
use super::{ApiClient, ApiError, handle_response};

/// Listing sort orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductSort {
    PriceLowToHigh,
    PriceHighToLow,
    Newest,
}

impl ProductSort {
    /// The `sort` query parameter value (`-` prefix is descending).
    #[must_use]
    pub const fn query_value(self) -> &'static str {
        match self {
            Self::PriceLowToHigh => "price",
            Self::PriceHighToLow => "-price",
            Self::Newest => "-created_at",
        }
    }
}

/// Parameters of a product listing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductQuery {
    pub page: u32,
    pub sort: Option<ProductSort>,
    pub price_from: Option<Decimal>,
    pub price_to: Option<Decimal>,
}

impl Default for ProductQuery {
    fn default() -> Self {
        Self {
            page: 1,
            sort: None,
            price_from: None,
            price_to: None,
        }
    }
}

impl ProductQuery {
    /// Plain page requests are cacheable; sorted/filtered ones are not.
    fn is_cacheable(&self) -> bool {
        self.sort.is_none() && self.price_from.is_none() && self.price_to.is_none()
    }

    fn cache_key(&self) -> String {
        format!("products:{}", self.page)
    }
}

/// Product summary in a listing.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductSummary {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub cover_image: Option<String>,
}

/// One page of the product listing.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductPage {
    pub products: Vec<ProductSummary>,
    pub current_page: u32,
    pub last_page: u32,
    pub per_page: u32,
    pub total: u64,
}

/// Full product detail, including selectable variants.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub cover_image: Option<String>,
    pub images: Vec<String>,
    pub available_colors: Vec<String>,
    pub available_sizes: Vec<String>,
    pub brand: Option<Brand>,
}

impl ApiClient {
    /// Fetch a page of the product listing.
    ///
    /// A bearer token is attached when available but is not required.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn fetch_products(
        &self,
        query: &ProductQuery,
        token: Option<&SecretString>,
    ) -> Result<ProductPage, ApiError> {
        let cache_key = query.cache_key();

        if query.is_cacheable()
            && let Some(CatalogCacheValue::Page(page)) =
                self.inner.catalog_cache.get(&cache_key).await
        {
            debug!("cache hit for products page");
            return Ok(page);
        }

        let mut request = self
            .inner
            .http
            .get(self.endpoint("/products"))
            .header(ACCEPT, "application/json")
            .query(&[("page", query.page.to_string())]);

        if let Some(sort) = query.sort {
            request = request.query(&[("sort", sort.query_value())]);
        }
        if let Some(from) = query.price_from {
            request = request.query(&[("filter[price_from]", from.to_string())]);
        }
        if let Some(to) = query.price_to {
            request = request.query(&[("filter[price_to]", to.to_string())]);
        }
        if let Some(token) = token {
            request = request.bearer_auth(token.expose_secret());
        }

        let dto: ProductPageDto = handle_response(request.send().await?).await?;
        let page = convert_page(dto);

        if query.is_cacheable() {
            self.inner
                .catalog_cache
                .insert(cache_key, CatalogCacheValue::Page(page.clone()))
                .await;
        }

        Ok(page)
    }

    /// Fetch a product's detail by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the product does not exist or the request fails.
    #[instrument(skip(self, token), fields(product_id = %product_id))]
    pub async fn fetch_product(
        &self,
        product_id: ProductId,
        token: Option<&SecretString>,
    ) -> Result<Product, ApiError> {
        let cache_key = format!("product:{product_id}");

        if let Some(CatalogCacheValue::Product(product)) =
            self.inner.catalog_cache.get(&cache_key).await
        {
            debug!("cache hit for product");
            return Ok(*product);
        }

        let mut request = self
            .inner
            .http
            .get(self.endpoint(&format!("/products/{product_id}")))
            .header(ACCEPT, "application/json");

        if let Some(token) = token {
            request = request.bearer_auth(token.expose_secret());
        }

        let dto: ProductDto = handle_response(request.send().await?).await?;
        let product = convert_product(dto);

        self.inner
            .catalog_cache
            .insert(cache_key, CatalogCacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }
}

fn convert_summary(dto: ProductSummaryDto) -> ProductSummary {
    ProductSummary {
        id: ProductId::new(dto.id),
        name: dto.name,
        price: dto.price,
        cover_image: dto.cover_image,
    }
}

fn convert_page(dto: ProductPageDto) -> ProductPage {
    let products: Vec<ProductSummary> = dto.data.into_iter().map(convert_summary).collect();
    let meta = dto.meta;

    ProductPage {
        current_page: meta.as_ref().map_or(1, |m| m.current_page),
        last_page: meta.as_ref().map_or(1, |m| m.last_page),
        per_page: meta
            .as_ref()
            .map_or_else(|| u32::try_from(products.len()).unwrap_or(0), |m| m.per_page),
        total: meta
            .as_ref()
            .map_or_else(|| u64::try_from(products.len()).unwrap_or_default(), |m| m.total),
        products,
    }
}

fn convert_product(dto: ProductDto) -> Product {
    Product {
        id: ProductId::new(dto.id),
        name: dto.name,
        description: dto.description,
        price: dto.price,
        cover_image: dto.cover_image,
        images: dto.images,
        available_colors: dto.available_colors,
        available_sizes: dto.available_sizes,
        brand: dto.brand.map(BrandDto::into_brand),
    }
}
