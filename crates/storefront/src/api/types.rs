//! Wire DTOs and their conversions to domain types.
//!
//! The remote service is loose about optional fields; every default and
//! fallback is applied here, at the boundary, so consumers never reach
//! for alternate fields themselves. Inconsistent numeric data (zero
//! quantities, stale line totals) is normalized and logged.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use redseam_core::{BrandId, ProductId, Quantity, UserId};

use crate::cart::{Brand, CartAddition, CartLineItem};
use crate::checkout::CheckoutReceipt;
use crate::session::UserProfile;

// =============================================================================
// Request bodies
// =============================================================================

/// Body of cart line add/update requests.
#[derive(Debug, Clone, Serialize)]
pub struct CartItemBody {
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
}

impl From<&CartAddition> for CartItemBody {
    fn from(addition: &CartAddition) -> Self {
        Self {
            quantity: addition.quantity.get(),
            color: addition.color.clone(),
            size: addition.size.clone(),
        }
    }
}

// =============================================================================
// Response DTOs
// =============================================================================

/// Brand as returned by the remote service.
#[derive(Debug, Clone, Deserialize)]
pub struct BrandDto {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
}

impl BrandDto {
    pub(crate) fn into_brand(self) -> Brand {
        Brand {
            id: BrandId::new(self.id),
            name: self.name,
            logo: self.image,
        }
    }
}

/// A cart line as returned by the remote service.
#[derive(Debug, Clone, Deserialize)]
pub struct CartLineDto {
    pub id: i64,
    pub name: String,
    pub price: Decimal,
    pub quantity: u32,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub total_price: Option<Decimal>,
    #[serde(default)]
    pub brand: Option<BrandDto>,
}

impl CartLineDto {
    /// Normalize into a domain line item.
    ///
    /// Quantities below 1 are clamped (logged); the line total is always
    /// recomputed as `price × quantity` so the store invariant holds even
    /// when the server sends a stale total.
    pub(crate) fn into_line_item(self) -> CartLineItem {
        let quantity = Quantity::new(self.quantity).unwrap_or_else(|_| {
            warn!(product_id = self.id, "server returned zero quantity, clamping to 1");
            Quantity::ONE
        });

        let total_price = self.price * Decimal::from(quantity.get());
        if let Some(reported) = self.total_price
            && reported != total_price
        {
            warn!(
                product_id = self.id,
                %reported,
                expected = %total_price,
                "server line total disagrees with price × quantity"
            );
        }

        CartLineItem {
            product_id: ProductId::new(self.id),
            name: self.name,
            unit_price: self.price,
            quantity,
            color: self.color,
            size: self.size,
            cover_image: self.cover_image,
            total_price,
            brand: self.brand.map(BrandDto::into_brand),
        }
    }
}

/// User as returned by login/register/profile endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct UserDto {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
    pub email: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub profile_photo: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl UserDto {
    pub(crate) fn into_profile(self) -> UserProfile {
        let username = self
            .username
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| self.email.clone());

        UserProfile {
            id: UserId::new(self.id),
            username,
            email: self.email,
            // Older accounts carry the avatar under profile_photo
            avatar: self.avatar.or(self.profile_photo),
            created_at: self.created_at,
        }
    }
}

/// `{token, user}` payload from login and register.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthPayloadDto {
    pub token: String,
    pub user: UserDto,
}

/// Checkout success payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckoutResponseDto {
    #[serde(default)]
    pub message: Option<String>,
}

impl CheckoutResponseDto {
    pub(crate) fn into_receipt(self) -> CheckoutReceipt {
        CheckoutReceipt {
            message: self
                .message
                .unwrap_or_else(|| "Checkout successful".to_string()),
        }
    }
}

/// Product summary in a listing page.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductSummaryDto {
    pub id: i64,
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub cover_image: Option<String>,
}

/// Pagination metadata of a listing page.
#[derive(Debug, Clone, Deserialize)]
pub struct PageMetaDto {
    #[serde(default = "default_page")]
    pub current_page: u32,
    #[serde(default = "default_page")]
    pub last_page: u32,
    #[serde(default)]
    pub per_page: u32,
    #[serde(default)]
    pub total: u64,
}

const fn default_page() -> u32 {
    1
}

/// Paginated product listing.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductPageDto {
    #[serde(default)]
    pub data: Vec<ProductSummaryDto>,
    #[serde(default)]
    pub meta: Option<PageMetaDto>,
}

/// Full product detail.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductDto {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub available_colors: Vec<String>,
    #[serde(default)]
    pub available_sizes: Vec<String>,
    #[serde(default)]
    pub brand: Option<BrandDto>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_line_total_recomputed() {
        let dto: CartLineDto = serde_json::from_str(
            r#"{"id":1,"name":"Shirt","price":10,"quantity":3,"total_price":25}"#,
        )
        .unwrap();

        let item = dto.into_line_item();
        assert_eq!(item.total_price, Decimal::from(30));
    }

    #[test]
    fn test_cart_line_missing_total_derived() {
        let dto: CartLineDto =
            serde_json::from_str(r#"{"id":1,"name":"Shirt","price":12,"quantity":2}"#).unwrap();

        let item = dto.into_line_item();
        assert_eq!(item.total_price, Decimal::from(24));
        assert!(item.color.is_none());
    }

    #[test]
    fn test_cart_line_zero_quantity_clamped() {
        let dto: CartLineDto =
            serde_json::from_str(r#"{"id":1,"name":"Shirt","price":10,"quantity":0}"#).unwrap();

        let item = dto.into_line_item();
        assert_eq!(item.quantity.get(), 1);
        assert_eq!(item.total_price, Decimal::from(10));
    }

    #[test]
    fn test_cart_line_variant_fields() {
        let dto: CartLineDto = serde_json::from_str(
            r#"{"id":4,"name":"Shirt","price":10,"quantity":1,"color":"Red","size":"M","brand":{"id":2,"name":"RedSeam"}}"#,
        )
        .unwrap();

        let item = dto.into_line_item();
        assert_eq!(item.color.as_deref(), Some("Red"));
        assert_eq!(item.size.as_deref(), Some("M"));
        assert_eq!(item.brand.unwrap().name, "RedSeam");
    }

    #[test]
    fn test_user_avatar_fallback_to_profile_photo() {
        let dto: UserDto = serde_json::from_str(
            r#"{"id":9,"username":"ada","email":"ada@example.com","profile_photo":"/p.png"}"#,
        )
        .unwrap();

        let profile = dto.into_profile();
        assert_eq!(profile.avatar.as_deref(), Some("/p.png"));
    }

    #[test]
    fn test_user_missing_username_falls_back_to_email() {
        let dto: UserDto =
            serde_json::from_str(r#"{"id":9,"email":"ada@example.com"}"#).unwrap();

        assert_eq!(dto.into_profile().username, "ada@example.com");
    }

    #[test]
    fn test_checkout_response_default_message() {
        let receipt = CheckoutResponseDto::default().into_receipt();
        assert_eq!(receipt.message, "Checkout successful");

        let dto: CheckoutResponseDto =
            serde_json::from_str(r#"{"message":"Order placed"}"#).unwrap();
        assert_eq!(dto.into_receipt().message, "Order placed");
    }

    #[test]
    fn test_cart_item_body_omits_missing_variant() {
        let body = CartItemBody {
            quantity: 2,
            color: None,
            size: Some("L".to_string()),
        };

        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, r#"{"quantity":2,"size":"L"}"#);
    }
}
