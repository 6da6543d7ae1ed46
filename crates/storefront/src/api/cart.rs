//! Cart surface of the remote API.
//!
//! Never cached - the cart is mutable state owned by the remote service.

use reqwest::header::ACCEPT;
use secrecy::{ExposeSecret, SecretString};
use tracing::instrument;

use redseam_core::{ProductId, Quantity};

use crate::cart::{CartGateway, CartLineItem, LineItemKey};
use crate::checkout::{CheckoutReceipt, OrderDetails};

use super::types::{CartItemBody, CartLineDto, CheckoutResponseDto};
use super::{ApiClient, ApiError, handle_empty_response, handle_response};

impl ApiClient {
    /// Fetch the authoritative cart contents.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the token is rejected.
    #[instrument(skip(self, token))]
    pub async fn fetch_cart(&self, token: &SecretString) -> Result<Vec<CartLineItem>, ApiError> {
        let response = self
            .inner
            .http
            .get(self.endpoint("/cart"))
            .header(ACCEPT, "application/json")
            .bearer_auth(token.expose_secret())
            .send()
            .await?;

        let lines: Vec<CartLineDto> = handle_response(response).await?;
        Ok(lines.into_iter().map(CartLineDto::into_line_item).collect())
    }

    /// Add a product+variant to the cart, returning the authoritative line.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the token is rejected.
    #[instrument(skip(self, token, body), fields(product_id = %product_id))]
    pub async fn add_cart_item(
        &self,
        token: &SecretString,
        product_id: ProductId,
        body: &CartItemBody,
    ) -> Result<CartLineItem, ApiError> {
        let response = self
            .inner
            .http
            .post(self.endpoint(&format!("/cart/products/{product_id}")))
            .header(ACCEPT, "application/json")
            .bearer_auth(token.expose_secret())
            .json(body)
            .send()
            .await?;

        let line: CartLineDto = handle_response(response).await?;
        Ok(line.into_line_item())
    }

    /// Update a cart line's quantity, returning the authoritative line.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the token is rejected.
    #[instrument(skip(self, token), fields(key = %key))]
    pub async fn update_cart_item(
        &self,
        token: &SecretString,
        key: &LineItemKey,
        quantity: Quantity,
    ) -> Result<CartLineItem, ApiError> {
        let body = CartItemBody {
            quantity: quantity.get(),
            color: key.color.clone(),
            size: key.size.clone(),
        };

        let response = self
            .inner
            .http
            .patch(self.endpoint(&format!("/cart/products/{}", key.product_id)))
            .header(ACCEPT, "application/json")
            .bearer_auth(token.expose_secret())
            .json(&body)
            .send()
            .await?;

        let line: CartLineDto = handle_response(response).await?;
        Ok(line.into_line_item())
    }

    /// Remove a product from the cart. A 204 is the usual success.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the token is rejected.
    #[instrument(skip(self, token), fields(product_id = %product_id))]
    pub async fn remove_cart_item(
        &self,
        token: &SecretString,
        product_id: ProductId,
    ) -> Result<(), ApiError> {
        let response = self
            .inner
            .http
            .delete(self.endpoint(&format!("/cart/products/{product_id}")))
            .header(ACCEPT, "application/json")
            .bearer_auth(token.expose_secret())
            .send()
            .await?;

        handle_empty_response(response).await
    }

    /// Submit the cart as an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the token is rejected, or
    /// the order details fail remote validation.
    #[instrument(skip(self, token, order))]
    pub async fn submit_checkout(
        &self,
        token: &SecretString,
        order: &OrderDetails,
    ) -> Result<CheckoutReceipt, ApiError> {
        let response = self
            .inner
            .http
            .post(self.endpoint("/cart/checkout"))
            .header(ACCEPT, "application/json")
            .bearer_auth(token.expose_secret())
            .json(order)
            .send()
            .await?;

        let receipt: CheckoutResponseDto = handle_response(response).await?;
        Ok(receipt.into_receipt())
    }
}

impl CartGateway for ApiClient {
    async fn fetch_cart(&self, token: &SecretString) -> Result<Vec<CartLineItem>, ApiError> {
        Self::fetch_cart(self, token).await
    }

    async fn add_item(
        &self,
        token: &SecretString,
        product_id: ProductId,
        body: &CartItemBody,
    ) -> Result<CartLineItem, ApiError> {
        self.add_cart_item(token, product_id, body).await
    }

    async fn update_item(
        &self,
        token: &SecretString,
        key: &LineItemKey,
        quantity: Quantity,
    ) -> Result<CartLineItem, ApiError> {
        self.update_cart_item(token, key, quantity).await
    }

    async fn remove_item(
        &self,
        token: &SecretString,
        product_id: ProductId,
    ) -> Result<(), ApiError> {
        self.remove_cart_item(token, product_id).await
    }

    async fn checkout(
        &self,
        token: &SecretString,
        order: &OrderDetails,
    ) -> Result<CheckoutReceipt, ApiError> {
        self.submit_checkout(token, order).await
    }
}
