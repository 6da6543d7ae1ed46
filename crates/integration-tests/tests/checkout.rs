//! Checkout scenarios: preconditions, local validation, remote error
//! mapping, and the cart-clearing success path.

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;

use redseam_integration_tests::{FakeGateway, ScriptedFailure, TestContext, addition, drain};
use redseam_storefront::{CartEvent, CheckoutError, OrderDetails};

fn gateway() -> FakeGateway {
    FakeGateway::new()
        .with_user("ada@example.com", "secret", "tok_ada", 1)
        .with_product(1, "Linen Shirt", 10)
}

fn valid_order() -> OrderDetails {
    OrderDetails {
        name: "Ada".to_string(),
        surname: "Lovelace".to_string(),
        email: "ada@example.com".to_string(),
        zip_code: "0193".to_string(),
        address: "12 Analytical St".to_string(),
    }
}

async fn context_with_item() -> TestContext {
    let ctx = TestContext::new(gateway());
    ctx.login("ada@example.com", "secret").await;
    ctx.engine
        .add(addition(1, "Linen Shirt", 10, 2, None, None))
        .await
        .unwrap();
    ctx
}

#[tokio::test]
async fn test_empty_cart_is_rejected() {
    let ctx = TestContext::new(gateway());
    ctx.login("ada@example.com", "secret").await;

    let result = ctx.engine.checkout(&valid_order()).await;
    assert!(matches!(result, Err(CheckoutError::EmptyCart)));
}

#[tokio::test]
async fn test_guest_checkout_requires_authentication() {
    let ctx = TestContext::new(FakeGateway::new());
    ctx.engine
        .add(addition(1, "Linen Shirt", 10, 1, None, None))
        .await
        .unwrap();

    let result = ctx.engine.checkout(&valid_order()).await;
    assert!(matches!(result, Err(CheckoutError::RequiresAuthentication)));
}

#[tokio::test]
async fn test_missing_address_fails_locally_without_remote_call() {
    let ctx = context_with_item().await;
    let before = ctx.store.snapshot();

    let mut order = valid_order();
    order.address = String::new();

    let result = ctx.engine.checkout(&order).await;
    let Err(CheckoutError::Validation(errors)) = result else {
        panic!("expected a validation error");
    };
    assert_eq!(errors.get("address"), Some("Address is required"));

    // Validation failed before any network call, cart unchanged
    assert!(ctx.gateway.calls().iter().all(|call| call != "checkout"));
    assert_eq!(ctx.store.snapshot(), before);
}

#[tokio::test]
async fn test_malformed_email_fails_locally() {
    let ctx = context_with_item().await;

    let mut order = valid_order();
    order.email = "ada@localhost".to_string();

    let Err(CheckoutError::Validation(errors)) = ctx.engine.checkout(&order).await else {
        panic!("expected a validation error");
    };
    assert_eq!(errors.get("email"), Some("Please enter a valid email"));
}

#[tokio::test]
async fn test_success_clears_store_and_guest_file() {
    let ctx = context_with_item().await;
    let mut receiver = ctx.events.subscribe();

    let receipt = ctx.engine.checkout(&valid_order()).await.unwrap();
    assert_eq!(receipt.message, "Your order is placed successfully!");

    // The cart is gone locally, remotely, and from the fallback file
    assert!(ctx.store.snapshot().is_empty());
    assert!(ctx.gateway.server_cart("tok_ada").is_empty());
    assert!(ctx.guest_cart.load().is_empty());

    let events = drain(&mut receiver);
    assert_eq!(events, vec![CartEvent::Cleared]);
}

#[tokio::test]
async fn test_remote_validation_maps_field_errors() {
    let ctx = context_with_item().await;
    let before = ctx.store.snapshot();

    let mut remote_errors = HashMap::new();
    remote_errors.insert(
        "zip_code".to_string(),
        vec!["The zip code must be numeric.".to_string()],
    );
    ctx.gateway.fail_next(ScriptedFailure::Validation(remote_errors));

    let Err(CheckoutError::Validation(errors)) = ctx.engine.checkout(&valid_order()).await else {
        panic!("expected a validation error");
    };
    assert_eq!(errors.get("zip_code"), Some("The zip code must be numeric."));
    assert_eq!(ctx.store.snapshot(), before);
}

#[tokio::test]
async fn test_expired_token_signals_auth_expired() {
    let ctx = context_with_item().await;
    let before = ctx.store.snapshot();

    ctx.gateway.fail_next(ScriptedFailure::Unauthorized);

    let result = ctx.engine.checkout(&valid_order()).await;
    assert!(matches!(result, Err(CheckoutError::AuthExpired)));
    assert_eq!(ctx.store.snapshot(), before);
}

#[tokio::test]
async fn test_generic_failure_keeps_cart() {
    let ctx = context_with_item().await;
    let before = ctx.store.snapshot();

    ctx.gateway.fail_next(ScriptedFailure::Network);

    let result = ctx.engine.checkout(&valid_order()).await;
    assert!(matches!(result, Err(CheckoutError::Failed(_))));
    assert_eq!(ctx.store.snapshot(), before);
}
