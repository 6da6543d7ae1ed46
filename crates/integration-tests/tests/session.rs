//! Session tracker scenarios: identity transitions, guest cart discard,
//! cross-process credential sync, and startup loads.

#![allow(clippy::unwrap_used)]

use secrecy::SecretString;

use redseam_core::UserId;
use redseam_integration_tests::{
    FakeGateway, TestContext, addition, drain, line, profile,
};
use redseam_storefront::{CartEvent, SessionError, SessionPhase};

fn two_user_gateway() -> FakeGateway {
    FakeGateway::new()
        .with_user("ada@example.com", "secret", "tok_ada", 1)
        .with_user("grace@example.com", "hopper", "tok_grace", 2)
        .with_product(1, "Linen Shirt", 10)
        .with_product(2, "Wool Coat", 80)
}

#[tokio::test]
async fn test_login_replaces_store_with_remote_cart() {
    let gateway = two_user_gateway();
    gateway.seed_cart("tok_ada", vec![line(2, "Wool Coat", 80, 1, None, None)]);

    let ctx = TestContext::new(gateway);
    ctx.login("ada@example.com", "secret").await;

    assert_eq!(ctx.tracker.phase(), SessionPhase::Authenticated(UserId::new(1)));
    let snapshot = ctx.store.snapshot();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot.items().first().unwrap().name, "Wool Coat");
}

#[tokio::test]
async fn test_login_discards_guest_items_instead_of_merging() {
    let ctx = TestContext::new(two_user_gateway());

    // Accumulate a guest cart first
    ctx.engine
        .add(addition(1, "Linen Shirt", 10, 3, None, None))
        .await
        .unwrap();
    assert!(!ctx.guest_cart.load().is_empty());

    ctx.login("ada@example.com", "secret").await;

    // Remote cart was empty; guest items must not leak into it
    assert!(ctx.store.snapshot().is_empty());
    assert!(ctx.guest_cart.load().is_empty());
}

#[tokio::test]
async fn test_identity_switch_resets_store_before_loading_new_cart() {
    let gateway = two_user_gateway();
    gateway.seed_cart("tok_grace", vec![line(2, "Wool Coat", 80, 2, None, None)]);

    let ctx = TestContext::new(gateway);
    ctx.login("ada@example.com", "secret").await;
    ctx.engine
        .add(addition(1, "Linen Shirt", 10, 2, None, None))
        .await
        .unwrap();

    // Another process logs in as a different user
    ctx.credentials
        .save(
            &SecretString::from("tok_grace"),
            &profile(2, "grace", "grace@example.com"),
        )
        .unwrap();

    let mut receiver = ctx.events.subscribe();
    ctx.tracker.sync_from_disk().await;

    assert_eq!(ctx.tracker.phase(), SessionPhase::Authenticated(UserId::new(2)));

    // The store was cleared before the new cart loaded, never merged
    let events = drain(&mut receiver);
    assert_eq!(events.first(), Some(&CartEvent::Cleared));
    for event in &events {
        if let CartEvent::Updated(snapshot) = event {
            assert!(
                snapshot.items().iter().all(|item| item.name != "Linen Shirt"),
                "previous user's items must never appear"
            );
        }
    }

    let snapshot = ctx.store.snapshot();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot.items().first().unwrap().name, "Wool Coat");
}

#[tokio::test]
async fn test_same_user_resync_keeps_cart() {
    let ctx = TestContext::new(two_user_gateway());
    ctx.login("ada@example.com", "secret").await;
    ctx.engine
        .add(addition(1, "Linen Shirt", 10, 2, None, None))
        .await
        .unwrap();
    let before = ctx.store.snapshot();

    ctx.tracker.sync_from_disk().await;

    assert_eq!(ctx.store.snapshot(), before);
}

#[tokio::test]
async fn test_logout_clears_everything() {
    let ctx = TestContext::new(two_user_gateway());
    ctx.login("ada@example.com", "secret").await;
    ctx.engine
        .add(addition(1, "Linen Shirt", 10, 1, None, None))
        .await
        .unwrap();

    let mut receiver = ctx.events.subscribe();
    ctx.tracker.logout().unwrap();

    assert_eq!(ctx.tracker.phase(), SessionPhase::Anonymous);
    assert!(ctx.store.snapshot().is_empty());
    assert!(ctx.credentials.load().is_none());

    let events = drain(&mut receiver);
    assert_eq!(
        events,
        vec![CartEvent::Cleared, CartEvent::IdentityChanged(None)]
    );
}

#[tokio::test]
async fn test_external_logout_detected_on_sync() {
    let ctx = TestContext::new(two_user_gateway());
    ctx.login("ada@example.com", "secret").await;

    // Another process removed the credentials
    ctx.credentials.clear().unwrap();
    ctx.tracker.sync_from_disk().await;

    assert_eq!(ctx.tracker.phase(), SessionPhase::Anonymous);
    assert!(ctx.store.snapshot().is_empty());
}

#[tokio::test]
async fn test_register_broadcasts_clear_requested_first() {
    let ctx = TestContext::new(FakeGateway::new());
    let mut receiver = ctx.events.subscribe();

    let form = redseam_storefront::RegistrationForm {
        username: "ada".to_string(),
        email: "ada@example.com".to_string(),
        password: "secret".to_string(),
        password_confirmation: "secret".to_string(),
        avatar: None,
    };
    let user = ctx.tracker.register(&form).await.unwrap();
    assert_eq!(user.username, "ada");

    let events = drain(&mut receiver);
    assert_eq!(events.first(), Some(&CartEvent::ClearRequested));
    assert_eq!(ctx.tracker.phase(), SessionPhase::Authenticated(user.id));
}

#[tokio::test]
async fn test_initialize_anonymous_loads_guest_file() {
    let ctx = TestContext::new(FakeGateway::new());
    ctx.guest_cart
        .save(&redseam_storefront::CartSnapshot::new(vec![line(
            1, "Linen Shirt", 10, 2, None, None,
        )]))
        .unwrap();

    ctx.tracker.initialize().await;

    assert_eq!(ctx.tracker.phase(), SessionPhase::Anonymous);
    assert_eq!(ctx.store.snapshot().total_quantity(), 2);
}

#[tokio::test]
async fn test_initialize_authenticated_loads_remote_cart() {
    let gateway = two_user_gateway();
    gateway.seed_cart("tok_ada", vec![line(1, "Linen Shirt", 10, 4, None, None)]);

    let ctx = TestContext::new(gateway);
    ctx.credentials
        .save(
            &SecretString::from("tok_ada"),
            &profile(1, "ada", "ada@example.com"),
        )
        .unwrap();

    ctx.tracker.initialize().await;

    assert_eq!(ctx.tracker.phase(), SessionPhase::Authenticated(UserId::new(1)));
    assert_eq!(ctx.store.snapshot().total_quantity(), 4);
}

#[tokio::test]
async fn test_initialize_with_rejected_token_clears_session() {
    let ctx = TestContext::new(two_user_gateway());
    ctx.credentials
        .save(
            &SecretString::from("tok_stale"),
            &profile(1, "ada", "ada@example.com"),
        )
        .unwrap();

    ctx.tracker.initialize().await;

    assert_eq!(ctx.tracker.phase(), SessionPhase::Anonymous);
    assert!(ctx.credentials.load().is_none());
    assert!(ctx.store.snapshot().is_empty());
}

#[tokio::test]
async fn test_login_validates_email_before_any_remote_call() {
    let ctx = TestContext::new(two_user_gateway());

    let result = ctx.tracker.login("not-an-email", "secret").await;

    assert!(matches!(result, Err(SessionError::Email(_))));
    assert!(ctx.gateway.calls().is_empty());
}

#[tokio::test]
async fn test_login_with_wrong_password_is_invalid_credentials() {
    let ctx = TestContext::new(two_user_gateway());

    let result = ctx.tracker.login("ada@example.com", "wrong").await;

    assert!(matches!(result, Err(SessionError::InvalidCredentials)));
    assert_eq!(ctx.tracker.phase(), SessionPhase::Anonymous);
}
