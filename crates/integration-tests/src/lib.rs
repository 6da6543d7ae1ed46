//! Integration test harness for the RedSeam storefront client.
//!
//! The reconciliation engine and session tracker run against
//! [`FakeGateway`], an in-memory stand-in for the remote commerce API
//! with scripted failures: per-token server carts, a seeded user table
//! and product catalog, and a one-shot failure slot for exercising
//! rollback paths.

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use tempfile::TempDir;

use redseam_core::{ProductId, Quantity, UserId};
use redseam_storefront::api::types::CartItemBody;
use redseam_storefront::{
    ApiError, AuthPayload, CartAddition, CartEngine, CartEvent, CartEvents, CartGateway,
    CartLineItem, CartStore, CheckoutReceipt, CredentialFile, GuestCartFile, IdentityGateway,
    LineItemKey, OrderDetails, RegistrationForm, SessionState, SessionTracker, UserProfile,
};

// =============================================================================
// FakeGateway
// =============================================================================

/// A failure to inject into the next gateway call.
#[derive(Debug, Clone)]
pub enum ScriptedFailure {
    /// Non-specific non-2xx (the engine treats it as a network failure).
    Network,
    /// Rejected bearer credential.
    Unauthorized,
    /// Structured validation failure with per-field messages.
    Validation(HashMap<String, Vec<String>>),
}

impl ScriptedFailure {
    fn into_api_error(self) -> ApiError {
        match self {
            Self::Network => ApiError::Api {
                status: 500,
                message: "Internal Server Error".to_string(),
            },
            Self::Unauthorized => ApiError::Unauthorized,
            Self::Validation(errors) => ApiError::Validation {
                message: "The given data was invalid.".to_string(),
                errors,
            },
        }
    }
}

struct FakeUser {
    email: String,
    password: String,
    token: String,
    profile: UserProfile,
}

#[derive(Default)]
struct FakeInner {
    /// product_id → (name, unit price)
    catalog: Mutex<HashMap<i64, (String, Decimal)>>,
    /// token → server-side cart
    carts: Mutex<HashMap<String, Vec<CartLineItem>>>,
    users: Mutex<Vec<FakeUser>>,
    next_failure: Mutex<Option<ScriptedFailure>>,
    /// Server-side quantity clamp, when scripted.
    quantity_cap: Mutex<Option<u32>>,
    calls: Mutex<Vec<String>>,
}

/// In-memory remote service double.
#[derive(Clone, Default)]
pub struct FakeGateway {
    inner: Arc<FakeInner>,
}

impl FakeGateway {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a catalog product the server knows how to sell.
    #[must_use]
    pub fn with_product(self, id: i64, name: &str, price: u32) -> Self {
        self.inner
            .catalog
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, (name.to_string(), Decimal::from(price)));
        self
    }

    /// Seed an account.
    #[must_use]
    pub fn with_user(self, email: &str, password: &str, token: &str, user_id: i64) -> Self {
        let profile = profile(user_id, email.split('@').next().unwrap(), email);
        self.inner
            .users
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(FakeUser {
                email: email.to_string(),
                password: password.to_string(),
                token: token.to_string(),
                profile,
            });
        self
    }

    /// Seed a user's server-side cart directly.
    pub fn seed_cart(&self, token: &str, items: Vec<CartLineItem>) {
        self.inner
            .carts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(token.to_string(), items);
    }

    /// Make the next cart/identity call fail with the given failure.
    pub fn fail_next(&self, failure: ScriptedFailure) {
        *self
            .inner
            .next_failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(failure);
    }

    /// Clamp quantities server-side (the "server settled differently" case).
    pub fn cap_quantity(&self, cap: u32) {
        *self
            .inner
            .quantity_cap
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(cap);
    }

    /// Names of every gateway call made so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.inner
            .calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The server-side cart for a token.
    #[must_use]
    pub fn server_cart(&self, token: &str) -> Vec<CartLineItem> {
        self.inner
            .carts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(token)
            .cloned()
            .unwrap_or_default()
    }

    fn record(&self, call: &str) {
        self.inner
            .calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call.to_string());
    }

    fn take_failure(&self) -> Result<(), ApiError> {
        let failure = self
            .inner
            .next_failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match failure {
            Some(failure) => Err(failure.into_api_error()),
            None => Ok(()),
        }
    }

    fn authorize(&self, token: &SecretString) -> Result<String, ApiError> {
        let token = token.expose_secret().to_string();
        let known = self
            .inner
            .users
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|user| user.token == token);
        if known { Ok(token) } else { Err(ApiError::Unauthorized) }
    }

    fn capped(&self, quantity: u32) -> u32 {
        self.inner
            .quantity_cap
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .map_or(quantity, |cap| quantity.min(cap))
    }
}

impl CartGateway for FakeGateway {
    async fn fetch_cart(&self, token: &SecretString) -> Result<Vec<CartLineItem>, ApiError> {
        self.record("fetch_cart");
        self.take_failure()?;
        let token = self.authorize(token)?;
        Ok(self.server_cart(&token))
    }

    async fn add_item(
        &self,
        token: &SecretString,
        product_id: ProductId,
        body: &CartItemBody,
    ) -> Result<CartLineItem, ApiError> {
        self.record("add_item");
        self.take_failure()?;
        let token = self.authorize(token)?;

        let (name, price) = self
            .inner
            .catalog
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&product_id.as_i64())
            .cloned()
            .ok_or(ApiError::Api {
                status: 404,
                message: "Product not found".to_string(),
            })?;

        let mut carts = self.inner.carts.lock().unwrap_or_else(PoisonError::into_inner);
        let cart = carts.entry(token).or_default();

        let key = LineItemKey::new(product_id, body.color.clone(), body.size.clone());
        if let Some(line) = cart.iter_mut().find(|line| line.key() == key) {
            let quantity = self.capped(line.quantity.get().saturating_add(body.quantity));
            line.set_quantity(Quantity::new(quantity).unwrap());
            return Ok(line.clone());
        }

        let quantity = Quantity::new(self.capped(body.quantity)).unwrap();
        let mut line = CartLineItem {
            product_id,
            name,
            unit_price: price,
            quantity,
            color: body.color.clone(),
            size: body.size.clone(),
            cover_image: None,
            total_price: Decimal::ZERO,
            brand: None,
        };
        line.set_quantity(quantity);
        cart.push(line.clone());
        Ok(line)
    }

    async fn update_item(
        &self,
        token: &SecretString,
        key: &LineItemKey,
        quantity: Quantity,
    ) -> Result<CartLineItem, ApiError> {
        self.record("update_item");
        self.take_failure()?;
        let token = self.authorize(token)?;

        let quantity = Quantity::new(self.capped(quantity.get())).unwrap();
        let mut carts = self.inner.carts.lock().unwrap_or_else(PoisonError::into_inner);
        let cart = carts.entry(token).or_default();

        let line = cart
            .iter_mut()
            .find(|line| line.key() == *key)
            .ok_or(ApiError::Api {
                status: 404,
                message: "Cart item not found".to_string(),
            })?;
        line.set_quantity(quantity);
        Ok(line.clone())
    }

    async fn remove_item(
        &self,
        token: &SecretString,
        product_id: ProductId,
    ) -> Result<(), ApiError> {
        self.record("remove_item");
        self.take_failure()?;
        let token = self.authorize(token)?;

        let mut carts = self.inner.carts.lock().unwrap_or_else(PoisonError::into_inner);
        carts
            .entry(token)
            .or_default()
            .retain(|line| line.product_id != product_id);
        Ok(())
    }

    async fn checkout(
        &self,
        token: &SecretString,
        _order: &OrderDetails,
    ) -> Result<CheckoutReceipt, ApiError> {
        self.record("checkout");
        self.take_failure()?;
        let token = self.authorize(token)?;

        self.inner
            .carts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&token);
        Ok(CheckoutReceipt {
            message: "Your order is placed successfully!".to_string(),
        })
    }
}

impl IdentityGateway for FakeGateway {
    async fn login(&self, email: &str, password: &str) -> Result<AuthPayload, ApiError> {
        self.record("login");
        self.take_failure()?;

        let users = self.inner.users.lock().unwrap_or_else(PoisonError::into_inner);
        users
            .iter()
            .find(|user| user.email == email && user.password == password)
            .map(|user| AuthPayload {
                token: SecretString::from(user.token.clone()),
                user: user.profile.clone(),
            })
            .ok_or(ApiError::Unauthorized)
    }

    async fn register(&self, form: &RegistrationForm) -> Result<AuthPayload, ApiError> {
        self.record("register");
        self.take_failure()?;

        let mut users = self.inner.users.lock().unwrap_or_else(PoisonError::into_inner);
        let id = 1000 + i64::try_from(users.len()).unwrap();
        let token = format!("tok_{}", form.username);
        let user = profile(id, &form.username, &form.email);

        users.push(FakeUser {
            email: form.email.clone(),
            password: form.password.clone(),
            token: token.clone(),
            profile: user.clone(),
        });

        Ok(AuthPayload {
            token: SecretString::from(token),
            user,
        })
    }
}

// =============================================================================
// TestContext
// =============================================================================

/// A fully wired engine + tracker over a [`FakeGateway`], with state
/// files rooted in a temp directory.
pub struct TestContext {
    pub gateway: FakeGateway,
    pub store: CartStore,
    pub events: CartEvents,
    pub session: SessionState,
    pub engine: CartEngine<FakeGateway>,
    pub tracker: SessionTracker<FakeGateway>,
    pub guest_cart: GuestCartFile,
    pub credentials: CredentialFile,
    _state_dir: TempDir,
}

impl TestContext {
    #[must_use]
    pub fn new(gateway: FakeGateway) -> Self {
        let state_dir = tempfile::tempdir().expect("create temp state dir");
        let guest_cart = GuestCartFile::new(state_dir.path().join("guest-cart.json"));
        let credentials = CredentialFile::new(state_dir.path().join("credentials.json"));

        let store = CartStore::new();
        let events = CartEvents::new();
        let session = SessionState::new();

        let engine = CartEngine::new(
            gateway.clone(),
            store.clone(),
            events.clone(),
            session.clone(),
            guest_cart.clone(),
        );
        let tracker = SessionTracker::new(
            gateway.clone(),
            session.clone(),
            credentials.clone(),
            store.clone(),
            events.clone(),
            guest_cart.clone(),
        );

        Self {
            gateway,
            store,
            events,
            session,
            engine,
            tracker,
            guest_cart,
            credentials,
            _state_dir: state_dir,
        }
    }

    /// Log in through the tracker, panicking on failure.
    pub async fn login(&self, email: &str, password: &str) -> UserProfile {
        self.tracker
            .login(email, password)
            .await
            .expect("login should succeed")
    }
}

// =============================================================================
// Builders
// =============================================================================

/// A user profile for seeding.
#[must_use]
pub fn profile(id: i64, username: &str, email: &str) -> UserProfile {
    UserProfile {
        id: UserId::new(id),
        username: username.to_string(),
        email: email.to_string(),
        avatar: None,
        created_at: None,
    }
}

/// A cart addition as a UI surface would submit it.
#[must_use]
pub fn addition(
    product_id: i64,
    name: &str,
    price: u32,
    quantity: u32,
    color: Option<&str>,
    size: Option<&str>,
) -> CartAddition {
    CartAddition {
        product_id: ProductId::new(product_id),
        name: name.to_string(),
        unit_price: Decimal::from(price),
        quantity: Quantity::new(quantity).unwrap(),
        color: color.map(String::from),
        size: size.map(String::from),
        cover_image: None,
        brand: None,
    }
}

/// A settled cart line.
#[must_use]
pub fn line(
    product_id: i64,
    name: &str,
    price: u32,
    quantity: u32,
    color: Option<&str>,
    size: Option<&str>,
) -> CartLineItem {
    let mut item = CartLineItem {
        product_id: ProductId::new(product_id),
        name: name.to_string(),
        unit_price: Decimal::from(price),
        quantity: Quantity::new(quantity).unwrap(),
        color: color.map(String::from),
        size: size.map(String::from),
        cover_image: None,
        total_price: Decimal::ZERO,
        brand: None,
    };
    item.set_quantity(Quantity::new(quantity).unwrap());
    item
}

/// Drain every event currently buffered on a receiver.
pub fn drain(receiver: &mut tokio::sync::broadcast::Receiver<CartEvent>) -> Vec<CartEvent> {
    let mut events = Vec::new();
    while let Ok(event) = receiver.try_recv() {
        events.push(event);
    }
    events
}
