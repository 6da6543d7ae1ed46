//! Cart reconciliation engine.
//!
//! The single place where a cart mutation request becomes a local
//! optimistic update, a remote call, and a final reconciliation or
//! rollback. Guest mutations settle locally and persist to the fallback
//! file; authenticated mutations are reconciled against the authoritative
//! remote cart.
//!
//! # Ordering
//!
//! The engine does not serialize concurrent mutations against the same
//! line key. Two in-flight updates for one key take rollback snapshots at
//! divergent points, and the later-settling response wins. Callers are
//! expected to disable controls for a key while its mutation is in flight.

use std::future::Future;

use secrecy::SecretString;
use tracing::{debug, instrument, warn};

use crate::api::ApiError;
use crate::api::types::CartItemBody;
use crate::checkout::{CheckoutReceipt, FieldErrors, OrderDetails};

use super::events::{CartEvent, CartEvents};
use super::fallback::GuestCartFile;
use super::item::{CartAddition, CartLineItem, CartSnapshot, LineItemKey};
use super::store::CartStore;
use crate::session::SessionState;

use redseam_core::{ProductId, Quantity};

/// Errors from cart mutations.
///
/// Every failure leaves the local store settled: optimistic mutations are
/// rolled back before the error is returned.
#[derive(Debug, thiserror::Error)]
pub enum CartError {
    /// The remote service rejected an add; no local mutation was taken.
    #[error("failed to add item to cart: {0}")]
    AddFailed(#[source] ApiError),

    /// The remote service rejected a quantity update; the local mutation
    /// was rolled back.
    #[error("failed to update cart item: {0}")]
    UpdateFailed(#[source] ApiError),

    /// The remote service rejected a removal; the local mutation was
    /// rolled back.
    #[error("failed to remove cart item: {0}")]
    RemoveFailed(#[source] ApiError),

    /// The bearer credential is no longer accepted; the caller should run
    /// the session tracker's expiry transition.
    #[error("session expired")]
    AuthExpired,
}

/// Errors from checkout.
#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    /// Checkout with an empty cart.
    #[error("cart is empty")]
    EmptyCart,

    /// Checkout requires a logged-in identity.
    #[error("checkout requires authentication")]
    RequiresAuthentication,

    /// The bearer credential is no longer accepted.
    #[error("session expired")]
    AuthExpired,

    /// Order details failed validation (locally or remotely).
    #[error("order details failed validation: {0}")]
    Validation(FieldErrors),

    /// Any other remote failure. The cart is unchanged.
    #[error("checkout failed: {0}")]
    Failed(String),
}

/// The remote authoritative cart service, as seen by the engine.
///
/// Production uses [`crate::ApiClient`]; tests script an in-memory fake.
#[allow(async_fn_in_trait)]
pub trait CartGateway {
    /// Fetch the authoritative cart.
    async fn fetch_cart(&self, token: &SecretString) -> Result<Vec<CartLineItem>, ApiError>;

    /// Add a product+variant, returning the authoritative line.
    async fn add_item(
        &self,
        token: &SecretString,
        product_id: ProductId,
        body: &CartItemBody,
    ) -> Result<CartLineItem, ApiError>;

    /// Update a line's quantity, returning the authoritative line.
    async fn update_item(
        &self,
        token: &SecretString,
        key: &LineItemKey,
        quantity: Quantity,
    ) -> Result<CartLineItem, ApiError>;

    /// Remove a product from the cart.
    async fn remove_item(&self, token: &SecretString, product_id: ProductId)
    -> Result<(), ApiError>;

    /// Submit the order.
    async fn checkout(
        &self,
        token: &SecretString,
        order: &OrderDetails,
    ) -> Result<CheckoutReceipt, ApiError>;
}

/// Orchestrates cart mutations across the local store and the remote cart.
pub struct CartEngine<G> {
    gateway: G,
    store: CartStore,
    events: CartEvents,
    session: SessionState,
    guest_cart: GuestCartFile,
}

impl<G: CartGateway> CartEngine<G> {
    /// Wire an engine to its collaborators.
    pub const fn new(
        gateway: G,
        store: CartStore,
        events: CartEvents,
        session: SessionState,
        guest_cart: GuestCartFile,
    ) -> Self {
        Self {
            gateway,
            store,
            events,
            session,
            guest_cart,
        }
    }

    /// The local cart store (read-only for UI surfaces).
    #[must_use]
    pub const fn store(&self) -> &CartStore {
        &self.store
    }

    /// The notification bus.
    #[must_use]
    pub const fn events(&self) -> &CartEvents {
        &self.events
    }

    /// Add a product+variant to the cart.
    ///
    /// Guest: merges by line key locally and settles synchronously.
    /// Authenticated: waits for the authoritative line (unit price and
    /// availability must be confirmed), then merges it by key. No
    /// optimistic mutation is taken, so there is nothing to roll back.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::AddFailed`] or [`CartError::AuthExpired`]; the
    /// local store is unchanged on failure.
    #[instrument(skip(self, addition), fields(key = %addition.key()))]
    pub async fn add(&self, addition: CartAddition) -> Result<CartSnapshot, CartError> {
        let Some(token) = self.session.token() else {
            let key = addition.key();
            if let Some(mut line) = self.store.find(&key) {
                line.set_quantity(line.quantity.saturating_add(addition.quantity.get()));
                self.store.upsert(line);
            } else {
                self.store.upsert(addition.into_line_item());
            }
            let snapshot = self.publish_updated();
            self.persist_guest(&snapshot);
            return Ok(snapshot);
        };

        let body = CartItemBody::from(&addition);
        match self.gateway.add_item(&token, addition.product_id, &body).await {
            Ok(line) => {
                self.store.upsert(line);
                Ok(self.publish_updated())
            }
            Err(ApiError::Unauthorized) => Err(CartError::AuthExpired),
            Err(e) => Err(CartError::AddFailed(e)),
        }
    }

    /// Set a line's quantity.
    ///
    /// A requested quantity below 1 is silently ignored, as is an unknown
    /// key: the current snapshot is returned and no remote call is made.
    /// Otherwise the mutation is applied and broadcast optimistically,
    /// then confirmed remotely when an identity is present; a remote
    /// failure restores the pre-mutation snapshot and re-broadcasts.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::UpdateFailed`] or [`CartError::AuthExpired`]
    /// after rolling back.
    #[instrument(skip(self), fields(key = %key))]
    pub async fn update_quantity(
        &self,
        key: &LineItemKey,
        new_quantity: u32,
    ) -> Result<CartSnapshot, CartError> {
        let Ok(quantity) = Quantity::new(new_quantity) else {
            debug!("ignoring quantity update below 1");
            return Ok(self.store.snapshot());
        };
        let Some(mut line) = self.store.find(key) else {
            debug!("ignoring quantity update for unknown line");
            return Ok(self.store.snapshot());
        };

        let prior = self.store.snapshot();
        line.set_quantity(quantity);
        self.store.upsert(line);
        let snapshot = self.publish_updated();

        let Some(token) = self.session.token() else {
            self.persist_guest(&snapshot);
            return Ok(snapshot);
        };

        let authoritative = self
            .settle(
                prior,
                self.gateway.update_item(&token, key, quantity),
                CartError::UpdateFailed,
            )
            .await?;

        // Reconcile if the server settled differently (e.g. clamped the
        // quantity); the extra broadcast keeps every surface authoritative.
        if self.store.find(key).as_ref() == Some(&authoritative) {
            Ok(snapshot)
        } else {
            self.store.upsert(authoritative);
            Ok(self.publish_updated())
        }
    }

    /// Remove the line with the given key.
    ///
    /// An unknown key is a no-op: the snapshot is returned unchanged and
    /// nothing is broadcast. Otherwise the line is removed and broadcast
    /// optimistically; a remote failure restores it.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::RemoveFailed`] or [`CartError::AuthExpired`]
    /// after rolling back.
    #[instrument(skip(self), fields(key = %key))]
    pub async fn remove_item(&self, key: &LineItemKey) -> Result<CartSnapshot, CartError> {
        let prior = self.store.snapshot();
        if self.store.remove(key).is_none() {
            debug!("ignoring removal of unknown line");
            return Ok(prior);
        }
        let snapshot = self.publish_updated();

        let Some(token) = self.session.token() else {
            self.persist_guest(&snapshot);
            return Ok(snapshot);
        };

        self.settle(
            prior,
            self.gateway.remove_item(&token, key.product_id),
            CartError::RemoveFailed,
        )
        .await?;

        Ok(snapshot)
    }

    /// Submit the cart as an order.
    ///
    /// Validates the order details locally before any remote call; on
    /// success the local store and the guest fallback file are cleared and
    /// `Cleared` is broadcast. On any failure the cart is left untouched.
    ///
    /// # Errors
    ///
    /// See [`CheckoutError`]; every variant leaves the cart unchanged.
    #[instrument(skip(self, order))]
    pub async fn checkout(&self, order: &OrderDetails) -> Result<CheckoutReceipt, CheckoutError> {
        if self.store.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        let Some(token) = self.session.token() else {
            return Err(CheckoutError::RequiresAuthentication);
        };

        let order = order.normalized();
        order.validate().map_err(CheckoutError::Validation)?;

        match self.gateway.checkout(&token, &order).await {
            Ok(receipt) => {
                self.store.clear();
                if let Err(e) = self.guest_cart.clear() {
                    warn!(error = %e, "failed to remove guest cart file after checkout");
                }
                self.events.publish(CartEvent::Cleared);
                Ok(receipt)
            }
            Err(ApiError::Unauthorized) => Err(CheckoutError::AuthExpired),
            Err(ApiError::Validation { errors, .. }) => {
                Err(CheckoutError::Validation(FieldErrors::from_remote(&errors)))
            }
            Err(e) => Err(CheckoutError::Failed(e.to_string())),
        }
    }

    // =========================================================================
    // Optimistic transaction plumbing
    // =========================================================================

    /// Await a remote effect for an already-applied optimistic mutation.
    ///
    /// On failure the pre-mutation snapshot is restored and re-broadcast
    /// before the error is returned; rollback is by wholesale replacement,
    /// so applying it twice is harmless.
    async fn settle<T>(
        &self,
        prior: CartSnapshot,
        remote: impl Future<Output = Result<T, ApiError>>,
        wrap: fn(ApiError) -> CartError,
    ) -> Result<T, CartError> {
        match remote.await {
            Ok(value) => Ok(value),
            Err(e) => {
                self.store.replace(prior);
                self.publish_updated();
                match e {
                    ApiError::Unauthorized => Err(CartError::AuthExpired),
                    other => Err(wrap(other)),
                }
            }
        }
    }

    /// Broadcast the current snapshot and return it.
    fn publish_updated(&self) -> CartSnapshot {
        let snapshot = self.store.snapshot();
        self.events.publish(CartEvent::Updated(snapshot.clone()));
        snapshot
    }

    /// Persist the guest cart, logging (not failing) on write errors.
    fn persist_guest(&self, snapshot: &CartSnapshot) {
        if let Err(e) = self.guest_cart.save(snapshot) {
            warn!(error = %e, "failed to persist guest cart");
        }
    }
}
