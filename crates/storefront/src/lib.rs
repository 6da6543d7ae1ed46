//! RedSeam Storefront client library.
//!
//! This crate implements the client side of the RedSeam storefront on top of
//! the remote commerce REST API: typed gateways for the cart, identity, and
//! catalog surfaces, a local cart store kept consistent with the remote
//! authoritative cart, and the session tracking that ties the two together.
//!
//! # Architecture
//!
//! - [`api`] - REST gateways (`ApiClient`) for cart, identity, and catalog
//! - [`cart`] - local cart store, reconciliation engine, notification bus,
//!   guest fallback persistence
//! - [`checkout`] - order details validation and field-level error mapping
//! - [`session`] - identity state machine and persisted credentials
//! - [`config`] - environment-driven configuration
//! - [`state`] - the application root context wiring everything together
//!
//! The remote service is the source of truth for an authenticated cart;
//! the local store is the source of truth for a guest cart. The
//! reconciliation engine in [`cart::engine`] owns every transition between
//! the two.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod checkout;
pub mod config;
pub mod session;
pub mod state;
pub mod storage;

pub use api::{ApiClient, ApiError};
pub use cart::{
    Brand, CartAddition, CartEngine, CartError, CartEvent, CartEvents, CartGateway,
    CartLineItem, CartSnapshot, CartStore, CheckoutError, GuestCartFile, LineItemKey,
};
pub use checkout::{CheckoutReceipt, FieldErrors, OrderDetails};
pub use config::{ConfigError, StorefrontConfig};
pub use session::{
    AuthPayload, AvatarUpload, CredentialFile, Identity, IdentityGateway, RegistrationForm,
    SessionError, SessionPhase, SessionState, SessionTracker, UserProfile,
};
pub use state::StorefrontApp;
