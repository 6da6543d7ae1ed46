//! Application root context.
//!
//! The cart store, notification bus, and session state are explicit
//! objects owned here and injected into the engine and tracker - there
//! are no ambient singletons. UI surfaces borrow what they need from
//! this context.

use crate::api::ApiClient;
use crate::cart::{CartEngine, CartEvents, CartStore, GuestCartFile};
use crate::config::StorefrontConfig;
use crate::session::{CredentialFile, SessionState, SessionTracker};

/// Everything a storefront surface needs, wired together.
pub struct StorefrontApp {
    config: StorefrontConfig,
    api: ApiClient,
    store: CartStore,
    events: CartEvents,
    session: SessionState,
    engine: CartEngine<ApiClient>,
    tracker: SessionTracker<ApiClient>,
}

impl StorefrontApp {
    /// Build the application context from configuration.
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        let api = ApiClient::new(&config);
        let store = CartStore::new();
        let events = CartEvents::new();
        let session = SessionState::new();
        let guest_cart = GuestCartFile::new(config.guest_cart_path());
        let credentials = CredentialFile::new(config.credentials_path());

        let engine = CartEngine::new(
            api.clone(),
            store.clone(),
            events.clone(),
            session.clone(),
            guest_cart.clone(),
        );
        let tracker = SessionTracker::new(
            api.clone(),
            session.clone(),
            credentials,
            store.clone(),
            events.clone(),
            guest_cart,
        );

        Self {
            config,
            api,
            store,
            events,
            session,
            engine,
            tracker,
        }
    }

    /// The loaded configuration.
    #[must_use]
    pub const fn config(&self) -> &StorefrontConfig {
        &self.config
    }

    /// The raw API client (catalog reads, profile fetches).
    #[must_use]
    pub const fn api(&self) -> &ApiClient {
        &self.api
    }

    /// The local cart store.
    #[must_use]
    pub const fn store(&self) -> &CartStore {
        &self.store
    }

    /// The notification bus.
    #[must_use]
    pub const fn events(&self) -> &CartEvents {
        &self.events
    }

    /// The shared session state.
    #[must_use]
    pub const fn session(&self) -> &SessionState {
        &self.session
    }

    /// The cart reconciliation engine.
    #[must_use]
    pub const fn engine(&self) -> &CartEngine<ApiClient> {
        &self.engine
    }

    /// The session/identity tracker.
    #[must_use]
    pub const fn tracker(&self) -> &SessionTracker<ApiClient> {
        &self.tracker
    }
}
