//! Session and identity tracking.
//!
//! Tracks which user (or anonymous guest) is current for cart purposes,
//! and owns every identity transition:
//!
//! - `Anonymous → Authenticated(u)` on login/registration: the guest cart
//!   is discarded (not merged) and the remote cart replaces the store
//! - `Authenticated(u) → Anonymous` on logout or credential expiry: the
//!   store is cleared along with persisted credentials
//! - `Authenticated(u) → Authenticated(v)` when a different user is
//!   detected: the store is unconditionally reset to empty before v's
//!   cart loads
//!
//! [`SessionTracker::sync_from_disk`] re-runs the same transitions from
//! externally-changed persisted credentials (another process logging in
//! or out).

pub mod credentials;

pub use credentials::CredentialFile;

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, instrument, warn};

use redseam_core::{Email, EmailError, UserId};

use crate::api::ApiError;
use crate::cart::{CartEvent, CartEvents, CartGateway, CartSnapshot, CartStore, GuestCartFile};
use crate::checkout::FieldErrors;
use crate::storage::StorageError;

/// The authenticated user, as rendered by UI surfaces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub avatar: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// The current authenticated identity.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: UserId,
    pub display_name: String,
    pub avatar: Option<String>,
    /// Bearer credential for remote calls. Redacted in `Debug` output.
    pub token: SecretString,
}

impl Identity {
    /// Build an identity from a profile and its bearer token.
    #[must_use]
    pub fn from_profile(profile: &UserProfile, token: SecretString) -> Self {
        Self {
            user_id: profile.id,
            display_name: profile.username.clone(),
            avatar: profile.avatar.clone(),
            token,
        }
    }
}

/// Where the session currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Anonymous,
    Authenticated(UserId),
}

/// Shared session state: the current identity, if any.
///
/// Read by any component; written only by the [`SessionTracker`].
#[derive(Clone, Default)]
pub struct SessionState {
    inner: Arc<RwLock<Option<Identity>>>,
}

impl SessionState {
    /// Create an anonymous session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current identity, if authenticated.
    #[must_use]
    pub fn current(&self) -> Option<Identity> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The current user ID, if authenticated.
    #[must_use]
    pub fn user_id(&self) -> Option<UserId> {
        self.current().map(|identity| identity.user_id)
    }

    /// The current bearer token, if authenticated.
    #[must_use]
    pub fn token(&self) -> Option<SecretString> {
        self.current().map(|identity| identity.token)
    }

    /// Whether an identity is present.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.current().is_some()
    }

    pub(crate) fn set(&self, identity: Option<Identity>) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = identity;
    }
}

/// `{token, user}` payload from login and registration.
#[derive(Debug, Clone)]
pub struct AuthPayload {
    pub token: SecretString,
    pub user: UserProfile,
}

/// An avatar file attached to a registration.
#[derive(Debug, Clone)]
pub struct AvatarUpload {
    pub file_name: String,
    pub content: Vec<u8>,
}

/// Registration form contents.
#[derive(Debug, Clone)]
pub struct RegistrationForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
    pub avatar: Option<AvatarUpload>,
}

/// The remote identity service, as seen by the tracker.
#[allow(async_fn_in_trait)]
pub trait IdentityGateway {
    /// Exchange credentials for a token and user.
    async fn login(&self, email: &str, password: &str) -> Result<AuthPayload, ApiError>;

    /// Create an account, returning its token and user.
    async fn register(&self, form: &RegistrationForm) -> Result<AuthPayload, ApiError>;
}

/// Errors from session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The email failed structural validation before any remote call.
    #[error("invalid email: {0}")]
    Email(#[from] EmailError),

    /// The remote service rejected the credentials.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The remote service rejected the form, with per-field messages.
    #[error("{message}")]
    Validation { message: String, errors: FieldErrors },

    /// The credential file could not be written or removed.
    #[error("credential storage error: {0}")]
    Storage(#[from] StorageError),

    /// Any other identity service failure.
    #[error("identity service error: {0}")]
    Api(ApiError),
}

fn map_identity_error(e: ApiError) -> SessionError {
    match e {
        ApiError::Unauthorized => SessionError::InvalidCredentials,
        ApiError::Validation { message, errors } => SessionError::Validation {
            message,
            errors: FieldErrors::from_remote(&errors),
        },
        other => SessionError::Api(other),
    }
}

/// Detects and orchestrates identity transitions.
pub struct SessionTracker<G> {
    gateway: G,
    session: SessionState,
    credentials: CredentialFile,
    store: CartStore,
    events: CartEvents,
    guest_cart: GuestCartFile,
}

impl<G: IdentityGateway + CartGateway> SessionTracker<G> {
    /// Wire a tracker to its collaborators.
    pub const fn new(
        gateway: G,
        session: SessionState,
        credentials: CredentialFile,
        store: CartStore,
        events: CartEvents,
        guest_cart: GuestCartFile,
    ) -> Self {
        Self {
            gateway,
            session,
            credentials,
            store,
            events,
            guest_cart,
        }
    }

    /// The current session phase.
    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.session
            .user_id()
            .map_or(SessionPhase::Anonymous, SessionPhase::Authenticated)
    }

    /// Resolve the starting state from persisted credentials and perform
    /// the initial cart load: remote when authenticated, the guest
    /// fallback file otherwise.
    ///
    /// A rejected token runs the expiry transition; other fetch failures
    /// fall back to the guest file so a flaky network never empties the
    /// UI on startup.
    #[instrument(skip(self))]
    pub async fn initialize(&self) {
        let Some((token, user)) = self.credentials.load() else {
            let snapshot = self.guest_cart.load();
            self.store.replace(snapshot.clone());
            self.events.publish(CartEvent::Updated(snapshot));
            return;
        };

        let user_id = user.id;
        self.session
            .set(Some(Identity::from_profile(&user, token.clone())));
        self.events
            .publish(CartEvent::IdentityChanged(Some(user_id)));

        match self.gateway.fetch_cart(&token).await {
            Ok(items) => {
                let snapshot = CartSnapshot::new(items);
                self.store.replace(snapshot.clone());
                self.events.publish(CartEvent::Updated(snapshot));
            }
            Err(ApiError::Unauthorized) => {
                warn!("persisted token rejected, clearing session");
                self.handle_auth_expired();
            }
            Err(e) => {
                warn!(error = %e, "failed to load remote cart, using local fallback");
                let snapshot = self.guest_cart.load();
                self.store.replace(snapshot.clone());
                self.events.publish(CartEvent::Updated(snapshot));
            }
        }
    }

    /// Log in with email and password.
    ///
    /// On success the credentials are persisted and the
    /// `Anonymous → Authenticated` transition runs: guest-accumulated
    /// items are discarded and the remote cart replaces the store.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Email` before any remote call for a
    /// malformed email, `InvalidCredentials` on rejection, or a
    /// `Validation` with field messages.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile, SessionError> {
        Email::parse(email)?;

        let payload = self
            .gateway
            .login(email, password)
            .await
            .map_err(map_identity_error)?;

        self.credentials.save(&payload.token, &payload.user)?;
        self.apply_identity(payload.token, payload.user.clone()).await;
        Ok(payload.user)
    }

    /// Register a new account and log it in.
    ///
    /// Broadcasts `ClearRequested` before the remote call so surfaces
    /// reset any guest cart ahead of the new identity.
    ///
    /// # Errors
    ///
    /// Same as [`Self::login`].
    #[instrument(skip(self, form), fields(email = %form.email))]
    pub async fn register(&self, form: &RegistrationForm) -> Result<UserProfile, SessionError> {
        Email::parse(&form.email)?;

        self.events.publish(CartEvent::ClearRequested);

        let payload = self
            .gateway
            .register(form)
            .await
            .map_err(map_identity_error)?;

        self.credentials.save(&payload.token, &payload.user)?;
        self.apply_identity(payload.token, payload.user.clone()).await;
        Ok(payload.user)
    }

    /// Log out: clear persisted credentials, the identity, and the cart.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the credential file cannot be removed;
    /// the in-memory session is cleared regardless.
    #[instrument(skip(self))]
    pub fn logout(&self) -> Result<(), SessionError> {
        let result = self.credentials.clear();
        self.reset_to_anonymous();
        result.map_err(SessionError::Storage)
    }

    /// Run the credential-expiry transition after a remote 401.
    #[instrument(skip(self))]
    pub fn handle_auth_expired(&self) {
        if let Err(e) = self.credentials.clear() {
            warn!(error = %e, "failed to clear credential file");
        }
        self.reset_to_anonymous();
    }

    /// Re-read persisted credentials and re-run the transition logic.
    ///
    /// The cross-process analogue of a storage-change listener: call when
    /// another process may have logged in or out.
    #[instrument(skip(self))]
    pub async fn sync_from_disk(&self) {
        match self.credentials.load() {
            Some((token, user)) => self.apply_identity(token, user).await,
            None => {
                if self.session.is_authenticated() {
                    debug!("credentials removed externally, logging out");
                    self.reset_to_anonymous();
                }
            }
        }
    }

    /// Apply a (possibly new) authenticated identity.
    async fn apply_identity(&self, token: SecretString, user: UserProfile) {
        let previous = self.session.user_id();
        let user_id = user.id;
        let identity = Identity::from_profile(&user, token.clone());

        match previous {
            // Same user with refreshed credentials; the cart stands.
            Some(prev) if prev == user_id => {
                self.session.set(Some(identity));
                return;
            }
            // User switch: reset to empty before the new cart loads,
            // never merge.
            Some(prev) => {
                debug!(%prev, new = %user_id, "identity switch, resetting cart");
                self.store.clear();
                self.events.publish(CartEvent::Cleared);
            }
            None => {}
        }

        // Guest-accumulated items are discarded, not merged.
        if let Err(e) = self.guest_cart.clear() {
            warn!(error = %e, "failed to discard guest cart file");
        }

        self.session.set(Some(identity));
        self.events
            .publish(CartEvent::IdentityChanged(Some(user_id)));

        let snapshot = match self.gateway.fetch_cart(&token).await {
            Ok(items) => CartSnapshot::new(items),
            Err(e) => {
                warn!(error = %e, "failed to load remote cart after identity change");
                CartSnapshot::default()
            }
        };
        self.store.replace(snapshot.clone());
        self.events.publish(CartEvent::Updated(snapshot));
    }

    fn reset_to_anonymous(&self) {
        self.session.set(None);
        self.store.clear();
        self.events.publish(CartEvent::Cleared);
        self.events.publish(CartEvent::IdentityChanged(None));
    }
}
