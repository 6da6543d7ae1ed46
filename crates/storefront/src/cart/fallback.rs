//! Guest cart fallback persistence.
//!
//! While no identity is present the cart lives only on this client; it is
//! serialized as a flat item list to a well-known file after every guest
//! mutation and read back on startup. The file is discarded on any
//! identity transition and on checkout success.

use std::path::PathBuf;

use tracing::warn;

use crate::storage::{self, StorageError};

use super::item::CartSnapshot;

/// File-backed store for the guest cart.
#[derive(Debug, Clone)]
pub struct GuestCartFile {
    path: PathBuf,
}

impl GuestCartFile {
    /// Create a handle for the guest cart file at `path`.
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Load the persisted guest cart.
    ///
    /// A missing or unreadable file yields an empty cart; corrupt contents
    /// are logged and treated as absent.
    #[must_use]
    pub fn load(&self) -> CartSnapshot {
        match storage::read_json(&self.path) {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => CartSnapshot::default(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "discarding unreadable guest cart");
                CartSnapshot::default()
            }
        }
    }

    /// Persist the given snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, snapshot: &CartSnapshot) -> Result<(), StorageError> {
        storage::write_json(&self.path, snapshot)
    }

    /// Delete the persisted guest cart, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be removed.
    pub fn clear(&self) -> Result<(), StorageError> {
        storage::remove(&self.path)
    }
}
