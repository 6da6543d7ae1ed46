//! Persisted credential store.
//!
//! The bearer token and the user it belongs to are kept in a single JSON
//! file under the state directory. Other processes (another "tab") write
//! the same file; [`super::SessionTracker::sync_from_disk`] re-reads it
//! and re-runs the identity transition logic.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::storage::{self, StorageError};

use super::UserProfile;

#[derive(Debug, Serialize, Deserialize)]
struct StoredCredentials {
    token: String,
    user: UserProfile,
    saved_at: DateTime<Utc>,
}

/// File-backed credential store.
#[derive(Debug, Clone)]
pub struct CredentialFile {
    path: PathBuf,
}

impl CredentialFile {
    /// Create a handle for the credential file at `path`.
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Load persisted credentials.
    ///
    /// A missing file is `None`; corrupt contents are logged and treated
    /// as absent, never surfaced as a hard failure.
    #[must_use]
    pub fn load(&self) -> Option<(SecretString, UserProfile)> {
        match storage::read_json::<StoredCredentials>(&self.path) {
            Ok(Some(stored)) => Some((SecretString::from(stored.token), stored.user)),
            Ok(None) => None,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "ignoring unreadable credential file");
                None
            }
        }
    }

    /// Persist credentials for the given user.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, token: &SecretString, user: &UserProfile) -> Result<(), StorageError> {
        let stored = StoredCredentials {
            token: token.expose_secret().to_string(),
            user: user.clone(),
            saved_at: Utc::now(),
        };
        storage::write_json(&self.path, &stored)
    }

    /// Delete persisted credentials, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be removed.
    pub fn clear(&self) -> Result<(), StorageError> {
        storage::remove(&self.path)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use redseam_core::UserId;

    use super::*;

    fn profile() -> UserProfile {
        UserProfile {
            id: UserId::new(3),
            username: "ada".to_string(),
            email: "ada@example.com".to_string(),
            avatar: None,
            created_at: None,
        }
    }

    #[test]
    fn test_load_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let file = CredentialFile::new(dir.path().join("credentials.json"));

        assert!(file.load().is_none());
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let file = CredentialFile::new(dir.path().join("credentials.json"));

        file.save(&SecretString::from("tok_123"), &profile()).unwrap();

        let (token, user) = file.load().unwrap();
        assert_eq!(token.expose_secret(), "tok_123");
        assert_eq!(user, profile());
    }

    #[test]
    fn test_corrupt_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(&path, "not json at all").unwrap();

        assert!(CredentialFile::new(path).load().is_none());
    }

    #[test]
    fn test_clear_removes_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let file = CredentialFile::new(dir.path().join("credentials.json"));

        file.save(&SecretString::from("tok"), &profile()).unwrap();
        file.clear().unwrap();
        assert!(file.load().is_none());

        // Clearing again is fine
        file.clear().unwrap();
    }
}
