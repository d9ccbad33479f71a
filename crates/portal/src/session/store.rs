//! Durable session storage.
//!
//! The portal persists its session as a single JSON document on disk so a
//! restarted process can pick the login back up. The document carries both
//! the serialized user profile and the numeric expiry timestamp; because they
//! live in one file they are written and cleared together, never
//! independently.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::UserProfile;

/// Errors that can occur reading or writing the session file.
///
/// Callers treat every variant as "no session" - storage trouble is never
/// allowed to take the portal down.
#[derive(Debug, Error)]
pub enum SessionStoreError {
    /// Filesystem operation failed.
    #[error("session file I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored document is not valid session JSON.
    #[error("session file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// The persisted session document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    /// The logged-in user's profile.
    pub user: UserProfile,
    /// Absolute expiry instant, milliseconds since the Unix epoch.
    pub expiry_ms: i64,
}

/// File-backed durable storage for the session document.
#[derive(Debug, Clone)]
pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    /// Create a store over the given path. The file itself is created lazily
    /// on the first [`save`](Self::save).
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The path this store reads and writes.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Read the stored session, if any.
    ///
    /// A missing file is `Ok(None)`; an unreadable or unparseable file is an
    /// error for the caller to log and treat as absence.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(&self) -> Result<Option<StoredSession>, SessionStoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    /// Persist the session document, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the filesystem write fails.
    pub fn save(&self, session: &StoredSession) -> Result<(), SessionStoreError> {
        let raw = serde_json::to_string(session)?;
        fs::write(&self.path, raw)?;
        Ok(())
    }

    /// Remove the session document. Removing an already-absent file is a
    /// no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be removed.
    pub fn clear(&self) -> Result<(), SessionStoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use gavelpoint_core::{Email, UserRole};

    fn temp_store() -> SessionFile {
        let path = std::env::temp_dir().join(format!("gavelpoint-test-{}.json", uuid::Uuid::new_v4()));
        SessionFile::new(path)
    }

    fn sample_session() -> StoredSession {
        StoredSession {
            user: UserProfile {
                name: "Pat".to_string(),
                email: Email::parse("pat@example.com").unwrap(),
                role: UserRole::Admin,
            },
            expiry_ms: 1_900_000_000_000,
        }
    }

    #[test]
    fn test_load_missing_file_is_none() {
        let store = temp_store();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_save_then_load_roundtrips() {
        let store = temp_store();
        let session = sample_session();
        store.save(&session).unwrap();
        assert_eq!(store.load().unwrap(), Some(session));
        store.clear().unwrap();
    }

    #[test]
    fn test_clear_removes_both_keys_at_once() {
        let store = temp_store();
        store.save(&sample_session()).unwrap();
        store.clear().unwrap();
        // Nothing partial survives: the whole document is gone.
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_clear_is_idempotent() {
        let store = temp_store();
        store.clear().unwrap();
        store.clear().unwrap();
    }

    #[test]
    fn test_corrupt_file_is_an_error_not_a_panic() {
        let store = temp_store();
        std::fs::write(&store.path, "{not json").unwrap();
        assert!(matches!(store.load(), Err(SessionStoreError::Corrupt(_))));
        store.clear().unwrap();
    }
}
