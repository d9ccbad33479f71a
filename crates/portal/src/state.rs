//! Application state shared across handlers.

use std::sync::Arc;

use crate::backend::{BackendClient, BackendError};
use crate::config::PortalConfig;
use crate::session::{SessionFile, SessionManager};

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Holds the one session manager and the one
/// backend client this process ever has.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: PortalConfig,
    session: SessionManager,
    backend: BackendClient,
}

impl AppState {
    /// Create the application state.
    ///
    /// Builds the session manager over the configured session file and the
    /// backend client on top of it. Does not restore persisted session
    /// state; call [`SessionManager::restore`] once the runtime is up.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend HTTP client cannot be built.
    pub fn new(config: PortalConfig) -> Result<Self, BackendError> {
        let session = SessionManager::new(SessionFile::new(config.session_file.clone()));
        let backend = BackendClient::new(&config.api_base_url, session.clone())?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                session,
                backend,
            }),
        })
    }

    /// Get a reference to the portal configuration.
    #[must_use]
    pub fn config(&self) -> &PortalConfig {
        &self.inner.config
    }

    /// Get a reference to the session manager.
    #[must_use]
    pub fn session(&self) -> &SessionManager {
        &self.inner.session
    }

    /// Get a reference to the backend API client.
    #[must_use]
    pub fn backend(&self) -> &BackendClient {
        &self.inner.backend
    }
}
