//! Process-wide session management.
//!
//! The portal process plays the browser's role against the auction backend,
//! so it holds exactly one session: the operator who logged in through this
//! process. [`SessionManager`] is the single source of truth for "is someone
//! authenticated, and as what role". It persists the session to a state file
//! (see [`store`]), restores it on start, and enforces the 24-hour expiry
//! with a cancellable timer task.
//!
//! Storage failures are deliberately non-fatal: a session that cannot be
//! read or written is treated as absent, logged, and life goes on.

pub mod store;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::models::UserProfile;

pub use store::{SessionFile, SessionStoreError, StoredSession};

/// Sessions live this long past login.
const SESSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Owner of the portal's authentication state.
///
/// Cheaply cloneable; all clones share one session. Guarded routes read
/// [`current_user`](Self::current_user), the login handler calls
/// [`login`](Self::login), and both the logout handler and the backend
/// client's 401 interceptor call [`logout`](Self::logout).
///
/// Expiry timers run on the ambient tokio runtime, so [`login`](Self::login),
/// [`restore`](Self::restore), and [`schedule_expiry`](Self::schedule_expiry)
/// must be called from within one.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    file: SessionFile,
    state: Mutex<Option<StoredSession>>,
    /// Handle of the pending expiry task. Aborted and replaced on every
    /// session change so at most one logout trigger is ever pending.
    expiry_task: Mutex<Option<JoinHandle<()>>>,
}

impl SessionManager {
    /// Create a manager over the given session file. No I/O happens here;
    /// call [`restore`](Self::restore) on start to read persisted state.
    #[must_use]
    pub fn new(file: SessionFile) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                file,
                state: Mutex::new(None),
                expiry_task: Mutex::new(None),
            }),
        }
    }

    /// The logged-in user, if any.
    #[must_use]
    pub fn current_user(&self) -> Option<UserProfile> {
        self.lock_state().as_ref().map(|s| s.user.clone())
    }

    /// Establish a session for `user`.
    ///
    /// Stores the profile in memory and in the session file with an expiry of
    /// now + 24 hours, then (re)schedules the expiry timer. Always succeeds;
    /// a failed file write is logged and the in-memory session stands.
    pub fn login(&self, user: UserProfile) {
        let session = StoredSession {
            user,
            expiry_ms: now_ms() + ms(SESSION_TTL),
        };

        if let Err(e) = self.inner.file.save(&session) {
            tracing::warn!(error = %e, "failed to persist session; continuing in memory");
        }
        *self.lock_state() = Some(session);

        self.schedule_expiry();
        tracing::info!("session established");
    }

    /// End the session: clear memory and the session file together, and
    /// cancel any pending expiry timer. Idempotent.
    ///
    /// Navigation back to the login page is the HTTP layer's job: guarded
    /// routes redirect whenever `current_user` is `None`.
    pub fn logout(&self) {
        let had_session = self.lock_state().take().is_some();

        if let Err(e) = self.inner.file.clear() {
            tracing::warn!(error = %e, "failed to clear persisted session");
        }
        self.cancel_expiry_task();

        if had_session {
            tracing::info!("session cleared");
        }
    }

    /// Restore persisted state on process start, then arm the expiry timer.
    ///
    /// Corrupt or unreadable state is logged and treated as no session;
    /// this never fails.
    pub fn restore(&self) {
        match self.inner.file.load() {
            Ok(Some(session)) => {
                *self.lock_state() = Some(session);
                tracing::info!("restored persisted session");
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(error = %e, "stored session unreadable; treating as logged out");
            }
        }

        self.schedule_expiry();
    }

    /// Arm the one-shot expiry timer for the current session.
    ///
    /// The previous timer is always cancelled first. If the stored expiry is
    /// already in the past, the session is logged out before this returns.
    pub fn schedule_expiry(&self) {
        self.cancel_expiry_task();

        let Some(expiry_ms) = self.lock_state().as_ref().map(|s| s.expiry_ms) else {
            return;
        };

        let time_left = expiry_ms - now_ms();
        if time_left <= 0 {
            tracing::info!("session already expired; logging out");
            self.logout();
            return;
        }

        let manager = self.clone();
        #[allow(clippy::cast_sign_loss)] // time_left > 0 checked above
        let sleep_for = Duration::from_millis(time_left as u64);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(sleep_for).await;
            tracing::info!("session expired; logging out");
            manager.logout();
        });
        *self.lock_expiry_task() = Some(handle);
    }

    /// When the current session expires, in milliseconds since the epoch.
    #[must_use]
    pub fn expiry_ms(&self) -> Option<i64> {
        self.lock_state().as_ref().map(|s| s.expiry_ms)
    }

    fn cancel_expiry_task(&self) {
        if let Some(handle) = self.lock_expiry_task().take() {
            handle.abort();
        }
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, Option<StoredSession>> {
        // Lock poisoning can only come from a panic while holding the guard;
        // the stored value is still the last coherent session state.
        self.inner
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn lock_expiry_task(&self) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
        self.inner
            .expiry_task
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

/// Current wall-clock time in milliseconds since the Unix epoch.
fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[allow(clippy::cast_possible_wrap, clippy::cast_possible_truncation)]
const fn ms(d: Duration) -> i64 {
    d.as_millis() as i64
}
