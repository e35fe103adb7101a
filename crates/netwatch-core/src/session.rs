// ── Session context ──
//
// Owns the credential provider for one operator session and the signal
// that tells the outer application the session must be abandoned. The
// core only ever reads the credential; clearing the stored token is the
// credential store's job once it observes `SessionState::Invalidated`.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use netwatch_api::CredentialProvider;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Active,
    Invalidated { at: DateTime<Utc> },
}

/// Credential access plus the session-invalid signal.
///
/// Cheap to clone; clones share the signal.
#[derive(Clone)]
pub struct SessionContext {
    credentials: Arc<dyn CredentialProvider>,
    state: Arc<watch::Sender<SessionState>>,
}

impl SessionContext {
    pub fn new(credentials: Arc<dyn CredentialProvider>) -> Self {
        let (state, _) = watch::channel(SessionState::Active);
        Self {
            credentials,
            state: Arc::new(state),
        }
    }

    pub fn credentials(&self) -> Arc<dyn CredentialProvider> {
        Arc::clone(&self.credentials)
    }

    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    pub fn is_valid(&self) -> bool {
        matches!(self.state(), SessionState::Active)
    }

    /// Mark the session invalid. Only the first call has an effect.
    pub fn invalidate(&self) {
        let changed = self.state.send_if_modified(|state| {
            if matches!(state, SessionState::Invalidated { .. }) {
                return false;
            }
            *state = SessionState::Invalidated { at: Utc::now() };
            true
        });
        if changed {
            tracing::warn!("session invalidated by the server");
        }
    }

    /// Observe session state changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Resolve once the session has been invalidated.
    pub async fn invalidated(&self) {
        let mut rx = self.subscribe();
        let _ = rx
            .wait_for(|state| matches!(state, SessionState::Invalidated { .. }))
            .await;
    }
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionContext")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
