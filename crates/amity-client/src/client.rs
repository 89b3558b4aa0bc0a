use std::sync::Arc;

use amity_shared::{Actor, Session};
use amity_store::ObjectStore;
use tracing::warn;

use crate::state::SessionState;

/// One user's view of the store. Commands live in [`crate::commands`].
pub struct Client {
    pub(crate) store: Arc<dyn ObjectStore>,
    pub(crate) state: SessionState,
}

impl Client {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self {
            store,
            state: SessionState::new(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn actor(&self) -> Option<&Actor> {
        self.state.actor()
    }

    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }

    /// The current session, or `None` with a warning naming the skipped
    /// action. Mutating commands are no-ops without a session.
    pub(crate) fn require_session(&self, action: &str) -> Option<Session> {
        let session = self.state.session.clone();
        if session.is_none() {
            warn!(action, "no active session, ignoring");
        }
        session
    }
}
