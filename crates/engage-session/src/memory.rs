//! In-memory implementation of `SessionStore`.
//!
//! The slot lives behind `Arc<Mutex<_>>`, so clones share it. Tests and the
//! terminal UI hand one clone to the `Dashboard` and keep another to observe
//! what was persisted.

use std::sync::{Arc, Mutex};

use tracing::debug;

use engage_contracts::{
    error::{EngageError, EngageResult},
    session::UserSession,
};
use engage_core::traits::SessionStore;

#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStore {
    slot: Arc<Mutex<Option<UserSession>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `session`.
    pub fn with_session(session: UserSession) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(session))),
        }
    }

    fn lock(&self) -> EngageResult<std::sync::MutexGuard<'_, Option<UserSession>>> {
        self.slot.lock().map_err(|e| EngageError::SessionStore {
            reason: format!("session slot lock poisoned: {}", e),
        })
    }
}

impl SessionStore for InMemorySessionStore {
    fn load(&self) -> EngageResult<Option<UserSession>> {
        Ok(self.lock()?.clone())
    }

    fn save(&self, session: &UserSession) -> EngageResult<()> {
        *self.lock()? = Some(session.clone());
        debug!(session_id = %session.session_id, "session stored in memory");
        Ok(())
    }

    fn clear(&self) -> EngageResult<()> {
        *self.lock()? = None;
        Ok(())
    }
}
