//! File-backed implementation of `SessionStore`.
//!
//! The session is one JSON document at `<dir>/user.json`, the fixed key the
//! browser build kept it under. The directory is created on first save.
//!
//! A document that no longer parses is treated as "no session": the user is
//! sent back to the login screen rather than the dashboard failing to start.

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use tracing::{debug, warn};

use engage_contracts::{
    error::{EngageError, EngageResult},
    session::UserSession,
};
use engage_core::traits::SessionStore;

/// Key the session is stored under.
pub const SESSION_KEY: &str = "user";

#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(format!("{SESSION_KEY}.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> EngageResult<Option<UserSession>> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(EngageError::SessionStore {
                    reason: format!("failed to read '{}': {}", self.path.display(), e),
                })
            }
        };

        match serde_json::from_str::<UserSession>(&contents) {
            Ok(session) => {
                debug!(path = %self.path.display(), username = %session.username, "session loaded");
                Ok(Some(session))
            }
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "stored session is unreadable; treating as signed out"
                );
                Ok(None)
            }
        }
    }

    fn save(&self, session: &UserSession) -> EngageResult<()> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| EngageError::SessionStore {
                reason: format!("failed to create '{}': {}", dir.display(), e),
            })?;
        }

        let json = serde_json::to_string_pretty(session).map_err(|e| EngageError::SessionStore {
            reason: format!("failed to serialize session: {}", e),
        })?;

        std::fs::write(&self.path, json).map_err(|e| EngageError::SessionStore {
            reason: format!("failed to write '{}': {}", self.path.display(), e),
        })?;

        debug!(path = %self.path.display(), session_id = %session.session_id, "session saved");
        Ok(())
    }

    fn clear(&self) -> EngageResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(EngageError::SessionStore {
                reason: format!("failed to remove '{}': {}", self.path.display(), e),
            }),
        }
    }
}
