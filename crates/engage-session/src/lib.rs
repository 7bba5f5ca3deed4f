//! # engage-session
//!
//! Where the signed-in user lives between runs.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use engage_session::FileSessionStore;
//! use engage_core::traits::SessionStore;
//!
//! let store = FileSessionStore::new(".engage");
//! store.save(&session)?;
//! assert_eq!(store.load()?, Some(session));
//! store.clear()?;
//! ```

pub mod file;
pub mod memory;

pub use file::{FileSessionStore, SESSION_KEY};
pub use memory::InMemorySessionStore;

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use engage_contracts::session::{Role, UserSession};
    use engage_core::traits::SessionStore;

    use super::{FileSessionStore, InMemorySessionStore};

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn admin() -> UserSession {
        UserSession::new("admin", Role::Admin, "Dr. Admin")
    }

    // ── In-memory ─────────────────────────────────────────────────────────────

    #[test]
    fn test_memory_store_round_trip() {
        let store = InMemorySessionStore::new();
        assert!(store.load().unwrap().is_none());

        let session = admin();
        store.save(&session).unwrap();
        assert_eq!(store.load().unwrap(), Some(session));

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_memory_store_clones_share_slot() {
        let store = InMemorySessionStore::new();
        let observer = store.clone();
        store.save(&admin()).unwrap();
        assert_eq!(observer.load().unwrap().unwrap().username, "admin");
    }

    // ── File ──────────────────────────────────────────────────────────────────

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("nested"));
        assert!(store.load().unwrap().is_none());

        let session = admin();
        store.save(&session).unwrap();
        assert!(store.path().ends_with("user.json"));

        let reopened = FileSessionStore::new(dir.path().join("nested"));
        assert_eq!(reopened.load().unwrap(), Some(session));
    }

    #[test]
    fn test_file_store_clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path());
        store.clear().unwrap();

        store.save(&admin()).unwrap();
        store.clear().unwrap();
        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_file_store_accepts_bare_document() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path());
        std::fs::write(
            store.path(),
            r#"{"username":"user","role":"user","name":"Healthcare User"}"#,
        )
        .unwrap();

        let session = store.load().unwrap().unwrap();
        assert_eq!(session.role, Role::User);
        assert!(session.signed_in_at <= chrono::Utc::now());
    }

    #[test]
    fn test_file_store_corrupt_document_is_signed_out() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path());
        std::fs::write(store.path(), "{ not json").unwrap();
        assert!(store.load().unwrap().is_none());

        std::fs::write(
            store.path(),
            r#"{"username":"x","role":"superuser","name":"X"}"#,
        )
        .unwrap();
        assert!(store.load().unwrap().is_none());
    }
}
