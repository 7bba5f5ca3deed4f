//! Roles and the signed-in user session.
//!
//! A `UserSession` is the one piece of state that outlives a dashboard run:
//! it is persisted by a `SessionStore` and restored on the next start.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Closed set of dashboard roles.
///
/// Every view-selection point matches on this exhaustively, so adding a role
/// is a compile error until each view decides what the new role may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }

    /// Human-readable label shown in the dashboard header.
    pub fn label(self) -> &'static str {
        match self {
            Role::Admin => "Administrator",
            Role::User => "User",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unique identifier for one sign-in, carried in every session log line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub uuid::Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The current user, as persisted under the session key.
///
/// `session_id` and `signed_in_at` default on read so a bare
/// `{username, role, name}` document is still a valid session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSession {
    pub username: String,
    pub role: Role,
    /// Display name, e.g. "Dr. Admin".
    pub name: String,
    #[serde(default)]
    pub session_id: SessionId,
    #[serde(default = "Utc::now")]
    pub signed_in_at: DateTime<Utc>,
}

impl UserSession {
    pub fn new(username: impl Into<String>, role: Role, name: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            role,
            name: name.into(),
            session_id: SessionId::new(),
            signed_in_at: Utc::now(),
        }
    }
}
