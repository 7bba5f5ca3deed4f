//! The two static accounts.

use engage_contracts::session::{Role, UserSession};
use engage_core::traits::Authenticator;

struct Account {
    username: &'static str,
    password: &'static str,
    role: Role,
    name: &'static str,
}

const ACCOUNTS: [Account; 2] = [
    Account {
        username: "admin",
        password: "admin123",
        role: Role::Admin,
        name: "Dr. Admin",
    },
    Account {
        username: "user",
        password: "user123",
        role: Role::User,
        name: "Healthcare User",
    },
];

/// Exact, case-sensitive match against the built-in account table.
#[derive(Debug, Default, Clone, Copy)]
pub struct StaticCredentials;

impl Authenticator for StaticCredentials {
    fn authenticate(&self, username: &str, password: &str) -> Option<UserSession> {
        ACCOUNTS
            .iter()
            .find(|a| a.username == username && a.password == password)
            .map(|a| UserSession::new(a.username, a.role, a.name))
    }
}
