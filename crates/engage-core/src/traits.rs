//! Trait seams for the engagement dashboard.
//!
//! These five traits are everything the dashboard depends on from outside
//! the pure pipeline:
//!
//! - `DatasetSource`: where the raw dataset document comes from
//! - `RecordVerifier`: whether a loaded document is fit to use
//! - `Authenticator`: the credential check behind `login`
//! - `AccessPolicy`: which views a role may see
//! - `SessionStore`: where the signed-in user is persisted between runs
//!
//! The `Dashboard` owns one of each (except the source and verifier, which
//! are only needed while loading) and never touches globals.

use engage_contracts::{
    access::{AccessContext, AccessVerdict},
    error::EngageResult,
    session::UserSession,
    verify::{DatasetSchema, VerificationReport},
};

/// A place a dataset document can be fetched from.
///
/// Implementations return the raw JSON so it can be verified before it is
/// turned into records. Any failure is reported as an error; deciding to
/// fall back to generated data is the loader's job.
pub trait DatasetSource: Send + Sync {
    /// Short human-readable description for logs, e.g. a path or URL.
    fn describe(&self) -> String;

    /// Fetch and parse the document.
    fn fetch(&self) -> EngageResult<serde_json::Value>;
}

/// Checks a raw dataset document before it is accepted.
pub trait RecordVerifier: Send + Sync {
    /// Return a report with `passed = true` only if every check passes.
    fn verify(
        &self,
        document: &serde_json::Value,
        schema: &DatasetSchema,
    ) -> EngageResult<VerificationReport>;
}

/// The credential check behind `Dashboard::login`.
pub trait Authenticator: Send + Sync {
    /// Return a fresh session when the pair matches an account, else `None`.
    fn authenticate(&self, username: &str, password: &str) -> Option<UserSession>;
}

/// Decides which views a role may see.
///
/// Implementations must be deterministic and free of I/O: the dashboard
/// evaluates the policy for every view each time it composes a screen.
pub trait AccessPolicy: Send + Sync {
    fn evaluate(&self, ctx: &AccessContext) -> EngageResult<AccessVerdict>;
}

/// Persists the current user between runs.
///
/// Holds at most one session. `load` on an empty store is `Ok(None)`.
pub trait SessionStore: Send + Sync {
    fn load(&self) -> EngageResult<Option<UserSession>>;

    fn save(&self, session: &UserSession) -> EngageResult<()>;

    /// Remove the stored session. Clearing an empty store is not an error.
    fn clear(&self) -> EngageResult<()>;
}
