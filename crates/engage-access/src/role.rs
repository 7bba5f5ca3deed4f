//! Compiled-in access policy.
//!
//! The same decisions as `policies/dashboard.toml`, written as an exhaustive
//! match over `(Role, ViewId)`. Adding a role or a view does not compile
//! until every combination has a verdict.

use engage_contracts::{
    access::{AccessContext, AccessVerdict, ChartId, ViewId},
    error::{EngageError, EngageResult},
    session::Role,
};
use engage_core::traits::AccessPolicy;

#[derive(Debug, Default, Clone, Copy)]
pub struct RoleAccessPolicy;

impl RoleAccessPolicy {
    pub fn verdict(role: Role, view: ViewId) -> AccessVerdict {
        let restrict = |reason: &str| AccessVerdict::Restrict {
            reason: reason.to_string(),
        };
        match (role, view) {
            (Role::Admin, _) => AccessVerdict::Allow,
            (Role::User, ViewId::Chart(ChartId::LoginActivity | ChartId::NoShowRate)) => {
                AccessVerdict::Allow
            }
            (
                Role::User,
                ViewId::Chart(ChartId::SecureMessages | ChartId::Refills | ChartId::SessionDuration),
            ) => restrict("Admin access required"),
            (Role::User, ViewId::PatientSearch | ViewId::PatientDetail) => {
                restrict("Admin access required to view patient details")
            }
        }
    }
}

impl AccessPolicy for RoleAccessPolicy {
    /// Unknown view resources are a state machine error: every view the
    /// dashboard composes has a `ViewId`.
    fn evaluate(&self, ctx: &AccessContext) -> EngageResult<AccessVerdict> {
        let view = ViewId::from_resource(&ctx.view).ok_or_else(|| EngageError::StateMachineError {
            reason: format!("unknown view '{}'", ctx.view),
        })?;
        Ok(Self::verdict(ctx.role, view))
    }
}
