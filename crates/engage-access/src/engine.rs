//! TOML-driven access policy.
//!
//! `TomlAccessPolicy` loads an `AccessPolicyConfig` from a TOML string or
//! file and implements the `AccessPolicy` trait from engage-core.
//!
//! Evaluation:
//!
//! 1. Iterate rules in declaration order.
//! 2. The first rule whose `view` pattern and `roles` match decides.
//! 3. If no rule matched → `Restrict` ("restricted by default").

use std::path::Path;

use tracing::{debug, warn};

use engage_contracts::{
    access::{AccessContext, AccessVerdict},
    error::{EngageError, EngageResult},
};
use engage_core::traits::AccessPolicy;

use crate::rule::{AccessPolicyConfig, RuleVerdict};

/// The policy shipped with the dashboard.
pub const DEFAULT_POLICY: &str = include_str!("../policies/dashboard.toml");

/// An `AccessPolicy` backed by an ordered TOML rule list.
///
/// ```rust,ignore
/// use engage_access::engine::TomlAccessPolicy;
///
/// let policy = TomlAccessPolicy::from_file(Path::new("policies/dashboard.toml"))?;
/// ```
#[derive(Debug)]
pub struct TomlAccessPolicy {
    config: AccessPolicyConfig,
}

impl TomlAccessPolicy {
    /// Returns `EngageError::ConfigError` if the TOML is malformed, does not
    /// match `AccessPolicyConfig`, or names an unknown role.
    pub fn from_toml_str(s: &str) -> EngageResult<Self> {
        let config: AccessPolicyConfig = toml::from_str(s).map_err(|e| EngageError::ConfigError {
            reason: format!("failed to parse access policy TOML: {}", e),
        })?;
        Ok(Self { config })
    }

    pub fn from_file(path: &Path) -> EngageResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| EngageError::ConfigError {
            reason: format!("failed to read policy file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// The built-in dashboard policy.
    pub fn default_policy() -> EngageResult<Self> {
        Self::from_toml_str(DEFAULT_POLICY)
    }

    pub fn rule_count(&self) -> usize {
        self.config.rules.len()
    }
}

impl AccessPolicy for TomlAccessPolicy {
    fn evaluate(&self, ctx: &AccessContext) -> EngageResult<AccessVerdict> {
        for rule in &self.config.rules {
            if !rule.matches(&ctx.view, ctx.role) {
                continue;
            }

            debug!(
                rule_id = %rule.id,
                view = %ctx.view,
                role = %ctx.role,
                "access rule matched"
            );

            let verdict = match rule.verdict {
                RuleVerdict::Allow => AccessVerdict::Allow,
                RuleVerdict::Restrict => AccessVerdict::Restrict {
                    reason: rule
                        .restrict_reason
                        .clone()
                        .unwrap_or_else(|| format!("restricted by rule '{}'", rule.id)),
                },
            };
            return Ok(verdict);
        }

        warn!(
            view = %ctx.view,
            role = %ctx.role,
            username = %ctx.username,
            "no access rule matched; restricting by default"
        );

        Ok(AccessVerdict::Restrict {
            reason: format!(
                "restricted by default: no access rule matched view '{}' for role '{}'",
                ctx.view, ctx.role
            ),
        })
    }
}
