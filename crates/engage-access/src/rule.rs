//! Access rule types and the policy file schema.
//!
//! An `AccessPolicyConfig` is deserialized from TOML and holds an ordered
//! list of `AccessRule`s. The first rule that matches both the view and the
//! role wins. If none matches, the view is restricted.

use serde::{Deserialize, Serialize};

use engage_contracts::session::Role;

/// What a matching rule decides.
///
/// ```toml
/// verdict = "allow"
/// verdict = "restrict"
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleVerdict {
    Allow,
    Restrict,
}

/// A single access rule loaded from TOML.
///
/// `view` is matched against the view resource (`chart:refills`,
/// `patient-search`, `patient-detail`). It may be `"*"` for any view, or end
/// in `*` to match a prefix such as `"chart:*"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessRule {
    pub id: String,

    pub description: String,

    pub view: String,

    /// Roles this rule applies to. Names outside the `Role` enum fail to
    /// deserialize, so a typo in a policy file is a load error rather than a
    /// rule that silently never matches.
    pub roles: Vec<Role>,

    pub verdict: RuleVerdict,

    /// Shown in place of a restricted view.
    pub restrict_reason: Option<String>,
}

impl AccessRule {
    pub fn matches(&self, view: &str, role: Role) -> bool {
        self.roles.contains(&role) && view_matches(&self.view, view)
    }
}

fn view_matches(pattern: &str, view: &str) -> bool {
    match pattern.strip_suffix('*') {
        Some(prefix) => view.starts_with(prefix),
        None => pattern == view,
    }
}

/// The top-level structure of a policy file.
///
/// ```toml
/// [[rules]]
/// id = "login-activity-all"
/// description = "Average weekly logins is visible to every signed-in role"
/// view = "chart:login-activity"
/// roles = ["admin", "user"]
/// verdict = "allow"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessPolicyConfig {
    /// Ordered list of rules. First match wins.
    pub rules: Vec<AccessRule>,
}
