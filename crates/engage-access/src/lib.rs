//! # engage-access
//!
//! Who may sign in, and which dashboard views each role may see.
//!
//! - [`StaticCredentials`] implements `Authenticator` over the two built-in
//!   accounts.
//! - [`TomlAccessPolicy`] implements `AccessPolicy` from an ordered TOML rule
//!   list. The first matching rule wins; an unmatched view is restricted.
//! - [`RoleAccessPolicy`] is the same policy as an exhaustive match, for
//!   callers that do not want a policy file.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use engage_access::{StaticCredentials, TomlAccessPolicy};
//!
//! let policy = TomlAccessPolicy::default_policy()?;
//! let dashboard = Dashboard::new(records, Box::new(StaticCredentials), Box::new(policy), store)?;
//! ```
//!
//! ## Rule matching
//!
//! Each rule names a `view` pattern and a list of roles. `"*"` matches any
//! view and a trailing `*` matches a prefix (`"chart:*"`).

pub mod credentials;
pub mod engine;
pub mod role;
pub mod rule;

pub use credentials::StaticCredentials;
pub use engine::TomlAccessPolicy;
pub use role::RoleAccessPolicy;
pub use rule::{AccessPolicyConfig, AccessRule, RuleVerdict};

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use engage_contracts::{
        access::{AccessContext, AccessVerdict, ChartId, ViewId},
        error::EngageError,
        session::Role,
    };
    use engage_core::traits::{AccessPolicy, Authenticator};

    use crate::{RoleAccessPolicy, StaticCredentials, TomlAccessPolicy};

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn ctx(role: Role, view: ViewId) -> AccessContext {
        AccessContext {
            username: "tester".to_string(),
            role,
            view: view.resource(),
        }
    }

    fn every_view() -> Vec<ViewId> {
        let mut views: Vec<ViewId> = ChartId::ALL.into_iter().map(ViewId::Chart).collect();
        views.push(ViewId::PatientSearch);
        views.push(ViewId::PatientDetail);
        views
    }

    // ── 1. credentials ────────────────────────────────────────────────────────

    #[test]
    fn test_static_credentials() {
        let admin = StaticCredentials.authenticate("admin", "admin123").unwrap();
        assert_eq!(admin.role, Role::Admin);
        assert_eq!(admin.name, "Dr. Admin");

        let user = StaticCredentials.authenticate("user", "user123").unwrap();
        assert_eq!(user.role, Role::User);
        assert_eq!(user.name, "Healthcare User");
    }

    #[test]
    fn test_credentials_are_exact() {
        assert!(StaticCredentials.authenticate("admin", "wrong").is_none());
        assert!(StaticCredentials.authenticate("Admin", "admin123").is_none());
        assert!(StaticCredentials.authenticate("admin ", "admin123").is_none());
        assert!(StaticCredentials.authenticate("user", "admin123").is_none());
        assert!(StaticCredentials.authenticate("", "").is_none());
    }

    // ── 2. deny-by-default ────────────────────────────────────────────────────

    #[test]
    fn test_restrict_by_default() {
        let policy = TomlAccessPolicy::from_toml_str("rules = []").unwrap();
        let verdict = policy
            .evaluate(&ctx(Role::Admin, ViewId::Chart(ChartId::Refills)))
            .unwrap();

        match verdict {
            AccessVerdict::Restrict { reason } => {
                assert!(
                    reason.contains("restricted by default"),
                    "expected 'restricted by default' in reason, got: {reason}"
                );
            }
            other => panic!("expected Restrict, got {:?}", other),
        }
    }

    // ── 3. role and view matching ─────────────────────────────────────────────

    #[test]
    fn test_rule_applies_only_to_listed_roles() {
        let toml = r#"
            [[rules]]
            id = "admins-refills"
            description = "Refills for admins"
            view = "chart:refills"
            roles = ["admin"]
            verdict = "allow"
        "#;
        let policy = TomlAccessPolicy::from_toml_str(toml).unwrap();
        let refills = ViewId::Chart(ChartId::Refills);

        assert_eq!(policy.evaluate(&ctx(Role::Admin, refills)).unwrap(), AccessVerdict::Allow);
        assert!(!policy.evaluate(&ctx(Role::User, refills)).unwrap().is_allowed());
    }

    #[test]
    fn test_prefix_pattern_and_first_match_wins() {
        let toml = r#"
            [[rules]]
            id = "logins-open"
            description = "Logins for everyone"
            view = "chart:login-activity"
            roles = ["user"]
            verdict = "allow"

            [[rules]]
            id = "charts-closed"
            description = "Every other chart is locked"
            view = "chart:*"
            roles = ["user"]
            verdict = "restrict"
            restrict_reason = "locked"
        "#;
        let policy = TomlAccessPolicy::from_toml_str(toml).unwrap();

        assert_eq!(
            policy.evaluate(&ctx(Role::User, ViewId::Chart(ChartId::LoginActivity))).unwrap(),
            AccessVerdict::Allow
        );
        assert_eq!(
            policy.evaluate(&ctx(Role::User, ViewId::Chart(ChartId::SessionDuration))).unwrap(),
            AccessVerdict::Restrict { reason: "locked".to_string() }
        );
        // `chart:*` does not cover the patient views.
        let search = policy.evaluate(&ctx(Role::User, ViewId::PatientSearch)).unwrap();
        assert!(matches!(search, AccessVerdict::Restrict { reason } if reason.contains("by default")));
    }

    #[test]
    fn test_restrict_without_reason_names_rule() {
        let toml = r#"
            [[rules]]
            id = "lock-all"
            description = "Everything locked"
            view = "*"
            roles = ["admin", "user"]
            verdict = "restrict"
        "#;
        let policy = TomlAccessPolicy::from_toml_str(toml).unwrap();
        assert_eq!(
            policy.evaluate(&ctx(Role::Admin, ViewId::PatientDetail)).unwrap(),
            AccessVerdict::Restrict { reason: "restricted by rule 'lock-all'".to_string() }
        );
    }

    // ── 4. malformed policy ───────────────────────────────────────────────────

    #[test]
    fn test_unknown_role_is_config_error() {
        let toml = r#"
            [[rules]]
            id = "nurses"
            description = "Typo'd role"
            view = "*"
            roles = ["nurse"]
            verdict = "allow"
        "#;
        let err = TomlAccessPolicy::from_toml_str(toml).unwrap_err();
        assert!(matches!(err, EngageError::ConfigError { .. }));
    }

    #[test]
    fn test_unknown_verdict_is_config_error() {
        let toml = r#"
            [[rules]]
            id = "odd"
            description = "Unknown verdict"
            view = "*"
            roles = ["admin"]
            verdict = "maybe"
        "#;
        assert!(matches!(
            TomlAccessPolicy::from_toml_str(toml),
            Err(EngageError::ConfigError { .. })
        ));
    }

    // ── 5. shipped policy ─────────────────────────────────────────────────────

    #[test]
    fn test_default_policy_matches_role_policy() {
        let toml_policy = TomlAccessPolicy::default_policy().unwrap();
        assert!(toml_policy.rule_count() > 0);

        for role in [Role::Admin, Role::User] {
            for view in every_view() {
                let from_file = toml_policy.evaluate(&ctx(role, view)).unwrap();
                let compiled = RoleAccessPolicy.evaluate(&ctx(role, view)).unwrap();
                assert_eq!(from_file, compiled, "{role} on {view}");
            }
        }
    }

    #[test]
    fn test_user_sees_two_charts() {
        let allowed: Vec<ChartId> = ChartId::ALL
            .into_iter()
            .filter(|&c| RoleAccessPolicy::verdict(Role::User, ViewId::Chart(c)).is_allowed())
            .collect();
        assert_eq!(allowed, vec![ChartId::LoginActivity, ChartId::NoShowRate]);
        assert!(!RoleAccessPolicy::verdict(Role::User, ViewId::PatientDetail).is_allowed());
    }

    #[test]
    fn test_role_policy_rejects_unknown_view() {
        let bad = AccessContext {
            username: "admin".to_string(),
            role: Role::Admin,
            view: "chart:pie".to_string(),
        };
        assert!(matches!(
            RoleAccessPolicy.evaluate(&bad),
            Err(EngageError::StateMachineError { .. })
        ));
    }
}
