//! Dataset verification schema and report types.
//!
//! A loaded dataset is only used if it passes its `DatasetSchema`. A failing
//! report sends the loader down the generated-data fallback path.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What a dataset document is checked against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetSchema {
    /// Unique identifier, e.g. "patient-portal-dataset-v1".
    pub schema_id: String,
    /// JSON Schema for the whole document (an array of records).
    pub json_schema: Value,
    /// Per-record invariants evaluated after structural validation.
    pub rules: Vec<RecordRule>,
}

/// One per-record invariant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordRule {
    pub rule_id: String,
    pub description: String,
    pub rule_type: RecordRuleType,
}

/// Built-in record invariants plus a hook for registered custom checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RecordRuleType {
    /// `appointments_missed <= min(cap, appointments_scheduled)`.
    MissedWithinCap { cap: u64 },

    /// `city` is listed for `state` in the geography table.
    CityInState,

    /// `age` falls inside the range implied by `age_group`.
    AgeWithinGroup,

    /// If present, `no_show_rate` and `engagement_level` agree with the
    /// values recomputed from their inputs.
    DerivedFieldsConsistent,

    /// Delegate to a named function registered with the verifier.
    Custom { function_name: String },
}

/// Result of verifying one dataset document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationReport {
    /// True only if every check passed.
    pub passed: bool,
    pub records_checked: usize,
    pub failures: Vec<VerificationFailure>,
}

impl VerificationReport {
    /// `"[rule] message; [rule] message"`, truncated to the first `limit` failures.
    pub fn summary(&self, limit: usize) -> String {
        let mut parts: Vec<String> = self
            .failures
            .iter()
            .take(limit)
            .map(|f| match f.record_index {
                Some(i) => format!("[{}] record {}: {}", f.rule_id, i, f.message),
                None => format!("[{}] {}", f.rule_id, f.message),
            })
            .collect();
        if self.failures.len() > limit {
            parts.push(format!("... {} more", self.failures.len() - limit));
        }
        parts.join("; ")
    }
}

/// A single failed check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationFailure {
    pub rule_id: String,
    /// Index into the dataset array; `None` for document-level failures.
    pub record_index: Option<usize>,
    pub message: String,
}
