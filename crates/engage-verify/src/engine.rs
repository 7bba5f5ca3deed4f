//! Dataset verifier.
//!
//! `DatasetVerifier` implements the `RecordVerifier` trait from engage-core.
//! Verification runs in two phases:
//!
//! 1. **Structural**: the whole document is validated against
//!    `DatasetSchema::json_schema` using the `jsonschema` crate.
//! 2. **Semantic**: every record is parsed and each `RecordRule` is evaluated
//!    against it. All failures are collected before returning.
//!
//! Structural failures inside one record carry that record's index, and the
//! semantic phase skips that record. A failure at the document level (not an
//! array, empty) has no index and skips the semantic phase entirely.
//!
//! Indexed failures let the loader drop bad records and keep the rest.

use std::collections::{HashMap, HashSet};

use serde_json::Value;
use tracing::{debug, warn};

use engage_contracts::{
    error::EngageResult,
    geography,
    record::{AgeGroup, PatientRecord},
    verify::{DatasetSchema, RecordRuleType, VerificationFailure, VerificationReport},
};
use engage_core::traits::RecordVerifier;

/// A caller-supplied per-record check.
///
/// Returns `Some(message)` when the record fails, `None` when it passes.
pub type CustomRecordFn = Box<dyn Fn(&PatientRecord) -> Option<String> + Send + Sync>;

pub struct DatasetVerifier {
    custom_rules: HashMap<String, CustomRecordFn>,
}

impl DatasetVerifier {
    pub fn new() -> Self {
        Self {
            custom_rules: HashMap::new(),
        }
    }

    /// Register a custom check under `name`, the `function_name` used by
    /// `RecordRuleType::Custom`. Registering a name twice replaces it.
    pub fn register_rule(&mut self, name: impl Into<String>, f: CustomRecordFn) {
        self.custom_rules.insert(name.into(), f);
    }

    fn structural(&self, document: &Value, schema: &DatasetSchema, failures: &mut Vec<VerificationFailure>) {
        if schema.json_schema.is_null() {
            return;
        }
        match jsonschema::validator_for(&schema.json_schema) {
            Ok(validator) => {
                for error in validator.iter_errors(document) {
                    let path = error.instance_path.to_string();
                    let message = format!("JSON Schema violation at {}: {}", path, error);
                    warn!(schema_id = %schema.schema_id, %message, "structural validation failure");
                    failures.push(VerificationFailure {
                        rule_id: "json-schema".to_string(),
                        record_index: record_index(&path),
                        message,
                    });
                }
            }
            Err(e) => {
                let message = format!("invalid JSON Schema document: {e}");
                warn!(schema_id = %schema.schema_id, %message, "schema compilation failure");
                failures.push(VerificationFailure {
                    rule_id: "json-schema".to_string(),
                    record_index: None,
                    message,
                });
            }
        }
    }

    fn check(&self, rule_type: &RecordRuleType, raw: &Value, record: &PatientRecord) -> Option<String> {
        match rule_type {
            RecordRuleType::MissedWithinCap { cap } => {
                let missed = u64::from(record.appointments_missed);
                let limit = (*cap).min(u64::from(record.appointments_scheduled));
                (missed > limit).then(|| {
                    format!(
                        "{} missed appointments exceeds min({}, {} scheduled)",
                        missed, cap, record.appointments_scheduled
                    )
                })
            }

            RecordRuleType::CityInState => (!geography::is_city_in_state(&record.state, &record.city))
                .then(|| format!("city '{}' is not in state '{}'", record.city, record.state)),

            RecordRuleType::AgeWithinGroup => (AgeGroup::for_age(record.age) != Some(record.age_group))
                .then(|| format!("age {} is outside age group {}", record.age, record.age_group)),

            // Stored derived fields are optional; only a present, disagreeing
            // value fails.
            RecordRuleType::DerivedFieldsConsistent => {
                let mut problems = Vec::new();
                if let Some(stored) = raw.get("no_show_rate").and_then(Value::as_f64) {
                    let computed = record.no_show_rate();
                    if (stored - computed).abs() > 0.05 {
                        problems.push(format!("no_show_rate {stored} != computed {computed}"));
                    }
                }
                if let Some(stored) = raw.get("engagement_level").and_then(Value::as_str) {
                    let computed = record.engagement_level();
                    if stored != computed.as_str() {
                        problems.push(format!("engagement_level {stored} != computed {computed}"));
                    }
                }
                (!problems.is_empty()).then(|| problems.join(", "))
            }

            RecordRuleType::Custom { function_name } => match self.custom_rules.get(function_name.as_str()) {
                Some(f) => f(record),
                None => Some(format!("no custom rule registered for function name '{function_name}'")),
            },
        }
    }

    fn semantic(
        &self,
        document: &Value,
        schema: &DatasetSchema,
        skip: &HashSet<usize>,
        failures: &mut Vec<VerificationFailure>,
    ) -> usize {
        let Some(items) = document.as_array() else {
            failures.push(VerificationFailure {
                rule_id: "document-shape".to_string(),
                record_index: None,
                message: "dataset document is not an array".to_string(),
            });
            return 0;
        };

        let mut checked = 0;
        for (index, raw) in items.iter().enumerate() {
            if skip.contains(&index) {
                continue;
            }
            checked += 1;

            let record: PatientRecord = match serde_json::from_value(raw.clone()) {
                Ok(record) => record,
                Err(e) => {
                    failures.push(VerificationFailure {
                        rule_id: "record-shape".to_string(),
                        record_index: Some(index),
                        message: format!("record does not parse: {e}"),
                    });
                    continue;
                }
            };

            for rule in &schema.rules {
                if let Some(message) = self.check(&rule.rule_type, raw, &record) {
                    warn!(
                        rule_id = %rule.rule_id,
                        record_index = index,
                        patient_id = %record.patient_id,
                        %message,
                        "record rule failed"
                    );
                    failures.push(VerificationFailure {
                        rule_id: rule.rule_id.clone(),
                        record_index: Some(index),
                        message,
                    });
                }
            }
        }
        checked
    }
}

/// Index of the record an instance path such as `/12/gender` points into.
fn record_index(instance_path: &str) -> Option<usize> {
    instance_path.strip_prefix('/')?.split('/').next()?.parse().ok()
}

impl Default for DatasetVerifier {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordVerifier for DatasetVerifier {
    fn verify(&self, document: &Value, schema: &DatasetSchema) -> EngageResult<VerificationReport> {
        let mut failures: Vec<VerificationFailure> = Vec::new();

        // ── Phase 1: JSON Schema structural validation ────────────────────────
        self.structural(document, schema, &mut failures);

        // ── Phase 2: per-record rules ─────────────────────────────────────────
        let document_failed = failures.iter().any(|f| f.record_index.is_none());
        let records_checked = if document_failed {
            0
        } else {
            let skip: HashSet<usize> = failures.iter().filter_map(|f| f.record_index).collect();
            debug!(
                schema_id = %schema.schema_id,
                rules = schema.rules.len(),
                skipped = skip.len(),
                "evaluating record rules"
            );
            self.semantic(document, schema, &skip, &mut failures)
        };

        let passed = failures.is_empty();
        debug!(
            schema_id = %schema.schema_id,
            passed,
            records_checked,
            failure_count = failures.len(),
            "verification complete"
        );

        Ok(VerificationReport {
            passed,
            records_checked,
            failures,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
