//! The dataset schema used by the loader.

use serde_json::{json, Value};

use engage_contracts::{
    record::{AgeGroup, ChronicCondition, DeviceType, EngagementLevel, Gender, InsuranceType},
    verify::{DatasetSchema, RecordRule, RecordRuleType},
};

/// Missed appointments never exceed this, whatever was scheduled.
pub const MISSED_APPOINTMENTS_CAP: u64 = 2;

fn labels<T: ToString>(values: impl IntoIterator<Item = T>) -> Value {
    Value::Array(values.into_iter().map(|v| Value::String(v.to_string())).collect())
}

/// `^(?:[Mm][Aa][Ll][Ee]|...)$`: one alternative per label, any casing.
fn any_case<T: ToString>(values: impl IntoIterator<Item = T>) -> String {
    let alternatives: Vec<String> = values
        .into_iter()
        .map(|v| {
            v.to_string()
                .chars()
                .map(|c| {
                    if c.is_ascii_alphabetic() {
                        format!("[{}{}]", c.to_ascii_uppercase(), c.to_ascii_lowercase())
                    } else {
                        c.to_string()
                    }
                })
                .collect::<String>()
        })
        .collect();
    format!("^(?:{})$", alternatives.join("|"))
}

fn date() -> Value {
    json!({ "type": "string", "pattern": "^[0-9]{4}-[0-9]{2}-[0-9]{2}$" })
}

/// JSON Schema for a dataset document: a non-empty array of records with
/// every sampled field present.
///
/// `strict` adds the label sets and the documented value ranges. Without it
/// only field presence and JSON types are checked; values that still fail to
/// parse are caught per record by the verifier.
pub fn dataset_json_schema(strict: bool) -> Value {
    let integer = |min: u64, max: u64| {
        if strict {
            json!({ "type": "integer", "minimum": min, "maximum": max })
        } else {
            json!({ "type": "integer", "minimum": 0 })
        }
    };
    let number = |min: f64, max: f64| {
        if strict {
            json!({ "type": "number", "minimum": min, "maximum": max })
        } else {
            json!({ "type": "number" })
        }
    };
    let label = |values: Value| {
        if strict {
            json!({ "enum": values })
        } else {
            json!({ "type": "string" })
        }
    };
    let gender = if strict {
        json!({ "type": "string", "pattern": any_case(Gender::ALL) })
    } else {
        json!({ "type": "string" })
    };

    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "type": "array",
        "minItems": 1,
        "items": {
            "type": "object",
            "required": [
                "patient_id", "patient_name", "age", "gender", "age_group",
                "device_type", "state", "city", "insurance_type",
                "chronic_condition", "enrollment_date", "week_date",
                "login_count", "secure_messages", "refill_requests",
                "appointments_scheduled", "appointments_missed",
                "avg_session_minutes", "satisfaction_score"
            ],
            "properties": {
                "patient_id": { "type": "string", "minLength": 1 },
                "patient_name": { "type": "string" },
                "age": integer(18, 120),
                "gender": gender,
                "age_group": label(labels(AgeGroup::ALL)),
                "device_type": label(labels(DeviceType::ALL)),
                "state": { "type": "string" },
                "city": { "type": "string" },
                "insurance_type": label(labels(InsuranceType::ALL)),
                "chronic_condition": label(labels(ChronicCondition::ALL)),
                "enrollment_date": date(),
                "week_date": date(),
                "login_count": integer(0, 15),
                "secure_messages": integer(0, 10),
                "refill_requests": integer(0, 5),
                "appointments_scheduled": integer(0, 4),
                "appointments_missed": integer(0, 4),
                "avg_session_minutes": number(2.0, 45.0),
                "satisfaction_score": number(1.0, 5.0),
                "no_show_rate": number(0.0, 100.0),
                "engagement_level": label(labels(EngagementLevel::ALL))
            }
        }
    })
}

/// The schema the loader verifies against.
///
/// With `with_invariants = false` the JSON Schema is the lenient one and no
/// record rules run, so any document whose records parse is accepted.
pub fn dataset_schema(with_invariants: bool) -> DatasetSchema {
    let rules = if with_invariants {
        vec![
            RecordRule {
                rule_id: "missed-within-cap".to_string(),
                description: "Missed appointments never exceed the scheduled count or the cap".to_string(),
                rule_type: RecordRuleType::MissedWithinCap {
                    cap: MISSED_APPOINTMENTS_CAP,
                },
            },
            RecordRule {
                rule_id: "city-in-state".to_string(),
                description: "City belongs to the record's state".to_string(),
                rule_type: RecordRuleType::CityInState,
            },
            RecordRule {
                rule_id: "age-within-group".to_string(),
                description: "Age lies inside the record's age group".to_string(),
                rule_type: RecordRuleType::AgeWithinGroup,
            },
            RecordRule {
                rule_id: "derived-fields".to_string(),
                description: "Stored no-show rate and engagement level match their inputs".to_string(),
                rule_type: RecordRuleType::DerivedFieldsConsistent,
            },
        ]
    } else {
        Vec::new()
    };

    DatasetSchema {
        schema_id: "patient-portal-dataset-v1".to_string(),
        json_schema: dataset_json_schema(with_invariants),
        rules,
    }
}
