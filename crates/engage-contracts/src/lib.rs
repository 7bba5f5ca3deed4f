//! # engage-contracts
//!
//! Shared types for the patient-portal engagement dashboard.
//!
//! Every crate in the workspace imports from here. No business logic lives in
//! this crate: only record and filter definitions, aggregate value types,
//! session and access types, the geography table, and error types.

pub mod access;
pub mod analytics;
pub mod error;
pub mod filter;
pub mod geography;
pub mod record;
pub mod session;
pub mod verify;

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use serde_json::json;

    use super::*;
    use access::{ChartId, ViewId};
    use analytics::{round_tenth, Bucket, KpiSet, RefillSplit};
    use error::EngageError;
    use filter::{FilterField, FilterState};
    use record::{
        AgeGroup, ChronicCondition, DeviceType, EngagementLevel, Gender, InsuranceType,
        PatientRecord,
    };
    use session::{Role, UserSession};

    fn sample_record() -> PatientRecord {
        PatientRecord {
            patient_id: "P-0001".to_string(),
            patient_name: "Sarah Smith".to_string(),
            age: 27,
            gender: Gender::Female,
            age_group: AgeGroup::From18To30,
            device_type: DeviceType::Mobile,
            state: "CA".to_string(),
            city: "San Diego".to_string(),
            insurance_type: InsuranceType::SelfPay,
            chronic_condition: ChronicCondition::HeartDisease,
            enrollment_date: NaiveDate::from_ymd_opt(2024, 3, 14).unwrap(),
            week_date: NaiveDate::from_ymd_opt(2024, 1, 8).unwrap(),
            login_count: 7,
            secure_messages: 3,
            refill_requests: 1,
            appointments_scheduled: 3,
            appointments_missed: 1,
            avg_session_minutes: 12.5,
            satisfaction_score: 4.2,
        }
    }

    // ── Derived fields ───────────────────────────────────────────────────────

    #[test]
    fn no_show_rate_rounds_to_one_decimal() {
        let record = sample_record();
        // 1 / 3 * 100 = 33.333...
        assert_eq!(record.no_show_rate(), 33.3);
    }

    #[test]
    fn no_show_rate_is_zero_without_appointments() {
        let record = PatientRecord {
            appointments_scheduled: 0,
            appointments_missed: 0,
            ..sample_record()
        };
        assert_eq!(record.no_show_rate(), 0.0);
    }

    #[test]
    fn engagement_level_thresholds() {
        assert_eq!(EngagementLevel::from_login_count(0), EngagementLevel::Low);
        assert_eq!(EngagementLevel::from_login_count(5), EngagementLevel::Low);
        assert_eq!(EngagementLevel::from_login_count(6), EngagementLevel::Medium);
        assert_eq!(EngagementLevel::from_login_count(10), EngagementLevel::Medium);
        assert_eq!(EngagementLevel::from_login_count(11), EngagementLevel::High);
    }

    #[test]
    fn age_group_for_age_matches_ranges() {
        for group in AgeGroup::ALL {
            for age in group.age_range() {
                assert_eq!(AgeGroup::for_age(age), Some(group), "age {age}");
            }
        }
        assert_eq!(AgeGroup::for_age(17), None);
    }

    // ── JSON shape ───────────────────────────────────────────────────────────

    #[test]
    fn record_json_uses_dataset_field_names_and_labels() {
        let value = serde_json::to_value(sample_record()).unwrap();

        assert_eq!(value["patient_id"], json!("P-0001"));
        assert_eq!(value["age_group"], json!("18-30"));
        assert_eq!(value["insurance_type"], json!("Self-Pay"));
        assert_eq!(value["chronic_condition"], json!("Heart Disease"));
        assert_eq!(value["enrollment_date"], json!("2024-03-14"));
        assert_eq!(value["no_show_rate"], json!(33.3));
        assert_eq!(value["engagement_level"], json!("Medium"));
    }

    #[test]
    fn record_parses_without_derived_fields() {
        let mut value = serde_json::to_value(sample_record()).unwrap();
        let obj = value.as_object_mut().unwrap();
        obj.remove("no_show_rate");
        obj.remove("engagement_level");

        let parsed: PatientRecord = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, sample_record());
    }

    #[test]
    fn stale_derived_fields_are_recomputed_on_read() {
        let mut value = serde_json::to_value(sample_record()).unwrap();
        value["no_show_rate"] = json!(99.9);
        value["engagement_level"] = json!("High");

        let parsed: PatientRecord = serde_json::from_value(value).unwrap();
        assert_eq!(parsed.no_show_rate(), 33.3);
        assert_eq!(parsed.engagement_level(), EngagementLevel::Medium);
    }

    #[test]
    fn gender_reads_in_any_case_and_writes_canonical() {
        let mut value = serde_json::to_value(sample_record()).unwrap();
        value["gender"] = json!("fEMALE");

        let parsed: PatientRecord = serde_json::from_value(value).unwrap();
        assert_eq!(parsed.gender, Gender::Female);
        assert_eq!(serde_json::to_value(parsed).unwrap()["gender"], json!("Female"));

        assert!(serde_json::from_value::<Gender>(json!("unknown")).is_err());
    }

    // ── Filters ──────────────────────────────────────────────────────────────

    #[test]
    fn filter_state_defaults_to_all() {
        let filters = FilterState::default();
        for field in FilterField::ALL {
            assert_eq!(filters.value(field), "all");
        }
        assert_eq!(filters.active_count(), 0);
    }

    #[test]
    fn filter_set_clear_and_reset() {
        let mut filters = FilterState::default();
        filters.set(FilterField::AgeGroup, "60+").unwrap();
        filters.set(FilterField::Gender, "female").unwrap();
        filters.set(FilterField::DeviceType, "Tablet").unwrap();

        assert_eq!(filters.age_group, Some(AgeGroup::Over60));
        assert_eq!(filters.gender, Some(Gender::Female));
        assert_eq!(filters.active_count(), 3);

        filters.clear(FilterField::Gender);
        assert_eq!(filters.active_count(), 2);

        filters.set(FilterField::DeviceType, "all").unwrap();
        assert_eq!(filters.device_type, None);

        filters.reset();
        assert!(filters.is_unconstrained());
    }

    #[test]
    fn filter_rejects_unknown_value_and_keeps_state() {
        let mut filters = FilterState::default();
        filters.set(FilterField::DeviceType, "Mobile").unwrap();

        // Device type is exact-match; lowercase is not a device label.
        let err = filters.set(FilterField::DeviceType, "mobile").unwrap_err();
        match err {
            EngageError::InvalidFilter { field, value } => {
                assert_eq!(field, "deviceType");
                assert_eq!(value, "mobile");
            }
            other => panic!("expected InvalidFilter, got {other:?}"),
        }
        assert_eq!(filters.device_type, Some(DeviceType::Mobile));
    }

    // ── Aggregates ───────────────────────────────────────────────────────────

    #[test]
    fn bucket_average_and_empty_bucket() {
        let mut bucket = Bucket::default();
        assert_eq!(bucket.average(), None);
        bucket.add(10.0);
        bucket.add(20.0);
        assert_eq!(bucket.average(), Some(15.0));
    }

    #[test]
    fn kpi_rounding_is_display_only() {
        let kpis = KpiSet {
            avg_logins: 5.04,
            avg_messages: 2.25,
            avg_no_show_rate: 0.0,
            avg_session_minutes: 23.96,
        };
        let shown = kpis.rounded();
        assert_eq!(shown.avg_logins, 5.0);
        assert_eq!(shown.avg_session_minutes, 24.0);
        assert_eq!(kpis.avg_logins, 5.04);
        assert_eq!(round_tenth(33.333), 33.3);
    }

    #[test]
    fn refill_share_handles_empty_split() {
        assert_eq!(RefillSplit::default().refill_share(), 0.0);
        let split = RefillSplit { refills: 1, other_appointments: 3 };
        assert_eq!(split.refill_share(), 25.0);
    }

    // ── Sessions and views ───────────────────────────────────────────────────

    #[test]
    fn bare_session_document_parses_with_defaults() {
        let session: UserSession = serde_json::from_value(json!({
            "username": "admin",
            "role": "admin",
            "name": "Dr. Admin"
        }))
        .unwrap();
        assert_eq!(session.role, Role::Admin);
        assert_eq!(session.name, "Dr. Admin");
    }

    #[test]
    fn unknown_role_does_not_parse() {
        let result: Result<UserSession, _> = serde_json::from_value(json!({
            "username": "root",
            "role": "superuser",
            "name": "Root"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn view_resources() {
        assert_eq!(ViewId::Chart(ChartId::Refills).resource(), "chart:refills");
        assert_eq!(ViewId::PatientSearch.resource(), "patient-search");
        assert_eq!(ViewId::PatientDetail.to_string(), "patient-detail");
        for id in ChartId::ALL {
            let view = ViewId::Chart(id);
            assert_eq!(ViewId::from_resource(&view.resource()), Some(view));
        }
        assert_eq!(ViewId::from_resource("chart:unknown"), None);
    }

    #[test]
    fn geography_lookup() {
        assert!(geography::is_city_in_state("MI", "Ann Arbor"));
        assert!(!geography::is_city_in_state("MI", "Miami"));
        assert!(geography::cities_for("ZZ").is_none());
    }

    // ── Error display messages ───────────────────────────────────────────────

    #[test]
    fn error_display_messages() {
        let err = EngageError::DatasetLoad {
            reason: "status 404".to_string(),
        };
        assert!(err.to_string().contains("dataset load failed"));
        assert!(err.to_string().contains("404"));

        let err = EngageError::StateMachineError {
            reason: "not signed in".to_string(),
        };
        assert!(err.to_string().contains("state machine error"));
    }
}
