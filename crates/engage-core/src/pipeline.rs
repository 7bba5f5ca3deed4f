//! The filter and aggregation pipeline.
//!
//!   dataset → filter → { summarize, group_by } → charts
//!
//! Every function here is pure: the same inputs always give the same outputs,
//! and an empty input gives zero-valued KPIs and empty groupings rather than
//! an error.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use chrono::NaiveDate;
use tracing::debug;

use engage_contracts::{
    analytics::{Bucket, GroupAverage, KpiSet, RefillSplit},
    filter::{FilterField, FilterState, ALL},
    record::{AgeGroup, DeviceType, Gender, PatientRecord},
};

/// Maximum number of patients a search returns.
pub const SEARCH_LIMIT: usize = 10;

// ── Filtering ─────────────────────────────────────────────────────────────────

/// True when `record` satisfies every constrained field of `filters`.
///
/// Gender case-insensitivity is handled when the filter value is parsed, so
/// every comparison here is an exact enum match.
pub fn matches(filters: &FilterState, record: &PatientRecord) -> bool {
    filters.age_group.map_or(true, |g| record.age_group == g)
        && filters.gender.map_or(true, |g| record.gender == g)
        && filters.device_type.map_or(true, |d| record.device_type == d)
}

/// Records that pass `filters`, in dataset order.
///
/// With every field at `"all"` this is the whole dataset.
pub fn filter<'a>(dataset: &'a [PatientRecord], filters: &FilterState) -> Vec<&'a PatientRecord> {
    let filtered: Vec<&PatientRecord> = dataset.iter().filter(|r| matches(filters, r)).collect();
    debug!(
        total = dataset.len(),
        kept = filtered.len(),
        active_filters = filters.active_count(),
        "filters applied"
    );
    filtered
}

// ── KPIs ──────────────────────────────────────────────────────────────────────

/// Arithmetic mean of the four headline fields. All zeros for no records.
///
/// Sums are kept unrounded; only the caller's display step rounds.
pub fn summarize<'a, I>(records: I) -> KpiSet
where
    I: IntoIterator<Item = &'a PatientRecord>,
{
    let mut count = 0usize;
    let mut logins = 0.0;
    let mut messages = 0.0;
    let mut no_show = 0.0;
    let mut session = 0.0;

    for r in records {
        count += 1;
        logins += f64::from(r.login_count);
        messages += f64::from(r.secure_messages);
        no_show += r.no_show_rate();
        session += r.avg_session_minutes;
    }

    if count == 0 {
        return KpiSet::default();
    }

    let n = count as f64;
    KpiSet {
        avg_logins: logins / n,
        avg_messages: messages / n,
        avg_no_show_rate: no_show / n,
        avg_session_minutes: session / n,
    }
}

// ── Grouping ──────────────────────────────────────────────────────────────────

/// Group records by `key_fn` and average `value_fn` within each group.
///
/// Output is sorted by key ascending with one entry per key. Keys with no
/// records never appear, so no bucket is ever emitted with a zero count.
pub fn group_by<'a, I, K, KF, VF>(records: I, key_fn: KF, value_fn: VF) -> Vec<GroupAverage<K>>
where
    I: IntoIterator<Item = &'a PatientRecord>,
    K: Ord,
    KF: Fn(&PatientRecord) -> K,
    VF: Fn(&PatientRecord) -> f64,
{
    let mut buckets: BTreeMap<K, Bucket> = BTreeMap::new();
    for r in records {
        buckets.entry(key_fn(r)).or_default().add(value_fn(r));
    }

    buckets
        .into_iter()
        .filter_map(|(key, bucket)| {
            bucket.average().map(|average| GroupAverage {
                key,
                average,
                count: bucket.count,
            })
        })
        .collect()
}

/// Average no-show rate per age group.
pub fn no_show_by_age_group<'a, I>(records: I) -> Vec<GroupAverage<AgeGroup>>
where
    I: IntoIterator<Item = &'a PatientRecord>,
{
    group_by(records, |r| r.age_group, PatientRecord::no_show_rate)
}

/// Average secure messages per device type.
pub fn messages_by_device<'a, I>(records: I) -> Vec<GroupAverage<DeviceType>>
where
    I: IntoIterator<Item = &'a PatientRecord>,
{
    group_by(records, |r| r.device_type, |r| f64::from(r.secure_messages))
}

/// Average session minutes per calendar week, oldest week first.
pub fn session_minutes_by_week<'a, I>(records: I) -> Vec<GroupAverage<NaiveDate>>
where
    I: IntoIterator<Item = &'a PatientRecord>,
{
    group_by(records, |r| r.week_date, |r| r.avg_session_minutes)
}

/// Average logins per calendar week, oldest week first.
pub fn logins_by_week<'a, I>(records: I) -> Vec<GroupAverage<NaiveDate>>
where
    I: IntoIterator<Item = &'a PatientRecord>,
{
    group_by(records, |r| r.week_date, |r| f64::from(r.login_count))
}

/// Total refill requests against the rest of the scheduled appointments.
pub fn refill_split<'a, I>(records: I) -> RefillSplit
where
    I: IntoIterator<Item = &'a PatientRecord>,
{
    let (refills, appointments) = records.into_iter().fold((0u64, 0u64), |(rf, ap), r| {
        (
            rf + u64::from(r.refill_requests),
            ap + u64::from(r.appointments_scheduled),
        )
    });
    RefillSplit {
        refills,
        other_appointments: appointments.saturating_sub(refills),
    }
}

// ── Filter options ────────────────────────────────────────────────────────────

/// Values offered in each filter drop-down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOptions {
    /// Distinct age groups present in the dataset, ascending.
    pub age_groups: Vec<AgeGroup>,
    /// Always the full gender domain.
    pub genders: Vec<Gender>,
    /// Distinct device types present in the dataset, ascending.
    pub device_types: Vec<DeviceType>,
}

impl FilterOptions {
    /// `"all"` followed by the option labels for `field`, in display order.
    pub fn choices(&self, field: FilterField) -> Vec<&'static str> {
        let labels: Vec<&'static str> = match field {
            FilterField::AgeGroup => self.age_groups.iter().map(|g| g.as_str()).collect(),
            FilterField::Gender => self.genders.iter().map(|g| g.as_str()).collect(),
            FilterField::DeviceType => self.device_types.iter().map(|d| d.as_str()).collect(),
        };
        std::iter::once(ALL).chain(labels).collect()
    }
}

pub fn filter_options(dataset: &[PatientRecord]) -> FilterOptions {
    let age_groups: BTreeSet<AgeGroup> = dataset.iter().map(|r| r.age_group).collect();
    let device_types: BTreeSet<DeviceType> = dataset.iter().map(|r| r.device_type).collect();
    FilterOptions {
        age_groups: age_groups.into_iter().collect(),
        genders: Gender::ALL.to_vec(),
        device_types: device_types.into_iter().collect(),
    }
}

// ── Patient search ────────────────────────────────────────────────────────────

/// First record of each patient whose name or id contains `term`.
///
/// Matching is case-insensitive. A blank term matches everyone. At most
/// `limit` patients are returned, in first-seen order.
pub fn search_patients<'a, I>(records: I, term: &str, limit: usize) -> Vec<&'a PatientRecord>
where
    I: IntoIterator<Item = &'a PatientRecord>,
{
    let needle = term.trim().to_lowercase();
    let mut seen: HashSet<&str> = HashSet::new();

    let mut hits = Vec::new();

    for r in records {
        if hits.len() >= limit {
            break;
        }
        if !seen.insert(r.patient_id.as_str()) {
            continue;
        }
        if needle.is_empty()
            || r.patient_name.to_lowercase().contains(&needle)
            || r.patient_id.to_lowercase().contains(&needle)
        {
            hits.push(r);
        }
    }

    hits
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use engage_contracts::{
        filter::{FilterField, FilterState},
        record::{AgeGroup, ChronicCondition, DeviceType, Gender, InsuranceType, PatientRecord},
    };

    use super::*;

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn record(id: &str) -> PatientRecord {
        PatientRecord {
            patient_id: id.to_string(),
            patient_name: format!("Patient {id}"),
            age: 40,
            gender: Gender::Male,
            age_group: AgeGroup::From31To45,
            device_type: DeviceType::Desktop,
            state: "TX".to_string(),
            city: "Austin".to_string(),
            insurance_type: InsuranceType::Private,
            chronic_condition: ChronicCondition::NoCondition,
            enrollment_date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            week_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            login_count: 4,
            secure_messages: 2,
            refill_requests: 1,
            appointments_scheduled: 2,
            appointments_missed: 0,
            avg_session_minutes: 10.0,
            satisfaction_score: 3.5,
        }
    }

    fn week(n: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::weeks(i64::from(n))
    }

    fn mixed_dataset() -> Vec<PatientRecord> {
        vec![
            PatientRecord {
                gender: Gender::Female,
                device_type: DeviceType::Mobile,
                age_group: AgeGroup::From18To30,
                age: 22,
                ..record("P-0001")
            },
            PatientRecord {
                gender: Gender::Male,
                device_type: DeviceType::Tablet,
                ..record("P-0002")
            },
            PatientRecord {
                gender: Gender::Other,
                device_type: DeviceType::Mobile,
                age_group: AgeGroup::Over60,
                age: 70,
                ..record("P-0003")
            },
        ]
    }

    // ── filter ────────────────────────────────────────────────────────────────

    /// All-"all" filters return the dataset unchanged, in order.
    #[test]
    fn test_filter_identity() {
        let data = mixed_dataset();
        let out = filter(&data, &FilterState::default());
        assert_eq!(out.len(), data.len());
        for (a, b) in out.iter().zip(data.iter()) {
            assert_eq!(*a, b);
        }
    }

    #[test]
    fn test_filter_combines_fields() {
        let data = mixed_dataset();
        let mut filters = FilterState::default();
        filters.set(FilterField::DeviceType, "Mobile").unwrap();
        assert_eq!(filter(&data, &filters).len(), 2);

        filters.set(FilterField::Gender, "OTHER").unwrap();
        let out = filter(&data, &filters);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].patient_id, "P-0003");
    }

    #[test]
    fn test_filter_empty_result_propagates() {
        let data = mixed_dataset();
        let mut filters = FilterState::default();
        filters.set(FilterField::AgeGroup, "46-60").unwrap();

        let out = filter(&data, &filters);
        assert!(out.is_empty());
        assert_eq!(summarize(out.iter().copied()), KpiSet::default());
        assert!(no_show_by_age_group(out.iter().copied()).is_empty());
        assert_eq!(refill_split(out.iter().copied()), RefillSplit::default());
    }

    // ── summarize ─────────────────────────────────────────────────────────────

    #[test]
    fn test_summarize_empty_is_zero() {
        let kpis = summarize(&Vec::<PatientRecord>::new());
        assert_eq!(kpis, KpiSet::default());
    }

    #[test]
    fn test_summarize_known_set() {
        let data = vec![
            PatientRecord { login_count: 4, ..record("P-0001") },
            PatientRecord {
                login_count: 6,
                secure_messages: 4,
                appointments_scheduled: 4,
                appointments_missed: 1,
                avg_session_minutes: 20.0,
                ..record("P-0002")
            },
        ];

        let kpis = summarize(&data);
        assert_eq!(kpis.avg_logins, 5.0);
        assert_eq!(kpis.avg_messages, 3.0);
        // (0.0 + 25.0) / 2
        assert_eq!(kpis.avg_no_show_rate, 12.5);
        assert_eq!(kpis.avg_session_minutes, 15.0);
    }

    // ── group_by ──────────────────────────────────────────────────────────────

    #[test]
    fn test_group_by_merges_same_key() {
        let data = vec![
            PatientRecord {
                age_group: AgeGroup::From18To30,
                appointments_scheduled: 10,
                appointments_missed: 1,
                ..record("P-0001")
            },
            PatientRecord {
                age_group: AgeGroup::From18To30,
                appointments_scheduled: 10,
                appointments_missed: 2,
                ..record("P-0002")
            },
        ];

        let groups = no_show_by_age_group(&data);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].key, AgeGroup::From18To30);
        assert_eq!(groups[0].average, 15.0);
        assert_eq!(groups[0].count, 2);
    }

    /// Categorical keys come out in lexicographic label order, regardless of
    /// insertion order.
    #[test]
    fn test_group_by_sorted_by_label() {
        let data = vec![
            PatientRecord { device_type: DeviceType::Tablet, ..record("P-0001") },
            PatientRecord { device_type: DeviceType::Mobile, ..record("P-0002") },
            PatientRecord { device_type: DeviceType::Desktop, ..record("P-0003") },
            PatientRecord { device_type: DeviceType::Mobile, ..record("P-0004") },
        ];

        let labels: Vec<&str> = messages_by_device(&data)
            .iter()
            .map(|g| g.key.as_str())
            .collect();
        assert_eq!(labels, vec!["Desktop", "Mobile", "Tablet"]);

        let groups = vec![
            PatientRecord { age_group: AgeGroup::Over60, ..record("P-0005") },
            PatientRecord { age_group: AgeGroup::From46To60, ..record("P-0006") },
            PatientRecord { age_group: AgeGroup::From18To30, ..record("P-0007") },
        ];
        let labels: Vec<&str> = no_show_by_age_group(&groups)
            .iter()
            .map(|g| g.key.as_str())
            .collect();
        let mut sorted = labels.clone();
        sorted.sort();
        assert_eq!(labels, sorted);
    }

    #[test]
    fn test_weekly_groups_are_chronological() {
        let data = vec![
            PatientRecord { week_date: week(30), avg_session_minutes: 30.0, ..record("P-0001") },
            PatientRecord { week_date: week(2), avg_session_minutes: 10.0, ..record("P-0002") },
            PatientRecord { week_date: week(30), avg_session_minutes: 20.0, ..record("P-0003") },
            PatientRecord { week_date: week(11), avg_session_minutes: 5.0, ..record("P-0004") },
        ];

        let groups = session_minutes_by_week(&data);
        let keys: Vec<NaiveDate> = groups.iter().map(|g| g.key).collect();
        assert_eq!(keys, vec![week(2), week(11), week(30)]);
        assert_eq!(groups[2].average, 25.0);
        assert!(groups.windows(2).all(|w| w[0].key < w[1].key));
        assert!(groups.iter().all(|g| g.count > 0));
    }

    #[test]
    fn test_logins_by_week() {
        let data = vec![
            PatientRecord { login_count: 3, ..record("P-0001") },
            PatientRecord { login_count: 9, ..record("P-0002") },
        ];
        let groups = logins_by_week(&data);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].average, 6.0);
    }

    #[test]
    fn test_grouping_is_idempotent() {
        let data = mixed_dataset();
        assert_eq!(no_show_by_age_group(&data), no_show_by_age_group(&data));
        assert_eq!(summarize(&data), summarize(&data));
    }

    // ── refills ───────────────────────────────────────────────────────────────

    #[test]
    fn test_refill_split_never_negative() {
        let data = vec![
            PatientRecord { refill_requests: 5, appointments_scheduled: 1, ..record("P-0001") },
            PatientRecord { refill_requests: 0, appointments_scheduled: 2, ..record("P-0002") },
        ];
        let split = refill_split(&data);
        assert_eq!(split.refills, 5);
        assert_eq!(split.other_appointments, 0);
    }

    // ── options and search ────────────────────────────────────────────────────

    #[test]
    fn test_filter_options_use_present_values() {
        let options = filter_options(&mixed_dataset());
        assert_eq!(
            options.age_groups,
            vec![AgeGroup::From18To30, AgeGroup::From31To45, AgeGroup::Over60]
        );
        assert_eq!(options.device_types, vec![DeviceType::Mobile, DeviceType::Tablet]);
        assert_eq!(options.genders.len(), 3);
        assert_eq!(
            options.choices(FilterField::DeviceType),
            vec!["all", "Mobile", "Tablet"]
        );
    }

    #[test]
    fn test_search_dedupes_and_limits() {
        let mut data: Vec<PatientRecord> = (1..=15).map(|i| record(&format!("P-{i:04}"))).collect();
        // Second week for P-0001 must not produce a second hit.
        data.push(PatientRecord { week_date: week(5), ..record("P-0001") });

        let hits = search_patients(&data, "", SEARCH_LIMIT);
        assert_eq!(hits.len(), SEARCH_LIMIT);
        assert_eq!(hits[0].patient_id, "P-0001");

        let hits = search_patients(&data, "p-0001", SEARCH_LIMIT);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].week_date, week(0));
    }

    #[test]
    fn test_search_matches_name_case_insensitively() {
        let data = vec![
            PatientRecord { patient_name: "Emily Garcia".to_string(), ..record("P-0001") },
            PatientRecord { patient_name: "John Smith".to_string(), ..record("P-0002") },
        ];
        let hits = search_patients(&data, "GARC", SEARCH_LIMIT);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].patient_id, "P-0001");
        assert!(search_patients(&data, "zzz", SEARCH_LIMIT).is_empty());
    }
}
