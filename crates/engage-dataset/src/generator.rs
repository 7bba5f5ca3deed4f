//! Synthetic patient-engagement records.
//!
//! Every record is sampled independently. Categorical fields are drawn
//! uniformly from their domains and numeric fields from their documented
//! ranges. Fields that depend on each other are sampled in dependency order:
//! age after age group, city after state, missed after scheduled appointments.
//! `no_show_rate` and `engagement_level` are never sampled; they are computed
//! by `PatientRecord` on demand.

use chrono::{Duration, NaiveDate};
use rand::Rng;

use engage_contracts::{
    analytics::round_tenth,
    geography::STATE_CITIES,
    record::{AgeGroup, ChronicCondition, DeviceType, Gender, InsuranceType, PatientRecord},
};

/// Number of weekly dates records are spread over.
pub const WEEKS: usize = 52;

/// Missed appointments are capped here regardless of the scheduled count.
pub const MISSED_CAP: u32 = 2;

const FIRST_NAMES: [&str; 15] = [
    "Sarah", "John", "Emily", "Michael", "Jessica", "David", "Ashley", "James", "Amanda",
    "Robert", "Jennifer", "William", "Lisa", "Richard", "Mary",
];

const LAST_NAMES: [&str; 15] = [
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Rodriguez",
    "Martinez", "Hernandez", "Lopez", "Gonzalez", "Wilson", "Anderson",
];

/// Monday 2024-01-01, the first week date.
pub fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default()
}

/// The 52 consecutive weekly dates records are assigned to.
pub fn week_dates() -> Vec<NaiveDate> {
    let start = epoch();
    (0..WEEKS as i64).map(|i| start + Duration::weeks(i)).collect()
}

fn pick<T: Copy, R: Rng + ?Sized>(rng: &mut R, items: &[T]) -> T {
    items[rng.gen_range(0..items.len())]
}

/// `P-0001`, `P-0002`, ... for a 1-based sequence number.
pub fn patient_id(sequence: usize) -> String {
    format!("P-{:04}", sequence)
}

/// Generate `count` records with the thread-local RNG.
pub fn generate(count: usize) -> Vec<PatientRecord> {
    generate_with_rng(count, &mut rand::thread_rng())
}

/// Generate `count` records from `rng`. A seeded RNG gives a reproducible set.
pub fn generate_with_rng<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<PatientRecord> {
    let weeks = week_dates();
    (1..=count).map(|seq| generate_record(seq, &weeks, rng)).collect()
}

fn generate_record<R: Rng + ?Sized>(seq: usize, weeks: &[NaiveDate], rng: &mut R) -> PatientRecord {
    let patient_name = format!("{} {}", pick(rng, &FIRST_NAMES), pick(rng, &LAST_NAMES));

    let age_group = pick(rng, &AgeGroup::ALL);
    let age = rng.gen_range(age_group.age_range());

    let (state, cities) = pick(rng, &STATE_CITIES);
    let city = pick(rng, &cities);

    let enrollment_date = NaiveDate::from_ymd_opt(2024, rng.gen_range(1..=12), rng.gen_range(1..=28))
        .unwrap_or_else(epoch);

    let appointments_scheduled = rng.gen_range(0..=4);
    let appointments_missed = rng.gen_range(0..=MISSED_CAP.min(appointments_scheduled));

    PatientRecord {
        patient_id: patient_id(seq),
        patient_name,
        age,
        gender: pick(rng, &Gender::ALL),
        age_group,
        device_type: pick(rng, &DeviceType::ALL),
        state: state.to_string(),
        city: city.to_string(),
        insurance_type: pick(rng, &InsuranceType::ALL),
        chronic_condition: pick(rng, &ChronicCondition::ALL),
        enrollment_date,
        week_date: pick(rng, weeks),
        login_count: rng.gen_range(0..=15),
        secure_messages: rng.gen_range(0..=10),
        refill_requests: rng.gen_range(0..=5),
        appointments_scheduled,
        appointments_missed,
        avg_session_minutes: round_tenth(rng.gen_range(2.0..=45.0)),
        satisfaction_score: round_tenth(rng.gen_range(1.0..=5.0)),
    }
}

/// A four-week login series around `login_count` for the patient detail view.
///
/// Each week is `login_count` plus a uniform offset in `-2..=1`, floored at 0.
pub fn simulate_weekly_logins<R: Rng + ?Sized>(login_count: u32, rng: &mut R) -> [u32; 4] {
    std::array::from_fn(|_| {
        let offset: i64 = rng.gen_range(-2..=1);
        (i64::from(login_count) + offset).max(0) as u32
    })
}
