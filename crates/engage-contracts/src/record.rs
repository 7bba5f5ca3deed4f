//! Patient engagement records and their categorical domains.
//!
//! A `PatientRecord` is one synthetic patient-week. It stores only sampled
//! fields; the no-show rate and engagement level are always recomputed from
//! their inputs so the two can never drift apart.

use std::{fmt, ops::RangeInclusive, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    analytics::round_tenth,
    error::{EngageError, EngageResult},
};

// ── Age group ─────────────────────────────────────────────────────────────────

/// Coarse demographic age bin.
///
/// Variants are declared in ascending label order, so the derived `Ord`
/// matches lexicographic ordering of the labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AgeGroup {
    #[serde(rename = "18-30")]
    From18To30,
    #[serde(rename = "31-45")]
    From31To45,
    #[serde(rename = "46-60")]
    From46To60,
    #[serde(rename = "60+")]
    Over60,
}

impl AgeGroup {
    pub const ALL: [AgeGroup; 4] = [
        AgeGroup::From18To30,
        AgeGroup::From31To45,
        AgeGroup::From46To60,
        AgeGroup::Over60,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AgeGroup::From18To30 => "18-30",
            AgeGroup::From31To45 => "31-45",
            AgeGroup::From46To60 => "46-60",
            AgeGroup::Over60 => "60+",
        }
    }

    /// Ages a member of this group may have. `60+` is capped at 85.
    pub fn age_range(self) -> RangeInclusive<u32> {
        match self {
            AgeGroup::From18To30 => 18..=30,
            AgeGroup::From31To45 => 31..=45,
            AgeGroup::From46To60 => 46..=60,
            AgeGroup::Over60 => 61..=85,
        }
    }

    /// The group an age belongs to, or `None` for minors.
    pub fn for_age(age: u32) -> Option<AgeGroup> {
        match age {
            0..=17 => None,
            18..=30 => Some(AgeGroup::From18To30),
            31..=45 => Some(AgeGroup::From31To45),
            46..=60 => Some(AgeGroup::From46To60),
            _ => Some(AgeGroup::Over60),
        }
    }
}

impl fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgeGroup {
    type Err = EngageError;

    fn from_str(s: &str) -> EngageResult<Self> {
        AgeGroup::ALL
            .into_iter()
            .find(|g| g.as_str() == s)
            .ok_or_else(|| invalid("ageGroup", s))
    }
}

// ── Gender ────────────────────────────────────────────────────────────────────

/// Deserializes through [`FromStr`], so dataset files may use any casing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Gender {
    Female,
    Male,
    Other,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Other];

    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Female => "Female",
            Gender::Male => "Male",
            Gender::Other => "Other",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Gender parses case-insensitively; `"female"` and `"FEMALE"` are both `Female`.
impl FromStr for Gender {
    type Err = EngageError;

    fn from_str(s: &str) -> EngageResult<Self> {
        Gender::ALL
            .into_iter()
            .find(|g| g.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| invalid("gender", s))
    }
}

impl<'de> Deserialize<'de> for Gender {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        label.parse().map_err(serde::de::Error::custom)
    }
}

// ── Device type ───────────────────────────────────────────────────────────────

/// Device used to reach the portal. Declared alphabetically so the derived
/// `Ord` sorts chart axes the same way the labels would.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DeviceType {
    Desktop,
    Mobile,
    Tablet,
}

impl DeviceType {
    pub const ALL: [DeviceType; 3] = [DeviceType::Mobile, DeviceType::Desktop, DeviceType::Tablet];

    pub fn as_str(self) -> &'static str {
        match self {
            DeviceType::Desktop => "Desktop",
            DeviceType::Mobile => "Mobile",
            DeviceType::Tablet => "Tablet",
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceType {
    type Err = EngageError;

    fn from_str(s: &str) -> EngageResult<Self> {
        DeviceType::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| invalid("deviceType", s))
    }
}

// ── Insurance and chronic condition ───────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InsuranceType {
    Medicare,
    Medicaid,
    Private,
    #[serde(rename = "Self-Pay")]
    SelfPay,
}

impl InsuranceType {
    pub const ALL: [InsuranceType; 4] = [
        InsuranceType::Medicare,
        InsuranceType::Medicaid,
        InsuranceType::Private,
        InsuranceType::SelfPay,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            InsuranceType::Medicare => "Medicare",
            InsuranceType::Medicaid => "Medicaid",
            InsuranceType::Private => "Private",
            InsuranceType::SelfPay => "Self-Pay",
        }
    }
}

impl fmt::Display for InsuranceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Chronic condition on file. `NoCondition` serializes as `"None"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChronicCondition {
    #[serde(rename = "None")]
    NoCondition,
    Diabetes,
    Hypertension,
    Asthma,
    #[serde(rename = "Heart Disease")]
    HeartDisease,
    #[serde(rename = "COPD")]
    Copd,
}

impl ChronicCondition {
    pub const ALL: [ChronicCondition; 6] = [
        ChronicCondition::NoCondition,
        ChronicCondition::Diabetes,
        ChronicCondition::Hypertension,
        ChronicCondition::Asthma,
        ChronicCondition::HeartDisease,
        ChronicCondition::Copd,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ChronicCondition::NoCondition => "None",
            ChronicCondition::Diabetes => "Diabetes",
            ChronicCondition::Hypertension => "Hypertension",
            ChronicCondition::Asthma => "Asthma",
            ChronicCondition::HeartDisease => "Heart Disease",
            ChronicCondition::Copd => "COPD",
        }
    }
}

impl fmt::Display for ChronicCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Engagement level ──────────────────────────────────────────────────────────

/// Tri-state classification derived from weekly login count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EngagementLevel {
    Low,
    Medium,
    High,
}

impl EngagementLevel {
    pub const ALL: [EngagementLevel; 3] = [
        EngagementLevel::Low,
        EngagementLevel::Medium,
        EngagementLevel::High,
    ];

    /// `High` above 10 logins, `Medium` above 5, otherwise `Low`.
    pub fn from_login_count(login_count: u32) -> Self {
        if login_count > 10 {
            EngagementLevel::High
        } else if login_count > 5 {
            EngagementLevel::Medium
        } else {
            EngagementLevel::Low
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EngagementLevel::Low => "Low",
            EngagementLevel::Medium => "Medium",
            EngagementLevel::High => "High",
        }
    }
}

impl fmt::Display for EngagementLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn invalid(field: &str, value: &str) -> EngageError {
    EngageError::InvalidFilter {
        field: field.to_string(),
        value: value.to_string(),
    }
}

// ── Patient record ────────────────────────────────────────────────────────────

/// One patient-week of portal engagement. Immutable once built.
///
/// The JSON form carries `no_show_rate` and `engagement_level` for
/// compatibility with existing dataset files. They are written from the
/// computed values and ignored when read back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "PatientRecordJson", into = "PatientRecordJson")]
pub struct PatientRecord {
    /// Stable per patient, e.g. `P-0042`.
    pub patient_id: String,
    pub patient_name: String,
    pub age: u32,
    pub gender: Gender,
    pub age_group: AgeGroup,
    pub device_type: DeviceType,
    /// Two-letter state code.
    pub state: String,
    /// Always one of the cities listed for `state` in [`crate::geography`].
    pub city: String,
    pub insurance_type: InsuranceType,
    pub chronic_condition: ChronicCondition,
    pub enrollment_date: NaiveDate,
    pub week_date: NaiveDate,
    pub login_count: u32,
    pub secure_messages: u32,
    pub refill_requests: u32,
    pub appointments_scheduled: u32,
    /// Never more than `min(2, appointments_scheduled)` in generated data.
    pub appointments_missed: u32,
    pub avg_session_minutes: f64,
    pub satisfaction_score: f64,
}

impl PatientRecord {
    /// Percentage of scheduled appointments missed, rounded to one decimal.
    ///
    /// Zero when nothing was scheduled.
    pub fn no_show_rate(&self) -> f64 {
        if self.appointments_scheduled == 0 {
            return 0.0;
        }
        round_tenth(
            f64::from(self.appointments_missed) / f64::from(self.appointments_scheduled) * 100.0,
        )
    }

    pub fn engagement_level(&self) -> EngagementLevel {
        EngagementLevel::from_login_count(self.login_count)
    }
}

/// Serialized shape of a record: the sampled fields plus the two derived ones.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PatientRecordJson {
    patient_id: String,
    patient_name: String,
    age: u32,
    gender: Gender,
    device_type: DeviceType,
    state: String,
    city: String,
    insurance_type: InsuranceType,
    chronic_condition: ChronicCondition,
    enrollment_date: NaiveDate,
    week_date: NaiveDate,
    login_count: u32,
    secure_messages: u32,
    refill_requests: u32,
    appointments_scheduled: u32,
    appointments_missed: u32,
    avg_session_minutes: f64,
    satisfaction_score: f64,
    #[serde(default)]
    no_show_rate: Option<f64>,
    age_group: AgeGroup,
    #[serde(default)]
    engagement_level: Option<EngagementLevel>,
}

impl From<PatientRecordJson> for PatientRecord {
    fn from(j: PatientRecordJson) -> Self {
        Self {
            patient_id: j.patient_id,
            patient_name: j.patient_name,
            age: j.age,
            gender: j.gender,
            age_group: j.age_group,
            device_type: j.device_type,
            state: j.state,
            city: j.city,
            insurance_type: j.insurance_type,
            chronic_condition: j.chronic_condition,
            enrollment_date: j.enrollment_date,
            week_date: j.week_date,
            login_count: j.login_count,
            secure_messages: j.secure_messages,
            refill_requests: j.refill_requests,
            appointments_scheduled: j.appointments_scheduled,
            appointments_missed: j.appointments_missed,
            avg_session_minutes: j.avg_session_minutes,
            satisfaction_score: j.satisfaction_score,
        }
    }
}

impl From<PatientRecord> for PatientRecordJson {
    fn from(r: PatientRecord) -> Self {
        let no_show_rate = Some(r.no_show_rate());
        let engagement_level = Some(r.engagement_level());
        Self {
            patient_id: r.patient_id,
            patient_name: r.patient_name,
            age: r.age,
            gender: r.gender,
            device_type: r.device_type,
            state: r.state,
            city: r.city,
            insurance_type: r.insurance_type,
            chronic_condition: r.chronic_condition,
            enrollment_date: r.enrollment_date,
            week_date: r.week_date,
            login_count: r.login_count,
            secure_messages: r.secure_messages,
            refill_requests: r.refill_requests,
            appointments_scheduled: r.appointments_scheduled,
            appointments_missed: r.appointments_missed,
            avg_session_minutes: r.avg_session_minutes,
            satisfaction_score: r.satisfaction_score,
            no_show_rate,
            age_group: r.age_group,
            engagement_level,
        }
    }
}
