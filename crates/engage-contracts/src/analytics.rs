//! Aggregate value types produced by the filter/aggregation pipeline.
//!
//! These are plain results: they have no identity of their own and are
//! recomputed whenever the dataset or the filter state changes.

use serde::{Deserialize, Serialize};

/// Round to one decimal place, the precision every figure is displayed at.
pub fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// The four headline KPIs over a (filtered) record set.
///
/// Values are unrounded means; call [`KpiSet::rounded`] for display. An empty
/// record set yields all zeros.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiSet {
    pub avg_logins: f64,
    pub avg_messages: f64,
    pub avg_no_show_rate: f64,
    pub avg_session_minutes: f64,
}

impl KpiSet {
    pub fn rounded(&self) -> KpiSet {
        KpiSet {
            avg_logins: round_tenth(self.avg_logins),
            avg_messages: round_tenth(self.avg_messages),
            avg_no_show_rate: round_tenth(self.avg_no_show_rate),
            avg_session_minutes: round_tenth(self.avg_session_minutes),
        }
    }
}

/// Running `{total, count}` pair for one aggregation key.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bucket {
    pub total: f64,
    pub count: usize,
}

impl Bucket {
    pub fn add(&mut self, value: f64) {
        self.total += value;
        self.count += 1;
    }

    /// Mean of the values added so far; `None` for an empty bucket.
    pub fn average(&self) -> Option<f64> {
        (self.count > 0).then(|| self.total / self.count as f64)
    }
}

/// One finished group: its key and the (unrounded) mean of its members.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupAverage<K> {
    pub key: K,
    pub average: f64,
    pub count: usize,
}

/// Prescription refills against the remaining scheduled appointments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefillSplit {
    pub refills: u64,
    /// `max(0, total appointments - refills)`.
    pub other_appointments: u64,
}

impl RefillSplit {
    /// Share of the split taken by refills, in percent. Zero when both are zero.
    pub fn refill_share(&self) -> f64 {
        let total = self.refills + self.other_appointments;
        if total == 0 {
            0.0
        } else {
            self.refills as f64 / total as f64 * 100.0
        }
    }
}
