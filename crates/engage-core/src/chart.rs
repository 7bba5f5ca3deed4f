//! Chart series built from a filtered record set.
//!
//! Each `ChartId` maps to exactly one grouping in [`crate::pipeline`]. The
//! match in [`build_chart`] is exhaustive, so a new chart cannot be added
//! without deciding how its series is computed.

use chrono::NaiveDate;
use serde::Serialize;

use engage_contracts::{
    access::ChartId,
    analytics::{round_tenth, GroupAverage, RefillSplit},
    record::{AgeGroup, DeviceType, PatientRecord},
};

use crate::pipeline;

/// Series data for one chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ChartSeries {
    ByAgeGroup(Vec<GroupAverage<AgeGroup>>),
    ByDevice(Vec<GroupAverage<DeviceType>>),
    Weekly(Vec<GroupAverage<NaiveDate>>),
    Refills(RefillSplit),
}

impl ChartSeries {
    /// `(label, value)` pairs ready to draw, values rounded to one decimal.
    ///
    /// Week labels use the short `Jan 8` form.
    pub fn points(&self) -> Vec<(String, f64)> {
        match self {
            ChartSeries::ByAgeGroup(groups) => groups
                .iter()
                .map(|g| (g.key.to_string(), round_tenth(g.average)))
                .collect(),
            ChartSeries::ByDevice(groups) => groups
                .iter()
                .map(|g| (g.key.to_string(), round_tenth(g.average)))
                .collect(),
            ChartSeries::Weekly(groups) => groups
                .iter()
                .map(|g| (g.key.format("%b %-d").to_string(), round_tenth(g.average)))
                .collect(),
            ChartSeries::Refills(split) => vec![
                ("Prescription Refills".to_string(), split.refills as f64),
                ("Other Appointments".to_string(), split.other_appointments as f64),
            ],
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            ChartSeries::ByAgeGroup(groups) => groups.is_empty(),
            ChartSeries::ByDevice(groups) => groups.is_empty(),
            ChartSeries::Weekly(groups) => groups.is_empty(),
            ChartSeries::Refills(split) => split.refills == 0 && split.other_appointments == 0,
        }
    }
}

/// A chart ready for the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    pub id: ChartId,
    pub series: ChartSeries,
}

impl Chart {
    pub fn title(&self) -> &'static str {
        self.id.title()
    }

    pub fn description(&self) -> &'static str {
        self.id.description()
    }
}

/// Compute the series for `id` over `records`.
pub fn build_chart(id: ChartId, records: &[&PatientRecord]) -> Chart {
    let rs = records.iter().copied();
    let series = match id {
        ChartId::LoginActivity => ChartSeries::Weekly(pipeline::logins_by_week(rs)),
        ChartId::NoShowRate => ChartSeries::ByAgeGroup(pipeline::no_show_by_age_group(rs)),
        ChartId::SecureMessages => ChartSeries::ByDevice(pipeline::messages_by_device(rs)),
        ChartId::Refills => ChartSeries::Refills(pipeline::refill_split(rs)),
        ChartId::SessionDuration => ChartSeries::Weekly(pipeline::session_minutes_by_week(rs)),
    };
    Chart { id, series }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use engage_contracts::record::{ChronicCondition, Gender, InsuranceType};

    use super::*;

    fn record(id: &str, week: NaiveDate, device: DeviceType) -> PatientRecord {
        PatientRecord {
            patient_id: id.to_string(),
            patient_name: format!("Patient {id}"),
            age: 50,
            gender: Gender::Female,
            age_group: AgeGroup::From46To60,
            device_type: device,
            state: "NY".to_string(),
            city: "Buffalo".to_string(),
            insurance_type: InsuranceType::Medicaid,
            chronic_condition: ChronicCondition::Asthma,
            enrollment_date: NaiveDate::from_ymd_opt(2024, 5, 3).unwrap(),
            week_date: week,
            login_count: 7,
            secure_messages: 3,
            refill_requests: 2,
            appointments_scheduled: 3,
            appointments_missed: 1,
            avg_session_minutes: 12.25,
            satisfaction_score: 3.1,
        }
    }

    #[test]
    fn test_weekly_labels_use_short_month_form() {
        let week = NaiveDate::from_ymd_opt(2024, 1, 8).unwrap();
        let records = [record("P-0001", week, DeviceType::Mobile)];
        let refs: Vec<&PatientRecord> = records.iter().collect();

        let chart = build_chart(ChartId::SessionDuration, &refs);
        assert_eq!(chart.series.points(), vec![("Jan 8".to_string(), 12.3)]);
        assert_eq!(chart.title(), ChartId::SessionDuration.title());
    }

    #[test]
    fn test_refill_points_are_labelled() {
        let week = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let records = [
            record("P-0001", week, DeviceType::Mobile),
            record("P-0002", week, DeviceType::Tablet),
        ];
        let refs: Vec<&PatientRecord> = records.iter().collect();

        let points = build_chart(ChartId::Refills, &refs).series.points();
        assert_eq!(
            points,
            vec![
                ("Prescription Refills".to_string(), 4.0),
                ("Other Appointments".to_string(), 2.0),
            ]
        );
    }

    #[test]
    fn test_empty_records_give_empty_series() {
        for id in ChartId::ALL {
            assert!(build_chart(id, &[]).series.is_empty(), "{id:?} not empty");
        }
    }

    #[test]
    fn test_device_chart_sorted_by_label() {
        let week = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let records = [
            record("P-0001", week, DeviceType::Tablet),
            record("P-0002", week, DeviceType::Desktop),
            record("P-0003", week, DeviceType::Mobile),
        ];
        let refs: Vec<&PatientRecord> = records.iter().collect();

        let labels: Vec<String> = build_chart(ChartId::SecureMessages, &refs)
            .series
            .points()
            .into_iter()
            .map(|(label, _)| label)
            .collect();
        assert_eq!(labels, vec!["Desktop", "Mobile", "Tablet"]);
    }
}
