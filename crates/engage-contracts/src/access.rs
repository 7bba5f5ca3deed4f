//! View identifiers and access verdicts.
//!
//! The access policy consumes an `AccessContext` and produces an
//! `AccessVerdict`. Anything other than `Allow` means the view is rendered in
//! its restricted form; it is never an error.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::session::Role;

/// The five dashboard charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChartId {
    LoginActivity,
    NoShowRate,
    SecureMessages,
    Refills,
    SessionDuration,
}

impl ChartId {
    /// Display order on the dashboard.
    pub const ALL: [ChartId; 5] = [
        ChartId::LoginActivity,
        ChartId::NoShowRate,
        ChartId::SecureMessages,
        ChartId::Refills,
        ChartId::SessionDuration,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            ChartId::LoginActivity => "login-activity",
            ChartId::NoShowRate => "no-show-rate",
            ChartId::SecureMessages => "secure-messages",
            ChartId::Refills => "refills",
            ChartId::SessionDuration => "session-duration",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ChartId::LoginActivity => "Login Activity",
            ChartId::NoShowRate => "Appointment No-Show Rate",
            ChartId::SecureMessages => "Secure Messages",
            ChartId::Refills => "Prescription Refills",
            ChartId::SessionDuration => "Session Duration Trend",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ChartId::LoginActivity => "Average logins per week over time",
            ChartId::NoShowRate => "No-show rate by age group",
            ChartId::SecureMessages => "Messages grouped by device type",
            ChartId::Refills => "Ratio of refills vs total appointments",
            ChartId::SessionDuration => "Average session minutes over time",
        }
    }
}

/// Anything on the dashboard that access policy can gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViewId {
    Chart(ChartId),
    PatientSearch,
    PatientDetail,
}

impl ViewId {
    /// Resource string matched by policy rules, e.g. `chart:refills`.
    pub fn resource(&self) -> String {
        match self {
            ViewId::Chart(chart) => format!("chart:{}", chart.slug()),
            ViewId::PatientSearch => "patient-search".to_string(),
            ViewId::PatientDetail => "patient-detail".to_string(),
        }
    }

    /// Inverse of [`ViewId::resource`].
    pub fn from_resource(resource: &str) -> Option<Self> {
        match resource {
            "patient-search" => Some(ViewId::PatientSearch),
            "patient-detail" => Some(ViewId::PatientDetail),
            _ => {
                let slug = resource.strip_prefix("chart:")?;
                ChartId::ALL
                    .into_iter()
                    .find(|c| c.slug() == slug)
                    .map(ViewId::Chart)
            }
        }
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.resource())
    }
}

/// Everything the access policy needs to decide on one view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessContext {
    pub username: String,
    pub role: Role,
    /// Output of [`ViewId::resource`].
    pub view: String,
}

/// Decision for a single view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessVerdict {
    Allow,
    /// Render the locked placeholder instead of the view.
    Restrict { reason: String },
}

impl AccessVerdict {
    pub fn is_allowed(&self) -> bool {
        matches!(self, AccessVerdict::Allow)
    }
}
