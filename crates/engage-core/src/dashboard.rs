//! The dashboard state machine.
//!
//!   Unauthenticated ──login──▶ Authenticated ──select_patient──▶ ViewingPatient
//!          ▲                        │   ▲                             │
//!          └────────logout──────────┘   └──────back_to_overview───────┘
//!
//! `ViewingPatient` is only reachable by a role that may drill down (admin).
//! Every screen is composed on demand from (dataset, filters, session), and
//! access policy is evaluated for every gated view at composition time, so a
//! restricted role never receives admin-only aggregates, even transiently.

use serde::Serialize;
use tracing::{debug, info, warn};

use engage_contracts::{
    access::{AccessContext, AccessVerdict, ChartId, ViewId},
    analytics::KpiSet,
    error::{EngageError, EngageResult},
    filter::{FilterField, FilterState},
    record::{EngagementLevel, PatientRecord},
    session::{Role, UserSession},
};

use crate::{
    chart::{build_chart, Chart},
    pipeline::{self, FilterOptions, SEARCH_LIMIT},
    traits::{AccessPolicy, Authenticator, SessionStore},
};

// ── States and outcomes ───────────────────────────────────────────────────────

/// Where the user currently is.
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardState {
    Unauthenticated,
    Authenticated { session: UserSession },
    /// `record_index` points into the dataset at the record that was
    /// selected, so a multi-week patient shows the week that was picked.
    ViewingPatient {
        session: UserSession,
        patient_id: String,
        record_index: usize,
    },
}

impl DashboardState {
    pub fn session(&self) -> Option<&UserSession> {
        match self {
            DashboardState::Unauthenticated => None,
            DashboardState::Authenticated { session }
            | DashboardState::ViewingPatient { session, .. } => Some(session),
        }
    }
}

/// Result of a login attempt. A rejection is not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum LoginOutcome {
    SignedIn(UserSession),
    Rejected { reason: String },
}

/// Result of asking for the patient drill-down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewOutcome {
    Opened,
    /// The role may not drill down; the user stays on the overview.
    Restricted { reason: String },
    NotFound,
}

/// Satisfaction score bucket shown on the patient detail view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SatisfactionBand {
    Good,
    Fair,
    Poor,
}

impl SatisfactionBand {
    /// `>= 4` good, `>= 3` fair, anything lower poor.
    pub fn for_score(score: f64) -> Self {
        if score >= 4.0 {
            SatisfactionBand::Good
        } else if score >= 3.0 {
            SatisfactionBand::Fair
        } else {
            SatisfactionBand::Poor
        }
    }
}

/// A gated view the current role cannot see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LockedView {
    pub view: String,
    pub reason: String,
}

/// Everything the overview screen shows.
#[derive(Debug, Clone, Serialize)]
pub struct Overview {
    pub session: UserSession,
    pub filters: FilterState,
    pub total_records: usize,
    pub filtered_records: usize,
    pub kpis: KpiSet,
    /// Only the charts the role may see, in display order.
    pub charts: Vec<Chart>,
    pub locked: Vec<LockedView>,
    pub patient_search_enabled: bool,
}

/// The admin drill-down for a single patient.
#[derive(Debug, Clone, Serialize)]
pub struct PatientDetail {
    pub session: UserSession,
    pub record: PatientRecord,
    pub engagement_level: EngagementLevel,
    pub no_show_rate: f64,
    pub satisfaction: SatisfactionBand,
    /// Satisfaction as a percentage of the 5-point maximum.
    pub satisfaction_percent: f64,
}

/// The screen to render for the current state.
#[derive(Debug, Clone)]
pub enum Screen {
    Login,
    Overview(Box<Overview>),
    Patient(Box<PatientDetail>),
}

/// Whether a role may ever hold the `ViewingPatient` state.
///
/// Checked in addition to access policy, so a permissive policy file cannot
/// open the drill-down to a role the state machine does not allow.
fn role_may_drill_down(role: Role) -> bool {
    match role {
        Role::Admin => true,
        Role::User => false,
    }
}

// ── Dashboard ─────────────────────────────────────────────────────────────────

/// One dashboard session over a loaded dataset.
///
/// The dataset is owned exclusively and never mutated after construction.
/// Filters and every derived figure are recomputed from it on demand.
pub struct Dashboard {
    dataset: Vec<PatientRecord>,
    filters: FilterState,
    state: DashboardState,
    authenticator: Box<dyn Authenticator>,
    access: Box<dyn AccessPolicy>,
    sessions: Box<dyn SessionStore>,
}

impl Dashboard {
    /// Build a dashboard and restore any stored session.
    ///
    /// A stored session puts the dashboard straight into `Authenticated`;
    /// otherwise it starts `Unauthenticated` and the login screen is shown.
    pub fn new(
        dataset: Vec<PatientRecord>,
        authenticator: Box<dyn Authenticator>,
        access: Box<dyn AccessPolicy>,
        sessions: Box<dyn SessionStore>,
    ) -> EngageResult<Self> {
        let state = match sessions.load()? {
            Some(session) => {
                info!(
                    session_id = %session.session_id,
                    username = %session.username,
                    role = %session.role,
                    "restored stored session"
                );
                DashboardState::Authenticated { session }
            }
            None => DashboardState::Unauthenticated,
        };

        debug!(records = dataset.len(), "dashboard initialised");

        Ok(Self {
            dataset,
            filters: FilterState::default(),
            state,
            authenticator,
            access,
            sessions,
        })
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn session(&self) -> Option<&UserSession> {
        self.state.session()
    }

    pub fn dataset(&self) -> &[PatientRecord] {
        &self.dataset
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn filter_options(&self) -> FilterOptions {
        pipeline::filter_options(&self.dataset)
    }

    pub fn filtered(&self) -> Vec<&PatientRecord> {
        pipeline::filter(&self.dataset, &self.filters)
    }

    // ── Filter actions ────────────────────────────────────────────────────────

    pub fn set_filter(&mut self, field: FilterField, value: &str) -> EngageResult<()> {
        self.filters.set(field, value)?;
        debug!(field = %field, value, "filter changed");
        Ok(())
    }

    pub fn clear_filter(&mut self, field: FilterField) {
        self.filters.clear(field);
    }

    pub fn reset_filters(&mut self) {
        self.filters.reset();
    }

    // ── Transitions ───────────────────────────────────────────────────────────

    /// Unauthenticated → Authenticated.
    ///
    /// Wrong credentials return `LoginOutcome::Rejected` and leave the state
    /// unchanged. Logging in while already signed in is an illegal transition.
    pub fn login(&mut self, username: &str, password: &str) -> EngageResult<LoginOutcome> {
        if let Some(current) = self.session() {
            return Err(EngageError::StateMachineError {
                reason: format!(
                    "already signed in as '{}'; log out before signing in again",
                    current.username
                ),
            });
        }

        let Some(session) = self.authenticator.authenticate(username, password) else {
            warn!(username, "login rejected");
            return Ok(LoginOutcome::Rejected {
                reason: "Invalid username or password".to_string(),
            });
        };

        self.sessions.save(&session)?;
        info!(
            session_id = %session.session_id,
            username = %session.username,
            role = %session.role,
            "signed in"
        );
        self.state = DashboardState::Authenticated {
            session: session.clone(),
        };
        Ok(LoginOutcome::SignedIn(session))
    }

    /// Any state → Unauthenticated. Clears the stored session.
    pub fn logout(&mut self) -> EngageResult<()> {
        if let Some(session) = self.session() {
            info!(session_id = %session.session_id, username = %session.username, "signed out");
        }
        self.sessions.clear()?;
        self.state = DashboardState::Unauthenticated;
        Ok(())
    }

    /// Authenticated → ViewingPatient, for roles that may drill down.
    ///
    /// A restricted role stays on the overview and gets
    /// `ViewOutcome::Restricted`. Selecting another patient while already
    /// viewing one switches to it.
    pub fn select_patient(&mut self, patient_id: &str) -> EngageResult<ViewOutcome> {
        let session = self.require_session("select a patient")?.clone();

        if let AccessVerdict::Restrict { reason } = self.evaluate(&session, ViewId::PatientDetail)? {
            return Ok(ViewOutcome::Restricted { reason });
        }

        // The record search showed (first match under the current filters),
        // else the patient's first record anywhere.
        let found = self
            .dataset
            .iter()
            .position(|r| r.patient_id == patient_id && pipeline::matches(&self.filters, r))
            .or_else(|| self.dataset.iter().position(|r| r.patient_id == patient_id));
        let Some(record_index) = found else {
            debug!(patient_id, "patient not found");
            return Ok(ViewOutcome::NotFound);
        };

        debug!(session_id = %session.session_id, patient_id, record_index, "opening patient detail");
        self.state = DashboardState::ViewingPatient {
            session,
            patient_id: patient_id.to_string(),
            record_index,
        };
        Ok(ViewOutcome::Opened)
    }

    /// ViewingPatient → Authenticated. A no-op on the overview.
    pub fn back_to_overview(&mut self) -> EngageResult<()> {
        let session = self.require_session("return to the overview")?.clone();
        self.state = DashboardState::Authenticated { session };
        Ok(())
    }

    // ── Composition ───────────────────────────────────────────────────────────

    /// Compose the screen for the current state.
    pub fn screen(&self) -> EngageResult<Screen> {
        match &self.state {
            DashboardState::Unauthenticated => Ok(Screen::Login),
            DashboardState::Authenticated { session } => {
                Ok(Screen::Overview(Box::new(self.compose_overview(session)?)))
            }
            DashboardState::ViewingPatient {
                session, record_index, ..
            } => {
                match self.compose_patient(session, *record_index)? {
                    Some(detail) => Ok(Screen::Patient(Box::new(detail))),
                    // Access changed under us; fall back to the overview.
                    None => Ok(Screen::Overview(Box::new(self.compose_overview(session)?))),
                }
            }
        }
    }

    /// Patient search over the filtered records.
    ///
    /// `None` when the current role may not search.
    pub fn search_patients(&self, term: &str) -> EngageResult<Option<Vec<&PatientRecord>>> {
        let session = self.require_session("search patients")?;
        if !self.evaluate(session, ViewId::PatientSearch)?.is_allowed() {
            return Ok(None);
        }
        let filtered = self.filtered();
        Ok(Some(pipeline::search_patients(
            filtered.iter().copied(),
            term,
            SEARCH_LIMIT,
        )))
    }

    fn compose_overview(&self, session: &UserSession) -> EngageResult<Overview> {
        let filtered = self.filtered();

        let mut charts = Vec::new();
        let mut locked = Vec::new();
        for id in ChartId::ALL {
            let view = ViewId::Chart(id);
            match self.evaluate(session, view)? {
                AccessVerdict::Allow => charts.push(build_chart(id, &filtered)),
                AccessVerdict::Restrict { reason } => locked.push(LockedView {
                    view: view.resource(),
                    reason,
                }),
            }
        }

        let patient_search_enabled = self.evaluate(session, ViewId::PatientSearch)?.is_allowed();

        Ok(Overview {
            session: session.clone(),
            filters: self.filters,
            total_records: self.dataset.len(),
            filtered_records: filtered.len(),
            kpis: pipeline::summarize(filtered.iter().copied()),
            charts,
            locked,
            patient_search_enabled,
        })
    }

    fn compose_patient(
        &self,
        session: &UserSession,
        record_index: usize,
    ) -> EngageResult<Option<PatientDetail>> {
        if !self.evaluate(session, ViewId::PatientDetail)?.is_allowed() {
            return Ok(None);
        }
        let Some(record) = self.dataset.get(record_index) else {
            return Ok(None);
        };
        Ok(Some(PatientDetail {
            session: session.clone(),
            record: record.clone(),
            engagement_level: record.engagement_level(),
            no_show_rate: record.no_show_rate(),
            satisfaction: SatisfactionBand::for_score(record.satisfaction_score),
            satisfaction_percent: record.satisfaction_score / 5.0 * 100.0,
        }))
    }

    /// Policy verdict for one view, with the drill-down guard applied on top.
    fn evaluate(&self, session: &UserSession, view: ViewId) -> EngageResult<AccessVerdict> {
        if view == ViewId::PatientDetail && !role_may_drill_down(session.role) {
            return Ok(AccessVerdict::Restrict {
                reason: format!("role '{}' may not open patient detail", session.role),
            });
        }

        let ctx = AccessContext {
            username: session.username.clone(),
            role: session.role,
            view: view.resource(),
        };
        let verdict = self.access.evaluate(&ctx)?;
        if let AccessVerdict::Restrict { reason } = &verdict {
            debug!(view = %ctx.view, role = %ctx.role, reason = %reason, "view restricted");
        }
        Ok(verdict)
    }

    fn require_session(&self, action: &str) -> EngageResult<&UserSession> {
        self.session().ok_or_else(|| EngageError::StateMachineError {
            reason: format!("cannot {action} while signed out"),
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
