//! # engage-core
//!
//! The filtering and aggregation pipeline and the dashboard state machine.
//!
//! This crate provides:
//! - The five trait seams (`DatasetSource`, `RecordVerifier`, `Authenticator`,
//!   `AccessPolicy`, `SessionStore`)
//! - Pure pipeline functions: filter, summarise, group, search
//! - Chart series built from a filtered record set
//! - The `Dashboard` that composes screens from (dataset, filters, session)
//! - `DashboardConfig`, loaded from TOML
//!
//! ## Usage
//!
//! ```rust,ignore
//! use engage_core::{Dashboard, Screen};
//!
//! let mut dashboard = Dashboard::new(records, auth, policy, store)?;
//! dashboard.login("admin", "admin123")?;
//! if let Screen::Overview(overview) = dashboard.screen()? { /* render */ }
//! ```

pub mod chart;
pub mod config;
pub mod dashboard;
pub mod pipeline;
pub mod traits;

pub use config::DashboardConfig;
pub use dashboard::{Dashboard, DashboardState, LoginOutcome, Screen, ViewOutcome};
