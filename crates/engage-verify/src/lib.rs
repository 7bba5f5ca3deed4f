//! # engage-verify
//!
//! Verification of dataset documents before the dashboard uses them.
//!
//! [`DatasetVerifier`] implements [`engage_core::traits::RecordVerifier`] in
//! two phases:
//!
//! 1. **Structural**: JSON Schema validation of the whole document.
//! 2. **Semantic**: per-record invariants (`MissedWithinCap`, `CityInState`,
//!    `AgeWithinGroup`, `DerivedFieldsConsistent`, `Custom`).
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use engage_verify::{dataset_schema, DatasetVerifier};
//!
//! let report = DatasetVerifier::new().verify(&document, &dataset_schema(true))?;
//! if !report.passed {
//!     eprintln!("{}", report.summary(5));
//! }
//! ```

pub mod engine;
pub mod schema;

pub use engine::{CustomRecordFn, DatasetVerifier};
pub use schema::{dataset_json_schema, dataset_schema, MISSED_APPOINTMENTS_CAP};
