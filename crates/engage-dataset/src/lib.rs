//! # engage-dataset
//!
//! Where the dashboard's records come from.
//!
//! - [`generator`] synthesises internally consistent patient-week records.
//! - [`loader`] fetches a dataset document from a file or URL, verifies it,
//!   and falls back to generated records when anything goes wrong.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use engage_dataset::{load_dataset, source_from_config};
//!
//! let source = source_from_config(&config.dataset)?;
//! let loaded = load_dataset(source.as_deref(), &verifier, &schema, config.dataset.fallback_count);
//! println!("{} records, {}", loaded.records.len(), loaded.origin);
//! ```

pub mod generator;
pub mod loader;

pub use generator::{generate, generate_with_rng, simulate_weekly_logins, week_dates};
pub use loader::{
    load_dataset, save_dataset, source_from_config, DatasetOrigin, FileSource, HttpSource,
    LoadedDataset,
};
