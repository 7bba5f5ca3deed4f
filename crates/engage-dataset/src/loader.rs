//! Loading a dataset document, with generated data as the fallback.
//!
//! The loader never fails. Any problem with the configured source (network
//! error, timeout, non-success status, malformed JSON, an empty array, or a
//! document that is not an array of records) is logged and replaced by a
//! generated dataset. The reason is kept on the result so the UI can say
//! which data it is showing.
//!
//! Individual records that fail verification are dropped with a warning and
//! the rest of the document is used. Only a document with no usable record
//! left falls back.

use std::{
    collections::BTreeSet,
    fmt,
    path::{Path, PathBuf},
    time::Duration,
};

use serde_json::Value;
use tracing::{info, warn};

use engage_contracts::{
    error::{EngageError, EngageResult},
    record::PatientRecord,
    verify::DatasetSchema,
};
use engage_core::{
    config::DatasetConfig,
    traits::{DatasetSource, RecordVerifier},
};

use crate::generator;

// ── Sources ───────────────────────────────────────────────────────────────────

/// A dataset document on the local filesystem.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DatasetSource for FileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn fetch(&self) -> EngageResult<Value> {
        let contents = std::fs::read_to_string(&self.path).map_err(|e| EngageError::DatasetLoad {
            reason: format!("failed to read '{}': {}", self.path.display(), e),
        })?;
        serde_json::from_str(&contents).map_err(|e| EngageError::DatasetLoad {
            reason: format!("'{}' is not valid JSON: {}", self.path.display(), e),
        })
    }
}

/// A dataset document served over HTTP.
pub struct HttpSource {
    url: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl HttpSource {
    pub fn new(url: impl Into<String>, timeout_secs: u64) -> EngageResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| EngageError::ConfigError {
                reason: format!("failed to create HTTP client: {}", e),
            })?;
        Ok(Self {
            url: url.into(),
            client,
            timeout_secs,
        })
    }
}

impl DatasetSource for HttpSource {
    fn describe(&self) -> String {
        self.url.clone()
    }

    fn fetch(&self) -> EngageResult<Value> {
        let response = self.client.get(&self.url).send().map_err(|e| {
            let reason = if e.is_timeout() {
                format!("request to {} timed out after {}s", self.url, self.timeout_secs)
            } else {
                format!("request to {} failed: {}", self.url, e)
            };
            EngageError::DatasetLoad { reason }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(EngageError::DatasetLoad {
                reason: format!("{} returned status {}", self.url, status.as_u16()),
            });
        }

        response.json::<Value>().map_err(|e| EngageError::DatasetLoad {
            reason: format!("{} did not return valid JSON: {}", self.url, e),
        })
    }
}

/// The source named by `config`: the URL when set, else the path, else none.
pub fn source_from_config(config: &DatasetConfig) -> EngageResult<Option<Box<dyn DatasetSource>>> {
    if let Some(url) = &config.url {
        return Ok(Some(Box::new(HttpSource::new(url.clone(), config.timeout_secs)?)));
    }
    Ok(config
        .path
        .as_ref()
        .map(|p| Box::new(FileSource::new(p.clone())) as Box<dyn DatasetSource>))
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Where a loaded dataset came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetOrigin {
    /// `dropped` counts records rejected by verification.
    Source { description: String, dropped: usize },
    Generated { reason: String },
}

impl fmt::Display for DatasetOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetOrigin::Source { description, dropped: 0 } => write!(f, "loaded from {description}"),
            DatasetOrigin::Source { description, dropped } => {
                write!(f, "loaded from {description}, {dropped} invalid records dropped")
            }
            DatasetOrigin::Generated { reason } => write!(f, "generated ({reason})"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoadedDataset {
    pub records: Vec<PatientRecord>,
    pub origin: DatasetOrigin,
}

impl LoadedDataset {
    pub fn is_generated(&self) -> bool {
        matches!(self.origin, DatasetOrigin::Generated { .. })
    }
}

/// Fetch, verify, and parse `source`, falling back to `fallback_count`
/// generated records on any failure.
pub fn load_dataset(
    source: Option<&dyn DatasetSource>,
    verifier: &dyn RecordVerifier,
    schema: &DatasetSchema,
    fallback_count: usize,
) -> LoadedDataset {
    let Some(source) = source else {
        return fallback("no dataset source configured".to_string(), fallback_count);
    };

    match load_from(source, verifier, schema) {
        Ok((records, dropped)) => {
            info!(source = %source.describe(), records = records.len(), dropped, "dataset loaded");
            LoadedDataset {
                records,
                origin: DatasetOrigin::Source {
                    description: source.describe(),
                    dropped,
                },
            }
        }
        Err(e) => {
            warn!(source = %source.describe(), error = %e, "dataset unusable; generating instead");
            fallback(e.to_string(), fallback_count)
        }
    }
}

/// The usable records of `source` and how many were dropped.
fn load_from(
    source: &dyn DatasetSource,
    verifier: &dyn RecordVerifier,
    schema: &DatasetSchema,
) -> EngageResult<(Vec<PatientRecord>, usize)> {
    let document = source.fetch()?;

    let Value::Array(items) = &document else {
        return Err(EngageError::DatasetInvalid {
            reason: "dataset is not a JSON array".to_string(),
        });
    };
    if items.is_empty() {
        return Err(EngageError::DatasetInvalid {
            reason: "dataset is empty".to_string(),
        });
    }

    let report = verifier.verify(&document, schema)?;
    let mut rejected = BTreeSet::new();
    if !report.passed {
        // A failed report with nothing to pin on a single record condemns
        // the whole document.
        let per_record: Option<Vec<usize>> = report.failures.iter().map(|f| f.record_index).collect();
        match per_record {
            Some(indices) if !indices.is_empty() => rejected.extend(indices),
            _ => {
                return Err(EngageError::DatasetInvalid {
                    reason: report.summary(3),
                })
            }
        }
    }

    let mut records = Vec::with_capacity(items.len().saturating_sub(rejected.len()));
    for (index, raw) in items.iter().enumerate() {
        if rejected.contains(&index) {
            continue;
        }
        match serde_json::from_value::<PatientRecord>(raw.clone()) {
            Ok(record) => records.push(record),
            Err(e) => {
                warn!(record_index = index, error = %e, "record does not parse");
                rejected.insert(index);
            }
        }
    }

    if records.is_empty() {
        return Err(EngageError::DatasetInvalid {
            reason: format!("no usable records: {}", report.summary(3)),
        });
    }
    if !rejected.is_empty() {
        warn!(
            source = %source.describe(),
            dropped = rejected.len(),
            kept = records.len(),
            first_failures = %report.summary(3),
            "dropped invalid records"
        );
    }
    Ok((records, rejected.len()))
}

fn fallback(reason: String, count: usize) -> LoadedDataset {
    info!(count, reason = %reason, "generating synthetic dataset");
    LoadedDataset {
        records: generator::generate(count),
        origin: DatasetOrigin::Generated { reason },
    }
}

/// Write `records` as a pretty-printed dataset document, creating parent
/// directories as needed.
pub fn save_dataset(path: &Path, records: &[PatientRecord]) -> EngageResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| EngageError::DatasetLoad {
            reason: format!("failed to create '{}': {}", parent.display(), e),
        })?;
    }
    let json = serde_json::to_string_pretty(records).map_err(|e| EngageError::DatasetLoad {
        reason: format!("failed to serialize dataset: {}", e),
    })?;
    std::fs::write(path, json).map_err(|e| EngageError::DatasetLoad {
        reason: format!("failed to write '{}': {}", path.display(), e),
    })
}
