//! Runtime configuration for the dashboard.
//!
//! Every field has a default, so an empty document (or no file at all) is a
//! valid configuration. The dataset path defaults to
//! [`DEFAULT_DATASET_PATH`], which is where `demo generate` writes:
//!
//! ```toml
//! [dataset]
//! path = "public/patient_portal_dataset_1000.json"
//! url = "http://localhost:3000/patient_portal_dataset_1000.json"
//! fallback_count = 1000
//! timeout_secs = 10
//! verify_invariants = true
//!
//! [session]
//! dir = ".engage"
//!
//! [access]
//! policy_file = "policies/dashboard.toml"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use engage_contracts::error::{EngageError, EngageResult};

/// Dataset document looked for when no other location is configured.
pub const DEFAULT_DATASET_PATH: &str = "public/patient_portal_dataset_1000.json";

/// Where the dataset comes from and what to do when it cannot be used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// Local JSON file. Ignored when `url` is set.
    pub path: Option<PathBuf>,
    /// HTTP location of the JSON document.
    pub url: Option<String>,
    /// How many records to generate when loading fails.
    pub fallback_count: usize,
    pub timeout_secs: u64,
    /// Run the per-record semantic checks in addition to the schema.
    pub verify_invariants: bool,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: Some(PathBuf::from(DEFAULT_DATASET_PATH)),
            url: None,
            fallback_count: 1000,
            timeout_secs: 10,
            verify_invariants: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Directory holding the persisted session.
    pub dir: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(".engage"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessConfig {
    /// TOML access policy. The built-in policy is used when unset.
    pub policy_file: Option<PathBuf>,
}

/// Top-level configuration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub dataset: DatasetConfig,
    pub session: SessionConfig,
    pub access: AccessConfig,
}

impl DashboardConfig {
    /// Returns `EngageError::ConfigError` if the TOML is malformed.
    pub fn from_toml_str(s: &str) -> EngageResult<Self> {
        toml::from_str(s).map_err(|e| EngageError::ConfigError {
            reason: format!("failed to parse dashboard config: {}", e),
        })
    }

    pub fn from_file(path: &Path) -> EngageResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| EngageError::ConfigError {
            reason: format!("failed to read config file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }
}
