//! Dashboard filter state.
//!
//! Three independent predicates. `None` means the field is unconstrained and
//! is shown to users as `"all"`.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    error::{EngageError, EngageResult},
    record::{AgeGroup, DeviceType, Gender},
};

/// The literal users pick to clear a filter.
pub const ALL: &str = "all";

/// Which filter a user action targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterField {
    AgeGroup,
    Gender,
    DeviceType,
}

impl FilterField {
    pub const ALL: [FilterField; 3] = [FilterField::AgeGroup, FilterField::Gender, FilterField::DeviceType];

    pub fn as_str(self) -> &'static str {
        match self {
            FilterField::AgeGroup => "ageGroup",
            FilterField::Gender => "gender",
            FilterField::DeviceType => "deviceType",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FilterField::AgeGroup => "Age",
            FilterField::Gender => "Gender",
            FilterField::DeviceType => "Device",
        }
    }
}

impl fmt::Display for FilterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterField {
    type Err = EngageError;

    fn from_str(s: &str) -> EngageResult<Self> {
        FilterField::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| EngageError::ConfigError {
                reason: format!("unknown filter field '{s}'"),
            })
    }
}

/// Active filter predicates. `Default` is the all-`"all"` state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    pub age_group: Option<AgeGroup>,
    pub gender: Option<Gender>,
    pub device_type: Option<DeviceType>,
}

impl FilterState {
    /// Set one field from its user-facing text. `"all"` clears the field.
    ///
    /// Gender is matched case-insensitively; the other fields must match a
    /// domain label exactly. A value outside the domain is `InvalidFilter`
    /// rather than an empty match, since no record can hold it. On error the
    /// state is left unchanged.
    pub fn set(&mut self, field: FilterField, value: &str) -> EngageResult<()> {
        let clear = value == ALL;
        match field {
            FilterField::AgeGroup => {
                self.age_group = if clear { None } else { Some(value.parse()?) };
            }
            FilterField::Gender => {
                self.gender = if clear { None } else { Some(value.parse()?) };
            }
            FilterField::DeviceType => {
                self.device_type = if clear { None } else { Some(value.parse()?) };
            }
        }
        Ok(())
    }

    pub fn clear(&mut self, field: FilterField) {
        match field {
            FilterField::AgeGroup => self.age_group = None,
            FilterField::Gender => self.gender = None,
            FilterField::DeviceType => self.device_type = None,
        }
    }

    pub fn reset(&mut self) {
        *self = FilterState::default();
    }

    /// The field's current value as shown to users (`"all"` when unset).
    pub fn value(&self, field: FilterField) -> &'static str {
        match field {
            FilterField::AgeGroup => self.age_group.map_or(ALL, AgeGroup::as_str),
            FilterField::Gender => self.gender.map_or(ALL, Gender::as_str),
            FilterField::DeviceType => self.device_type.map_or(ALL, DeviceType::as_str),
        }
    }

    /// Number of fields currently constraining the dataset.
    pub fn active_count(&self) -> usize {
        FilterField::ALL
            .into_iter()
            .filter(|f| self.value(*f) != ALL)
            .count()
    }

    pub fn is_unconstrained(&self) -> bool {
        self.active_count() == 0
    }
}
