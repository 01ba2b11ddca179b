//! Flattener configuration.
//!
//! A [`FlattenerConfig`] describes the initial grouping, sorting and
//! group-key policy of a flattener. It can be built in code or loaded from
//! TOML:
//!
//! ```toml
//! group_field = "DateModified"
//! year_rank = "numeric"
//! reference_date = "2024-06-15"
//! default_expanded = true
//!
//! [sort]
//! field = "Name"
//! direction = "descending"
//!
//! [field_kinds]
//! Created = "date"
//! Bytes = "size"
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::group_key::{FieldKind, GroupKeyPolicy, YearRank};
use crate::sort::SortSpec;
use crate::value::DATE_FORMAT;

/// Configuration for creating a [`GroupedRowFlattener`](crate::GroupedRowFlattener).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlattenerConfig {
    /// Field to group by. `None` produces an ungrouped sequence.
    pub group_field: Option<String>,
    /// Year ordering mode: `contains_two` or `numeric`.
    pub year_rank: YearRank,
    /// Fixed reference date for date buckets (`YYYY-MM-DD`). `None` uses today.
    pub reference_date: Option<String>,
    /// Whether a group seen for the first time starts expanded.
    pub default_expanded: bool,
    // Tables last so the struct serializes to valid TOML.
    /// Initial sort.
    pub sort: Option<SortSpec>,
    /// Field kinds, on top of the default kinds.
    pub field_kinds: BTreeMap<String, FieldKind>,
}

impl Default for FlattenerConfig {
    fn default() -> Self {
        Self {
            group_field: None,
            year_rank: YearRank::default(),
            reference_date: None,
            default_expanded: true,
            sort: None,
            field_kinds: BTreeMap::new(),
        }
    }
}

impl FlattenerConfig {
    /// Create a new configuration grouped by the given field.
    pub fn grouped_by(field: impl Into<String>) -> Self {
        Self {
            group_field: Some(field.into()),
            ..Default::default()
        }
    }

    /// Parses a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Reads a configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_toml_str(&text)
    }

    /// Serializes the configuration to TOML text.
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string(self)?)
    }

    /// Writes the configuration to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let text = self.to_toml_string()?;
        std::fs::write(path, text).map_err(|e| Error::io(path, e))
    }

    /// Builds the group-key policy described by this configuration.
    ///
    /// Fails on a malformed reference date. Unknown field kinds and year-rank
    /// modes are already rejected when the TOML is parsed.
    pub fn group_key_policy(&self) -> Result<GroupKeyPolicy> {
        let mut policy = GroupKeyPolicy::new().with_year_rank(self.year_rank);
        for (field, kind) in &self.field_kinds {
            policy.set_field_kind(field.as_str(), *kind);
        }
        if let Some(text) = &self.reference_date {
            let date = NaiveDate::parse_from_str(text.trim(), DATE_FORMAT)
                .map_err(|e| Error::invalid_date(text.as_str(), e))?;
            policy.set_reference_date(Some(date));
        }
        Ok(policy)
    }
}

/// Builder for creating flattener configurations.
#[derive(Debug, Default)]
pub struct FlattenerConfigBuilder {
    config: FlattenerConfig,
}

impl FlattenerConfigBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the grouping field.
    pub fn group_field(mut self, field: impl Into<String>) -> Self {
        self.config.group_field = Some(field.into());
        self
    }

    /// Set the initial sort.
    pub fn sort(mut self, sort: SortSpec) -> Self {
        self.config.sort = Some(sort);
        self
    }

    /// Set the kind of a field.
    pub fn field_kind(mut self, field: impl Into<String>, kind: FieldKind) -> Self {
        self.config.field_kinds.insert(field.into(), kind);
        self
    }

    /// Set the year ordering mode.
    pub fn year_rank(mut self, year_rank: YearRank) -> Self {
        self.config.year_rank = year_rank;
        self
    }

    /// Set a fixed reference date.
    pub fn reference_date(mut self, date: NaiveDate) -> Self {
        self.config.reference_date = Some(date.format(DATE_FORMAT).to_string());
        self
    }

    /// Set whether new groups start expanded.
    pub fn default_expanded(mut self, expanded: bool) -> Self {
        self.config.default_expanded = expanded;
        self
    }

    /// Finish building.
    pub fn build(self) -> FlattenerConfig {
        self.config
    }
}
