use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// How a repeated *string* identifier gets a new value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StringConflictStrategy {
    /// Append `<separator><n>` with the smallest `n >= 2` that is still unused.
    #[default]
    Suffix,
    /// Treat string duplicates like numeric ones and assign the next number.
    Renumber,
    /// Report the duplicate but propose no edit.
    ReportOnly,
}

/// Knobs for identifier analysis. Every field has a default, so a policy file
/// only needs to name what it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdPolicy {
    /// Key name of the identifier field.
    pub id_key: String,
    pub string_conflicts: StringConflictStrategy,
    pub suffix_separator: String,
    /// Skip fix proposals for documents the converter cannot parse.
    pub require_parseable: bool,
    /// Key holding the record list in a parsed tree.
    pub records_key: String,
    pub label_key: String,
    pub generated_id_prefix: String,
}

impl IdPolicy {
    pub const DEFAULT_ID_KEY: &'static str = "id";

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(|e| ConfigError::Json(e.to_string()))
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(text).map_err(|e| ConfigError::Yaml(e.to_string()))
    }

    #[must_use]
    pub fn with_id_key(mut self, id_key: impl Into<String>) -> Self {
        self.id_key = id_key.into();
        self
    }

    #[must_use]
    pub fn with_string_conflicts(mut self, strategy: StringConflictStrategy) -> Self {
        self.string_conflicts = strategy;
        self
    }
}

impl Default for IdPolicy {
    fn default() -> Self {
        Self {
            id_key: Self::DEFAULT_ID_KEY.to_string(),
            string_conflicts: StringConflictStrategy::default(),
            suffix_separator: "_".to_string(),
            require_parseable: true,
            records_key: "questions".to_string(),
            label_key: "label".to_string(),
            generated_id_prefix: "sys_".to_string(),
        }
    }
}
