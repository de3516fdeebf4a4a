use crate::error::{ParserError, Result};
use serde::{Deserialize, Serialize};

/// Qualifier phrases recognized in front of a name, in tie-break order
pub const DEFAULT_QUALIFIERS: &[&str] = &[
    "віпс",
    "впс",
    "ГОРВ",
    "ПОРВ",
    "ВОПР та ПБПС",
    "ВАЗ",
    "ВАК",
    "УОРД ПдРУ",
    "ВБТЗ",
    "2",
    "ПРИКЗ",
];

/// Comment paragraph meaning "nothing detected"; never stored
pub const NONE_DETECTED: &str = "ОПДК не виявлено";

/// Configuration for table parsing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Candidate qualifier phrases, matched case-insensitively
    pub qualifiers: Vec<String>,

    /// Whether several qualifiers may follow each other
    pub qualifier_policy: QualifierPolicy,

    /// Column positions inside a row
    pub columns: ColumnLayout,

    /// Sentinel comment paragraph that is dropped
    pub none_detected: String,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            qualifiers: DEFAULT_QUALIFIERS.iter().map(|q| (*q).to_string()).collect(),
            qualifier_policy: QualifierPolicy::default(),
            columns: ColumnLayout::default(),
            none_detected: NONE_DETECTED.to_string(),
        }
    }
}

impl ParserConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if let Some(idx) = self.qualifiers.iter().position(|q| q.is_empty()) {
            return Err(ParserError::invalid_config(format!(
                "qualifiers[{idx}] is empty"
            )));
        }

        if self.none_detected.trim().is_empty() {
            return Err(ParserError::invalid_config(
                "none_detected sentinel cannot be empty",
            ));
        }

        self.columns.validate()
    }
}

/// How many qualifier tokens a label may start with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualifierPolicy {
    /// Keep matching (skipping whitespace in between) until nothing matches;
    /// tokens are joined with single spaces
    #[default]
    Repeat,

    /// Match at most one qualifier
    Once,
}

/// Zero-based column indices of the fields the extractor reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnLayout {
    pub end_time: usize,
    pub label: usize,
    pub comment: usize,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self {
            end_time: 5,
            label: 6,
            comment: 8,
        }
    }
}

impl ColumnLayout {
    fn validate(&self) -> Result<()> {
        if self.end_time == self.label
            || self.label == self.comment
            || self.end_time == self.comment
        {
            return Err(ParserError::invalid_config(format!(
                "columns must be distinct (end_time={}, label={}, comment={})",
                self.end_time, self.label, self.comment
            )));
        }
        Ok(())
    }

    /// Smallest cell count a row needs to be readable
    #[must_use]
    pub fn min_cells(&self) -> usize {
        self.end_time.max(self.label).max(self.comment) + 1
    }
}
