use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod dictionary;

pub use dictionary::Dictionary;

pub const REPORT_SCHEMA_VERSION: u32 = 1;

/// Qualifier plus proper name. Structural equality on both fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QualifiedName {
    /// Controlled-vocabulary qualifier, empty when the label had none
    #[serde(rename = "type", alias = "Type", default)]
    pub kind: String,

    #[serde(alias = "Name", default)]
    pub name: String,
}

impl QualifiedName {
    pub fn new(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
        }
    }

    /// Identity with an empty hint, the form known names are tallied under
    #[must_use]
    pub fn bare_id(&self) -> Id {
        Id {
            qualified: self.clone(),
            hint: String::new(),
        }
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.kind.is_empty() {
            f.write_str(&self.name)
        } else {
            write!(f, "{} {}", self.kind, self.name)
        }
    }
}

/// Full identity of a record: the qualified name plus a free-text hint.
///
/// The hint never decides whether a name is known, but two unknown names
/// with different hints are tallied separately.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Id {
    #[serde(flatten)]
    pub qualified: QualifiedName,

    #[serde(alias = "Hint", default)]
    pub hint: String,
}

impl Id {
    pub fn new(qualified: QualifiedName, hint: impl Into<String>) -> Self {
        Self {
            qualified,
            hint: hint.into(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> &str {
        &self.qualified.kind
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.qualified.name
    }
}

impl From<QualifiedName> for Id {
    fn from(qualified: QualifiedName) -> Self {
        qualified.bare_id()
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hint.is_empty() {
            write!(f, "{}", self.qualified)
        } else {
            write!(f, "{} ({})", self.qualified, self.hint)
        }
    }
}

/// One parsed table row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    #[serde(flatten)]
    pub id: Id,

    /// Hour (0-23) taken from the end-time column
    pub end_hour: u8,

    /// Newline-joined notes, never containing the "none detected" sentinel
    #[serde(default)]
    pub comment: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    #[serde(flatten)]
    pub id: Id,
    pub count: usize,
}

impl Entry {
    pub fn new(id: Id, count: usize) -> Self {
        Self { id, count }
    }
}

/// One dictionary group with its rollup
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub entries: Vec<Entry>,
    pub total: usize,
}

/// Result for a single input file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub filename: String,
    pub known_groups: Vec<Group>,
    pub unknown_entries: Vec<Entry>,
}

/// Grand total for a name that never matched the dictionary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnknownTotal {
    #[serde(flatten)]
    pub id: Id,
    pub count: usize,

    /// Qualifier for display; a placeholder label when the qualifier is empty.
    /// `id.qualified.kind` itself is left untouched.
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Footnote {
    #[serde(flatten)]
    pub id: Id,
    pub comments: Vec<String>,
}

/// A file that was skipped instead of failing the whole batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileError {
    pub filename: String,
    pub message: String,
}

/// Final report for a batch of files
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Data {
    pub pages: Vec<Page>,
    pub total: Vec<Entry>,
    pub total_unknown: Vec<UnknownTotal>,
    pub footnotes: Vec<Footnote>,
    pub summary: String,
    #[serde(default)]
    pub errors: Vec<FileError>,
}

impl Data {
    /// Number of records counted across every page
    #[must_use]
    pub fn counted_records(&self) -> usize {
        self.total.iter().map(|e| e.count).sum::<usize>()
            + self.total_unknown.iter().map(|e| e.count).sum::<usize>()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ErrorEnvelope {
    pub code: String,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ReportEnvelope {
    pub schema_version: u32,
    pub report: Data,
}

impl ReportEnvelope {
    pub fn new(report: Data) -> Self {
        Self {
            schema_version: REPORT_SCHEMA_VERSION,
            report,
        }
    }
}

pub fn serialize_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(Into::into)
}

pub fn serialize_json_pretty<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(Into::into)
}
