use crate::error::{ReportError, Result};
use crate::plural::Plural;
use serde::{Deserialize, Serialize};
use tally_parser::NONE_DETECTED;

/// Records ending before this hour are dropped from early-filtered files
pub const DEFAULT_EARLY_CUTOFF_HOUR: u8 = 18;

const CASES_PLACEHOLDER: &str = "{cases}";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    pub early_cutoff_hour: u8,
    pub wording: SummaryWording,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            early_cutoff_hour: DEFAULT_EARLY_CUTOFF_HOUR,
            wording: SummaryWording::default(),
        }
    }
}

impl ReportSettings {
    pub fn validate(&self) -> Result<()> {
        if self.early_cutoff_hour > 24 {
            return Err(ReportError::InvalidSettings(format!(
                "early_cutoff_hour must be within 0..=24, got {}",
                self.early_cutoff_hour
            )));
        }
        self.wording.validate()
    }
}

/// Text used when rendering summary lines
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryWording {
    /// Comment used when a group collected no notes
    pub none_detected: String,

    /// Label in front of the group total
    pub flights_label: String,

    /// Comment used when notes exist; `{cases}` becomes e.g. "3 випадках"
    pub flagged_template: String,

    pub cases: Plural,

    /// Display label for unknown names without a qualifier
    pub other_label: String,
}

impl Default for SummaryWording {
    fn default() -> Self {
        Self {
            none_detected: NONE_DETECTED.to_string(),
            flights_label: "польотів".to_string(),
            flagged_template: "в {cases} затриманих".to_string(),
            cases: Plural::new("випадку", "випадках", "випадках"),
            other_label: "інше".to_string(),
        }
    }
}

impl SummaryWording {
    fn validate(&self) -> Result<()> {
        if !self.flagged_template.contains(CASES_PLACEHOLDER) {
            return Err(ReportError::InvalidSettings(format!(
                "flagged_template must contain {CASES_PLACEHOLDER}"
            )));
        }
        Ok(())
    }

    /// Comment for a group given how many notes its canonical name collected
    #[must_use]
    pub fn group_comment(&self, noted: usize) -> String {
        if noted == 0 {
            return self.none_detected.clone();
        }
        self.flagged_template
            .replace(CASES_PLACEHOLDER, &self.cases.format(noted))
    }

    /// `"<position>. <name> - <label>: <total>, <comment>;\n"`
    #[must_use]
    pub fn summary_line(&self, position: usize, name: &str, total: usize, noted: usize) -> String {
        format!(
            "{position}. {name} - {}: {total}, {};\n",
            self.flights_label,
            self.group_comment(noted)
        )
    }
}
