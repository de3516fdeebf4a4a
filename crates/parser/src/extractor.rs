use crate::config::{ColumnLayout, ParserConfig};
use crate::error::Result;
use crate::table::{Row, Table};
use crate::tokenizer::NameTokenizer;
use tally_protocol::{Id, Record};

/// Records pulled from one table plus the number of rows left out
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractOutcome {
    pub records: Vec<Record>,
    pub skipped: usize,

    /// Skipped rows whose end time read as an hour past 23 (e.g. `24:00`)
    pub out_of_range: usize,
}

/// Why a row produced no record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowSkip {
    Unreadable,
    HourOutOfRange(u32),
}

/// Walks a table and produces one [`Record`] per readable row
#[derive(Debug, Clone)]
pub struct RecordExtractor {
    tokenizer: NameTokenizer,
    columns: ColumnLayout,
    none_detected: String,
}

impl Default for RecordExtractor {
    fn default() -> Self {
        Self::from_parts(NameTokenizer::default(), &ParserConfig::default())
    }
}

impl RecordExtractor {
    /// Create an extractor with validated configuration
    pub fn new(config: &ParserConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_parts(NameTokenizer::from_config(config), config))
    }

    fn from_parts(tokenizer: NameTokenizer, config: &ParserConfig) -> Self {
        Self {
            tokenizer,
            columns: config.columns,
            none_detected: config.none_detected.clone(),
        }
    }

    #[must_use]
    pub fn tokenizer(&self) -> &NameTokenizer {
        &self.tokenizer
    }

    /// Records for every data row, in row order
    #[must_use]
    pub fn extract(&self, table: &Table) -> Vec<Record> {
        self.extract_with_stats(table).records
    }

    /// Like [`extract`](Self::extract) but also counts skipped rows.
    /// The first row is the header and is neither read nor counted.
    #[must_use]
    pub fn extract_with_stats(&self, table: &Table) -> ExtractOutcome {
        let mut outcome = ExtractOutcome::default();

        for (idx, row) in table.rows.iter().enumerate().skip(1) {
            match self.extract_row(row) {
                Ok(record) => outcome.records.push(record),
                Err(RowSkip::Unreadable) => {
                    log::debug!("skipping table row {idx}: unreadable end time or missing cells");
                    outcome.skipped += 1;
                }
                Err(RowSkip::HourOutOfRange(hour)) => {
                    log::warn!("skipping table row {idx}: end hour {hour} is outside 00-23");
                    outcome.skipped += 1;
                    outcome.out_of_range += 1;
                }
            }
        }

        outcome
    }

    fn extract_row(&self, row: &Row) -> std::result::Result<Record, RowSkip> {
        if row.cells.len() < self.columns.min_cells() {
            return Err(RowSkip::Unreadable);
        }

        let end_time = row.cell(self.columns.end_time).ok_or(RowSkip::Unreadable)?;
        let hour = parse_hour(end_time.first_paragraph()).ok_or(RowSkip::Unreadable)?;
        let end_hour = u8::try_from(hour)
            .ok()
            .filter(|h| *h <= 23)
            .ok_or(RowSkip::HourOutOfRange(hour))?;

        let label = row.cell(self.columns.label).ok_or(RowSkip::Unreadable)?;
        let qualified = self.tokenizer.tokenize(label.first_paragraph());
        let hint = label
            .paragraphs
            .iter()
            .skip(1)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ");

        let comment = row
            .cell(self.columns.comment)
            .ok_or(RowSkip::Unreadable)?
            .paragraphs
            .iter()
            .map(|p| normalize_whitespace(p))
            .filter(|p| !p.is_empty() && *p != self.none_detected)
            .collect::<Vec<_>>()
            .join("\n");

        Ok(Record {
            id: Id::new(qualified, hint),
            end_hour,
            comment,
        })
    }
}

/// Two-digit number at the start of an end-time value such as `19:40`.
/// The 0-23 range is checked by the caller.
fn parse_hour(value: &str) -> Option<u32> {
    let mut chars = value.chars();
    let tens = chars.next()?.to_digit(10)?;
    let ones = chars.next()?.to_digit(10)?;
    Some(tens * 10 + ones)
}

/// Collapse whitespace runs to single spaces and trim the ends
fn normalize_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}
