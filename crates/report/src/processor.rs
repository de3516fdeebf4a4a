use crate::assembler::ReportAssembler;
use crate::error::Result;
use crate::settings::ReportSettings;
use crate::tally::{EarlyFilter, Tally};
use std::fmt::Display;
use tally_parser::{ParserConfig, RecordExtractor, TableSource};
use tally_protocol::{Data, Dictionary, Record};

/// Long-lived report pipeline: dictionary, extractor and settings shared by
/// every request. Each request opens its own [`Batch`].
#[derive(Debug, Clone)]
pub struct Processor {
    dictionary: Dictionary,
    extractor: RecordExtractor,
    settings: ReportSettings,
}

impl Processor {
    pub fn new(
        dictionary: Dictionary,
        extractor: RecordExtractor,
        settings: ReportSettings,
    ) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            dictionary,
            extractor,
            settings,
        })
    }

    /// Build the extractor from parser settings and validate both configs
    pub fn from_config(
        dictionary: Dictionary,
        parser: &ParserConfig,
        settings: ReportSettings,
    ) -> Result<Self> {
        let extractor = RecordExtractor::new(parser)?;
        Self::new(dictionary, extractor, settings)
    }

    #[must_use]
    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    #[must_use]
    pub fn extractor(&self) -> &RecordExtractor {
        &self.extractor
    }

    #[must_use]
    pub fn settings(&self) -> &ReportSettings {
        &self.settings
    }

    /// Start a batch; files are added one at a time in upload order
    #[must_use]
    pub fn batch(&self) -> Batch<'_> {
        Batch {
            processor: self,
            assembler: ReportAssembler::new(&self.dictionary, &self.settings.wording),
        }
    }

    fn early_filter(&self, enabled: bool) -> EarlyFilter {
        EarlyFilter::new(enabled, self.settings.early_cutoff_hour)
    }
}

/// One request's worth of files
pub struct Batch<'a> {
    processor: &'a Processor,
    assembler: ReportAssembler<'a>,
}

impl Batch<'_> {
    /// Extract the first table of a document and add its page.
    /// A document without tables is recorded as a failed file.
    pub fn add_table(&mut self, filename: &str, filter_early: bool, source: &dyn TableSource) {
        let Some(table) = source.first_table() else {
            self.add_failure(filename, "document contains no table");
            return;
        };

        let outcome = self.processor.extractor.extract_with_stats(table);
        if outcome.skipped > 0 {
            log::debug!(
                "{filename}: skipped {} unreadable row(s) of {}",
                outcome.skipped,
                table.len().saturating_sub(1)
            );
        }
        if outcome.out_of_range > 0 {
            log::warn!(
                "{filename}: {} row(s) dropped for an end hour past 23",
                outcome.out_of_range
            );
        }
        self.add_records(filename, filter_early, &outcome.records);
    }

    /// Add a page from already extracted records
    pub fn add_records(&mut self, filename: &str, filter_early: bool, records: &[Record]) {
        let mut tally = Tally::seeded(&self.processor.dictionary);
        let excluded = tally.process(records, self.processor.early_filter(filter_early));

        log::info!(
            "{filename}: {} record(s), {} unknown name(s), {excluded} excluded as early",
            records.len() - excluded,
            tally.unknown().len()
        );
        self.assembler.add_page(filename, tally);
    }

    /// Skip a file that could not be read, keeping the reason for the report
    pub fn add_failure(&mut self, filename: &str, reason: impl Display) {
        log::warn!("{filename}: skipped: {reason}");
        self.assembler.add_failure(filename, reason.to_string());
    }

    #[must_use]
    pub fn page_count(&self) -> usize {
        self.assembler.page_count()
    }

    #[must_use]
    pub fn finish(self) -> Data {
        self.assembler.finish()
    }
}
