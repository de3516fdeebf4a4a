use crate::settings::SummaryWording;
use crate::tally::Tally;
use indexmap::IndexMap;
use tally_protocol::{Data, Dictionary, Entry, FileError, Footnote, Group, Id, Page, UnknownTotal};

/// Folds per-file tallies into the batch report.
///
/// Grand totals for dictionary groups are kept under the group's canonical
/// (first) name; unknown names keep their full id. Output order follows the
/// dictionary for groups and first appearance for everything else.
pub struct ReportAssembler<'a> {
    dictionary: &'a Dictionary,
    wording: &'a SummaryWording,
    pages: Vec<Page>,
    overall: IndexMap<Id, usize>,
    comments: IndexMap<Id, Vec<String>>,
    errors: Vec<FileError>,
}

impl<'a> ReportAssembler<'a> {
    pub fn new(dictionary: &'a Dictionary, wording: &'a SummaryWording) -> Self {
        Self {
            dictionary,
            wording,
            pages: Vec::new(),
            overall: IndexMap::new(),
            comments: IndexMap::new(),
            errors: Vec::new(),
        }
    }

    /// Add the page for one file
    pub fn add_page(&mut self, filename: impl Into<String>, tally: Tally) {
        let mut page = Page {
            filename: filename.into(),
            ..Page::default()
        };

        for group in self.dictionary.groups() {
            let entries: Vec<Entry> = group
                .iter()
                .map(|name| Entry::new(name.bare_id(), tally.known_count(name)))
                .collect();
            let total: usize = entries.iter().map(|e| e.count).sum();

            if let Some(canonical) = group.first() {
                *self.overall.entry(canonical.bare_id()).or_insert(0) += total;
            }
            page.known_groups.push(Group { entries, total });
        }

        let (unknown, commented) = tally.into_parts();
        for (id, count) in unknown {
            *self.overall.entry(id.clone()).or_insert(0) += count;
            page.unknown_entries.push(Entry::new(id, count));
        }

        for (id, comments) in commented {
            let collected = self.comments.entry(id).or_default();
            collected.extend(comments.into_iter().filter(|c| !c.is_empty()));
        }

        self.pages.push(page);
    }

    /// Record a file that produced no page
    pub fn add_failure(&mut self, filename: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FileError {
            filename: filename.into(),
            message: message.into(),
        });
    }

    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Close the batch: group totals and summary in dictionary order, then
    /// the leftovers as unknown totals, then footnotes.
    #[must_use]
    pub fn finish(mut self) -> Data {
        let mut data = Data {
            pages: std::mem::take(&mut self.pages),
            errors: std::mem::take(&mut self.errors),
            ..Data::default()
        };

        for (idx, group) in self.dictionary.groups().iter().enumerate() {
            let Some(canonical) = group.first() else {
                continue;
            };
            let id = canonical.bare_id();
            let total = self.overall.shift_remove(&id).unwrap_or(0);
            let noted = self.comments.get(&id).map_or(0, Vec::len);

            data.summary
                .push_str(&self.wording.summary_line(idx + 1, &canonical.name, total, noted));
            data.total.push(Entry::new(id, total));
        }

        for (id, count) in self.overall {
            let label = if id.kind().is_empty() {
                self.wording.other_label.clone()
            } else {
                id.kind().to_string()
            };
            data.total_unknown.push(UnknownTotal { id, count, label });
        }

        data.footnotes = self
            .comments
            .into_iter()
            .filter(|(_, comments)| !comments.is_empty())
            .map(|(id, comments)| Footnote { id, comments })
            .collect();

        data
    }
}
