use indexmap::IndexMap;
use std::collections::HashMap;
use tally_protocol::{Dictionary, Id, QualifiedName, Record};

/// Per-file early filter: when enabled, records ending before
/// `cutoff_hour` are left out of every count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EarlyFilter {
    pub enabled: bool,
    pub cutoff_hour: u8,
}

impl EarlyFilter {
    pub const OFF: Self = Self {
        enabled: false,
        cutoff_hour: 0,
    };

    pub fn new(enabled: bool, cutoff_hour: u8) -> Self {
        Self {
            enabled,
            cutoff_hour,
        }
    }

    #[must_use]
    pub fn excludes(&self, record: &Record) -> bool {
        self.enabled && record.end_hour < self.cutoff_hour
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Known,
    Unknown,
    Excluded,
}

/// Counts for one file.
///
/// `known` is seeded with every dictionary name so zero counts survive.
/// Unknown names are keyed by their full id (hint included); `unknown` and
/// `commented` keep first-seen order.
#[derive(Debug, Clone, Default)]
pub struct Tally {
    known: HashMap<QualifiedName, usize>,
    unknown: IndexMap<Id, usize>,
    commented: IndexMap<Id, Vec<String>>,
}

impl Tally {
    #[must_use]
    pub fn seeded(dictionary: &Dictionary) -> Self {
        Self {
            known: dictionary.identities().map(|q| (q.clone(), 0)).collect(),
            ..Self::default()
        }
    }

    /// Count every record in order; returns how many the filter excluded.
    pub fn process(&mut self, records: &[Record], filter: EarlyFilter) -> usize {
        let mut excluded = 0;
        for record in records {
            if filter.excludes(record) {
                excluded += 1;
                continue;
            }
            self.record(record);
        }
        excluded
    }

    /// Count one record, as known when its qualified name is in the
    /// dictionary and as unknown otherwise.
    pub fn record(&mut self, record: &Record) -> Classification {
        let Some(count) = self.known.get_mut(&record.id.qualified) else {
            *self.unknown.entry(record.id.clone()).or_insert(0) += 1;
            self.note(record.id.clone(), &record.comment);
            return Classification::Unknown;
        };

        *count += 1;
        self.note(record.id.qualified.bare_id(), &record.comment);
        Classification::Known
    }

    fn note(&mut self, id: Id, comment: &str) {
        if comment.is_empty() {
            return;
        }
        self.commented
            .entry(id)
            .or_default()
            .push(comment.to_string());
    }

    #[must_use]
    pub fn is_known(&self, name: &QualifiedName) -> bool {
        self.known.contains_key(name)
    }

    /// Count for a dictionary name (0 for names outside the dictionary)
    #[must_use]
    pub fn known_count(&self, name: &QualifiedName) -> usize {
        self.known.get(name).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn unknown(&self) -> &IndexMap<Id, usize> {
        &self.unknown
    }

    #[must_use]
    pub fn commented(&self) -> &IndexMap<Id, Vec<String>> {
        &self.commented
    }

    pub(crate) fn into_parts(self) -> (IndexMap<Id, usize>, IndexMap<Id, Vec<String>>) {
        (self.unknown, self.commented)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn dictionary() -> Dictionary {
        Dictionary::new(vec![
            vec![QualifiedName::new("впс", "X"), QualifiedName::new("впс", "X2")],
            vec![QualifiedName::new("ГОРВ", "ВАК")],
        ])
        .unwrap()
    }

    fn record(kind: &str, name: &str, hint: &str, hour: u8, comment: &str) -> Record {
        Record {
            id: Id::new(QualifiedName::new(kind, name), hint),
            end_hour: hour,
            comment: comment.to_string(),
        }
    }

    #[test]
    fn seeds_every_dictionary_name_with_zero() {
        let tally = Tally::seeded(&dictionary());
        assert!(tally.is_known(&QualifiedName::new("впс", "X2")));
        assert_eq!(tally.known_count(&QualifiedName::new("ГОРВ", "ВАК")), 0);
        assert!(tally.unknown().is_empty());
    }

    #[test]
    fn hint_is_ignored_for_known_names() {
        let mut tally = Tally::seeded(&dictionary());
        assert_eq!(
            tally.record(&record("впс", "X", "борт 1", 19, "note a")),
            Classification::Known
        );
        assert_eq!(
            tally.record(&record("впс", "X", "борт 2", 20, "note b")),
            Classification::Known
        );

        assert_eq!(tally.known_count(&QualifiedName::new("впс", "X")), 2);
        let bare = QualifiedName::new("впс", "X").bare_id();
        assert_eq!(tally.commented()[&bare], vec!["note a", "note b"]);
        assert_eq!(tally.commented().len(), 1);
    }

    #[test]
    fn unknown_names_are_split_by_hint() {
        let mut tally = Tally::seeded(&dictionary());
        tally.record(&record("впс", "Y", "a", 19, ""));
        tally.record(&record("впс", "Y", "b", 19, "seen"));
        tally.record(&record("впс", "Y", "a", 19, ""));

        let counts: Vec<(String, usize)> = tally
            .unknown()
            .iter()
            .map(|(id, n)| (id.hint.clone(), *n))
            .collect();
        assert_eq!(counts, vec![("a".to_string(), 2), ("b".to_string(), 1)]);

        let noted: Vec<&Id> = tally.commented().keys().collect();
        assert_eq!(noted, vec![&Id::new(QualifiedName::new("впс", "Y"), "b")]);
    }

    #[test]
    fn qualifier_is_part_of_identity() {
        let mut tally = Tally::seeded(&dictionary());
        assert_eq!(
            tally.record(&record("віпс", "X", "", 19, "")),
            Classification::Unknown
        );
        assert_eq!(tally.known_count(&QualifiedName::new("впс", "X")), 0);
    }

    #[test]
    fn early_filter_excludes_from_both_tallies() {
        let records = vec![
            record("впс", "X", "", 17, "early note"),
            record("впс", "Z", "", 9, ""),
            record("впс", "X", "", 18, ""),
            record("впс", "Z", "", 23, ""),
        ];

        let mut filtered = Tally::seeded(&dictionary());
        let excluded = filtered.process(&records, EarlyFilter::new(true, 18));
        assert_eq!(excluded, 2);
        assert_eq!(filtered.known_count(&QualifiedName::new("впс", "X")), 1);
        assert_eq!(filtered.unknown().values().sum::<usize>(), 1);
        assert!(filtered.commented().is_empty());

        let mut unfiltered = Tally::seeded(&dictionary());
        assert_eq!(unfiltered.process(&records, EarlyFilter::OFF), 0);
        assert_eq!(unfiltered.known_count(&QualifiedName::new("впс", "X")), 2);
        assert_eq!(unfiltered.unknown().values().sum::<usize>(), 2);
    }

    #[test]
    fn every_record_lands_in_exactly_one_tally() {
        let records = vec![
            record("впс", "X", "", 19, ""),
            record("", "X", "", 19, ""),
            record("ГОРВ", "ВАК", "h", 19, ""),
            record("ГОРВ", "ВАЗ", "", 19, ""),
            record("впс", "X2", "", 19, ""),
        ];
        let mut tally = Tally::seeded(&dictionary());
        tally.process(&records, EarlyFilter::OFF);

        let dict = dictionary();
        let known: usize = dict.identities().map(|q| tally.known_count(q)).sum();
        let unknown: usize = tally.unknown().values().sum();
        assert_eq!(known, 3);
        assert_eq!(unknown, 2);
        assert_eq!(known + unknown, records.len());
    }
}
