//! Label tokenizer.
//!
//! A label looks like `впс «Кодима»` or `ГОРВ ВАК 123`: zero or more
//! qualifier phrases followed by a (possibly quoted) name.
//!
//! Qualifiers are found by longest-prefix matching against a fixed candidate
//! list, comparing one character at a time with simple Unicode uppercase
//! folding and dropping candidates as soon as they diverge from the input.
//! Among equal-length matches the candidate listed first wins. The matched
//! type keeps the candidate's spelling, not the input's.
//!
//! With [`QualifierPolicy::Repeat`] matching restarts after each qualifier
//! (whitespace in between is skipped) and all tokens are joined with single
//! spaces. [`QualifierPolicy::Once`] stops after the first qualifier.

use crate::config::{ParserConfig, QualifierPolicy, DEFAULT_QUALIFIERS};
use tally_protocol::QualifiedName;

/// Characters with the Unicode `Quotation_Mark` property
const QUOTATION_MARKS: &[char] = &[
    '\u{0022}', '\u{0027}', '\u{00AB}', '\u{00BB}', '\u{2018}', '\u{2019}', '\u{201A}',
    '\u{201B}', '\u{201C}', '\u{201D}', '\u{201E}', '\u{201F}', '\u{2039}', '\u{203A}',
    '\u{2E42}', '\u{300C}', '\u{300D}', '\u{300E}', '\u{300F}', '\u{301D}', '\u{301E}',
    '\u{301F}', '\u{FE41}', '\u{FE42}', '\u{FE43}', '\u{FE44}', '\u{FF02}', '\u{FF07}',
    '\u{FF62}', '\u{FF63}',
];

#[must_use]
pub fn is_quotation_mark(c: char) -> bool {
    QUOTATION_MARKS.contains(&c)
}

#[derive(Debug, Clone)]
struct Candidate {
    text: String,
    folded: Vec<char>,
}

/// Splits a raw label into qualifier and name
#[derive(Debug, Clone)]
pub struct NameTokenizer {
    candidates: Vec<Candidate>,
    policy: QualifierPolicy,
}

impl Default for NameTokenizer {
    fn default() -> Self {
        Self::new(DEFAULT_QUALIFIERS.iter().copied(), QualifierPolicy::default())
    }
}

impl NameTokenizer {
    /// Build a tokenizer from candidate phrases. Empty phrases are ignored.
    pub fn new<I, S>(qualifiers: I, policy: QualifierPolicy) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let candidates = qualifiers
            .into_iter()
            .filter(|q| !q.as_ref().is_empty())
            .map(|q| Candidate {
                text: q.as_ref().to_string(),
                folded: q.as_ref().chars().map(fold).collect(),
            })
            .collect();
        Self { candidates, policy }
    }

    #[must_use]
    pub fn from_config(config: &ParserConfig) -> Self {
        Self::new(&config.qualifiers, config.qualifier_policy)
    }

    pub fn qualifiers(&self) -> impl Iterator<Item = &str> {
        self.candidates.iter().map(|c| c.text.as_str())
    }

    #[must_use]
    pub fn policy(&self) -> QualifierPolicy {
        self.policy
    }

    /// Tokenize a label. Never fails; missing parts come back empty.
    #[must_use]
    pub fn tokenize(&self, raw: &str) -> QualifiedName {
        let input: Vec<char> = raw.chars().collect();
        let mut pos = 0;
        let mut kinds: Vec<&str> = Vec::new();

        loop {
            let matched = self.longest_match(&input[pos..]);
            if let Some(idx) = matched {
                let candidate = &self.candidates[idx];
                kinds.push(&candidate.text);
                pos += candidate.folded.len();
            }

            pos = skip_whitespace(&input, pos);

            if matched.is_none() || self.policy == QualifierPolicy::Once {
                break;
            }
        }

        QualifiedName {
            kind: kinds.join(" "),
            name: trim_quotes(&input[pos..]).iter().collect(),
        }
    }

    /// Index of the longest candidate that is a prefix of `rest`.
    fn longest_match(&self, rest: &[char]) -> Option<usize> {
        let mut live: Vec<usize> = (0..self.candidates.len()).collect();
        let mut best: Option<usize> = None;
        let mut best_len = 0;

        for (depth, &c) in rest.iter().enumerate() {
            if live.is_empty() {
                break;
            }
            let c = fold(c);
            live.retain(|&idx| self.candidates[idx].folded.get(depth) == Some(&c));

            let len = depth + 1;
            if len > best_len {
                if let Some(&idx) = live
                    .iter()
                    .find(|&&idx| self.candidates[idx].folded.len() == len)
                {
                    best = Some(idx);
                    best_len = len;
                }
            }
        }

        best
    }
}

/// Simple uppercase mapping; characters with multi-char uppercase forms
/// compare as themselves.
fn fold(c: char) -> char {
    let mut upper = c.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(u), None) => u,
        _ => c,
    }
}

fn skip_whitespace(input: &[char], mut pos: usize) -> usize {
    while pos < input.len() && input[pos].is_whitespace() {
        pos += 1;
    }
    pos
}

/// Drop one leading and one trailing quotation mark
fn trim_quotes(mut rest: &[char]) -> &[char] {
    if let Some((first, tail)) = rest.split_first() {
        if is_quotation_mark(*first) {
            rest = tail;
        }
    }
    if let Some((last, head)) = rest.split_last() {
        if is_quotation_mark(*last) {
            rest = head;
        }
    }
    rest
}
