use crate::error::Result;
use serde::{Deserialize, Serialize};

/// A document table: ordered rows of ordered cells of paragraph texts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub rows: Vec<Row>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    pub cells: Vec<Cell>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub paragraphs: Vec<String>,
}

impl Table {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    /// Build a table from plain cell texts; each cell holds its paragraphs.
    pub fn from_rows<R, C, P>(rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator<Item = P>,
        P: IntoIterator,
        P::Item: Into<String>,
    {
        Self {
            rows: rows
                .into_iter()
                .map(|cells| Row {
                    cells: cells
                        .into_iter()
                        .map(|paragraphs| Cell {
                            paragraphs: paragraphs.into_iter().map(Into::into).collect(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }

    /// Parse the JSON form used for fixtures and `.json` report inputs
    pub fn from_json_str(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl Row {
    #[must_use]
    pub fn cell(&self, idx: usize) -> Option<&Cell> {
        self.cells.get(idx)
    }
}

impl Cell {
    /// First paragraph, or "" for an empty cell
    #[must_use]
    pub fn first_paragraph(&self) -> &str {
        self.paragraphs.first().map_or("", String::as_str)
    }
}

/// Anything a table can be pulled from (a parsed document, a fixture).
pub trait TableSource {
    /// First table in document order, if any
    fn first_table(&self) -> Option<&Table>;
}

impl TableSource for Table {
    fn first_table(&self) -> Option<&Table> {
        Some(self)
    }
}
