use crate::error::{DocxError, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{Cursor, Read};
use tally_parser::{Cell, Row, Table, TableSource};
use zip::result::ZipError;
use zip::ZipArchive;

/// Main body part of a WordprocessingML package
pub const DOCUMENT_PART: &str = "word/document.xml";

/// Tables of a parsed `.docx` body.
///
/// Only top-level tables are kept. A cell's paragraphs are its direct
/// `w:p` children; tables nested inside cells are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocxDocument {
    tables: Vec<Table>,
}

impl DocxDocument {
    /// Parse a `.docx` package from memory
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;
        let mut part = archive.by_name(DOCUMENT_PART).map_err(|err| match err {
            ZipError::FileNotFound => DocxError::MissingPart(DOCUMENT_PART),
            other => DocxError::Zip(other),
        })?;

        let mut xml = Vec::new();
        part.read_to_end(&mut xml)?;
        Self::from_document_xml(&xml)
    }

    /// Parse the `word/document.xml` part directly
    pub fn from_document_xml(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        let mut buf = Vec::new();
        let mut walker = TableWalker::default();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => walker.open(e.local_name().as_ref()),
                Event::Empty(e) => walker.empty(e.local_name().as_ref()),
                Event::End(e) => walker.close(e.local_name().as_ref()),
                Event::Text(t) => {
                    if walker.wants_text() {
                        walker.text(&t.unescape()?);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(Self {
            tables: walker.tables,
        })
    }

    #[must_use]
    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    #[must_use]
    pub fn find_first_table(&self) -> Option<&Table> {
        self.tables.first()
    }
}

impl TableSource for DocxDocument {
    fn first_table(&self) -> Option<&Table> {
        self.find_first_table()
    }
}

/// Builds tables from a stream of element events
#[derive(Default)]
struct TableWalker {
    tables: Vec<Table>,
    depth: usize,
    table: Table,
    row: Option<Row>,
    cell: Option<Cell>,
    paragraph: Option<String>,
    in_text: bool,
}

impl TableWalker {
    fn top_level(&self) -> bool {
        self.depth == 1
    }

    fn open(&mut self, name: &[u8]) {
        match name {
            b"tbl" => {
                self.depth += 1;
                if self.top_level() {
                    self.table = Table::default();
                }
            }
            b"tr" if self.top_level() => self.row = Some(Row::default()),
            b"tc" if self.top_level() => self.cell = Some(Cell::default()),
            b"p" if self.top_level() && self.cell.is_some() => {
                self.paragraph = Some(String::new());
            }
            b"t" if self.paragraph.is_some() => self.in_text = true,
            _ => {}
        }
    }

    fn empty(&mut self, name: &[u8]) {
        match name {
            b"tab" => self.push_char('\t'),
            b"br" | b"cr" => self.push_char('\n'),
            b"p" if self.top_level() => {
                if let Some(cell) = self.cell.as_mut() {
                    cell.paragraphs.push(String::new());
                }
            }
            _ => {}
        }
    }

    fn close(&mut self, name: &[u8]) {
        match name {
            b"t" => self.in_text = false,
            b"p" if self.top_level() => {
                if let (Some(paragraph), Some(cell)) = (self.paragraph.take(), self.cell.as_mut()) {
                    cell.paragraphs.push(paragraph);
                }
            }
            b"tc" if self.top_level() => {
                if let (Some(cell), Some(row)) = (self.cell.take(), self.row.as_mut()) {
                    row.cells.push(cell);
                }
            }
            b"tr" if self.top_level() => {
                if let Some(row) = self.row.take() {
                    self.table.rows.push(row);
                }
            }
            b"tbl" => {
                if self.top_level() {
                    self.tables.push(std::mem::take(&mut self.table));
                }
                self.depth = self.depth.saturating_sub(1);
            }
            _ => {}
        }
    }

    fn wants_text(&self) -> bool {
        self.in_text && self.paragraph.is_some()
    }

    fn text(&mut self, value: &str) {
        if let Some(paragraph) = self.paragraph.as_mut() {
            paragraph.push_str(value);
        }
    }

    fn push_char(&mut self, c: char) {
        if let Some(paragraph) = self.paragraph.as_mut() {
            paragraph.push(c);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn body(inner: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{inner}</w:body></w:document>"#
        )
    }

    #[test]
    fn reads_cells_and_paragraphs() {
        let xml = body(
            r#"<w:p><w:r><w:t>Title</w:t></w:r></w:p>
<w:tbl><w:tblPr/>
  <w:tr><w:tc><w:p><w:r><w:t>a</w:t></w:r><w:r><w:t xml:space="preserve"> b</w:t></w:r></w:p><w:p><w:r><w:t>c</w:t></w:r></w:p></w:tc>
        <w:tc><w:p/></w:tc></w:tr>
  <w:tr><w:tc><w:p><w:r><w:t>x</w:t><w:tab/><w:t>y</w:t><w:br/><w:t>&amp;z</w:t></w:r></w:p></w:tc></w:tr>
</w:tbl>
<w:tbl><w:tr><w:tc><w:p><w:r><w:t>second</w:t></w:r></w:p></w:tc></w:tr></w:tbl>"#,
        );

        let doc = DocxDocument::from_document_xml(xml.as_bytes()).unwrap();
        assert_eq!(doc.tables().len(), 2);

        let table = doc.find_first_table().unwrap();
        assert_eq!(
            *table,
            Table::from_rows(vec![
                vec![vec!["a b", "c"], vec![""]],
                vec![vec!["x\ty\n&z"]],
            ])
        );
        assert_eq!(doc.tables()[1].rows[0].cells[0].first_paragraph(), "second");
    }

    #[test]
    fn nested_tables_stay_inside_their_cell() {
        let xml = body(
            r#"<w:tbl><w:tr><w:tc>
  <w:p><w:r><w:t>outer</w:t></w:r></w:p>
  <w:tbl><w:tr><w:tc><w:p><w:r><w:t>inner</w:t></w:r></w:p></w:tc></w:tr></w:tbl>
  <w:p><w:r><w:t>after</w:t></w:r></w:p>
</w:tc></w:tr></w:tbl>"#,
        );

        let doc = DocxDocument::from_document_xml(xml.as_bytes()).unwrap();
        assert_eq!(doc.tables().len(), 1);
        assert_eq!(
            doc.tables()[0].rows[0].cells[0].paragraphs,
            vec!["outer", "after"]
        );
    }

    #[test]
    fn document_without_tables() {
        let xml = body("<w:p><w:r><w:t>no tables here</w:t></w:r></w:p>");
        let doc = DocxDocument::from_document_xml(xml.as_bytes()).unwrap();
        assert!(doc.find_first_table().is_none());
        assert!(doc.first_table().is_none());
    }

    #[test]
    fn rejects_bytes_that_are_not_a_package() {
        let err = DocxDocument::parse(b"plain text, not a zip").unwrap_err();
        assert!(matches!(err, DocxError::Zip(_)), "{err}");
    }
}
