//! # Tally Parser
//!
//! Turns activity-log tables into [`Record`](tally_protocol::Record) values.
//!
//! ## Architecture
//!
//! ```text
//! Table (rows → cells → paragraphs)
//!     │
//!     ├──> skip header row
//!     │
//!     ├──> per row
//!     │    ├─> end time column → hour (row skipped when unreadable)
//!     │    ├─> label column   → NameTokenizer → {type, name} + hint
//!     │    └─> comment column → normalized notes, sentinel dropped
//!     │
//!     └──> Record[] in row order
//! ```
//!
//! ## Example
//!
//! ```rust
//! use tally_parser::NameTokenizer;
//!
//! let tokenizer = NameTokenizer::default();
//! let name = tokenizer.tokenize("впс «Кодима»");
//! assert_eq!(name.kind, "впс");
//! assert_eq!(name.name, "Кодима");
//! ```

mod config;
mod error;
mod extractor;
mod table;
mod tokenizer;

pub use config::{ColumnLayout, ParserConfig, QualifierPolicy, DEFAULT_QUALIFIERS, NONE_DETECTED};
pub use error::{ParserError, Result};
pub use extractor::{ExtractOutcome, RecordExtractor};
pub use table::{Cell, Row, Table, TableSource};
pub use tokenizer::{is_quotation_mark, NameTokenizer};
