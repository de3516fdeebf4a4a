//! Reads the documents behind a tally report: `.docx` files (first table of
//! the body) and `.zip` archives of such files.

mod archive;
mod document;
mod error;

pub use archive::{collect_uploads, unpack_archive, FileDescriptor};
pub use document::{DocxDocument, DOCUMENT_PART};
pub use error::{DocxError, Result};
