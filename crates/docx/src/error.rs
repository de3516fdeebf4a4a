use thiserror::Error;

pub type Result<T> = std::result::Result<T, DocxError>;

#[derive(Error, Debug)]
pub enum DocxError {
    /// The container is not a readable zip archive
    #[error("Invalid archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// The archive lacks the main document part
    #[error("Missing document part: {0}")]
    MissingPart(&'static str),

    /// Malformed document XML
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
