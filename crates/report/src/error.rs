use thiserror::Error;

pub type Result<T> = std::result::Result<T, ReportError>;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Parser error: {0}")]
    Parser(#[from] tally_parser::ParserError),

    #[error("Invalid report settings: {0}")]
    InvalidSettings(String),
}
