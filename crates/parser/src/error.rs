use thiserror::Error;

/// Result type for parser operations
pub type Result<T> = std::result::Result<T, ParserError>;

/// Errors raised while configuring the parser.
///
/// Row-level problems never surface here: unreadable rows are skipped.
#[derive(Error, Debug)]
pub enum ParserError {
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Table could not be decoded from JSON
    #[error("Invalid table JSON: {0}")]
    TableJson(#[from] serde_json::Error),
}

impl ParserError {
    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
