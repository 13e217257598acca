use serde::Serialize;

/// Whole-document CSV failures. Individual bad rows are reported as
/// [`ImportRowError`] instead.
#[derive(Debug, thiserror::Error)]
pub enum CsvError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("csv output is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
    #[error("missing required column `{0}`")]
    MissingColumn(&'static str),
}

/// A single row that could not be imported
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportRowError {
    /// 1-based line number in the source text (the header is line 1)
    pub line: u64,
    pub message: String,
}

impl ImportRowError {
    pub fn new(line: u64, message: impl Into<String>) -> Self {
        ImportRowError {
            line,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ImportRowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}
