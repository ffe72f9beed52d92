use std::fmt;

/// A marker line was found but its expected sub-structure was not.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}: cannot read {field}: {reason}")]
pub struct ParseError {
    /// 1-based line number in the catalog.
    pub line: usize,
    pub field: &'static str,
    pub reason: ParseFailure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseFailure {
    /// The line has no `[` delimiter.
    MissingBracket,
    /// The line has no digit characters.
    MissingDigits,
    /// The digits do not fit an unsigned 64-bit id.
    IdOverflow,
}

impl fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseFailure::MissingBracket => write!(f, "missing '[' delimiter"),
            ParseFailure::MissingDigits => write!(f, "no digits found"),
            ParseFailure::IdOverflow => write!(f, "id does not fit in 64 bits"),
        }
    }
}

/// The sink was handed a row whose field names differ from the declared header.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WriteError {
    #[error("row does not match header (missing: {missing:?}, unexpected: {unexpected:?})")]
    FieldMismatch {
        missing: Vec<String>,
        unexpected: Vec<String>,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("write error: {0}")]
    Write(#[from] WriteError),
    #[error("record ending at line {line} is missing fields: {}", missing.join(", "))]
    IncompleteRecord {
        line: usize,
        missing: Vec<&'static str>,
    },
    #[error("failed to read catalog: {0}")]
    CatalogRead(std::io::Error),
    #[error("failed to open store: {0}")]
    StoreOpen(std::io::Error),
    #[error("failed to write store: {0}")]
    StoreWrite(std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type CatalogResult<T> = std::result::Result<T, CatalogError>;
