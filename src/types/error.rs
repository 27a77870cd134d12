use thiserror::Error;

/// fittrack error types
///
/// Every variant aborts the run before any output is written.
#[derive(Error, Debug)]
pub enum FittrackError {
    /// Failed to decode an input source (workbook JSON, delimited framing)
    #[error("parse error: {0}")]
    Parse(String),

    /// File I/O error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Requested sheet does not exist in the workbook
    #[error("sheet {0} not found")]
    SheetNotFound(String),

    /// Every sheet needs exactly one range
    #[error("same number of sheets and ranges required (got {sheets} sheets, {ranges} ranges)")]
    RangeMismatch { sheets: usize, ranges: usize },

    /// Malformed A1-style range
    #[error("invalid cell range: {0}")]
    InvalidRange(String),

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),

    /// Output serialization failed
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for fittrack
pub type Result<T> = std::result::Result<T, FittrackError>;

/// Why a single row was left out of the aggregate.
///
/// Never fatal: the pipeline counts these and moves on to the next row.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RowError {
    #[error("unparseable date '{0}'")]
    InvalidDate(String),

    #[error("unparseable number '{0}'")]
    InvalidNumber(String),

    #[error("negative distance '{0}'")]
    NegativeValue(String),

    #[error("unknown month abbreviation '{0}'")]
    UnknownMonth(String),

    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    #[error("row has {got} fields, expected at least {expected}")]
    TooFewFields { got: usize, expected: usize },

    #[error("subtotal row '{0}'")]
    Excluded(String),
}
