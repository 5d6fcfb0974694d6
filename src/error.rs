use thiserror::Error;

/// Failures surfaced while loading trip data or talking to the user.
///
/// Recoverable conditions (an invalid menu answer, a missing optional
/// column, an empty filter result) are handled in place and never show up
/// here.
#[derive(Debug, Error)]
pub enum BikeshareError {
    #[error("unsupported data file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("data source is missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("row {row}: invalid start time '{value}'")]
    InvalidTimestamp { row: usize, value: String },

    #[error("row {row}: invalid value in column '{column}'")]
    InvalidValue { row: usize, column: &'static str },

    #[error("input closed while waiting for an answer")]
    InputClosed,
}
