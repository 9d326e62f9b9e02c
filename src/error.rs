/// Errors raised while validating a profile or projecting dates.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum PredictionError {
    #[error("invalid {field}: {reason}")]
    InvalidLength { field: &'static str, reason: String },
    #[error("date arithmetic out of range")]
    DateOutOfRange,
}
