use thiserror::Error;

/// Batch-level failures. Any of these aborts the whole call with no output.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScoringError {
    #[error("Invalid batch: {0}")]
    InvalidBatch(String),

    #[error("Invalid record at index {index} ({field}): {reason}")]
    InvalidRecord {
        index: usize,
        field: &'static str,
        reason: String,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("{0}")]
    Other(String),
}

impl ScoringError {
    pub fn invalid_record(index: usize, field: &'static str, reason: impl Into<String>) -> Self {
        ScoringError::InvalidRecord {
            index,
            field,
            reason: reason.into(),
        }
    }

    pub fn config(reason: impl Into<String>) -> Self {
        ScoringError::Configuration(reason.into())
    }

    /// Stable machine-readable code, used in audit events.
    pub fn code(&self) -> &'static str {
        match self {
            ScoringError::InvalidBatch(_) => "INVALID_BATCH",
            ScoringError::InvalidRecord { .. } => "INVALID_RECORD",
            ScoringError::Configuration(_) => "CONFIGURATION_ERROR",
            ScoringError::Other(_) => "INTERNAL_ERROR",
        }
    }
}

pub type Result<T> = std::result::Result<T, ScoringError>;
