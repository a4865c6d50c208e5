//! Error types for the forest update core

use thiserror::Error;

/// Errors that can occur while encoding data and dispatching training
#[derive(Error, Debug)]
pub enum RdfError {
    /// Invalid configuration or hyperparameters
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Invalid input schema
    #[error("Invalid input schema: {0}")]
    Schema(String),

    /// Configuration source could not be loaded
    #[error("Configuration source error: {0}")]
    ConfigSource(#[from] config::ConfigError),

    /// A record did not have one field per schema feature
    #[error("Record has {found} fields, expected {expected}")]
    RecordLength { expected: usize, found: usize },

    /// A numeric field could not be parsed
    #[error("Feature {index}: invalid numeric value {value:?}")]
    InvalidNumber { index: usize, value: String },

    /// An input line could not be split into fields
    #[error("Malformed input line: {0}")]
    MalformedLine(String),

    /// A categorical value has no ordinal encoding
    #[error("Feature {index}: no encoding for categorical value {value:?}")]
    UnseenCategory { index: usize, value: String },

    /// The target column was never visited or held NaN while encoding a record
    #[error("Target label was not assigned while encoding record")]
    MissingLabel,

    /// A classification target has no value encoding
    #[error("Classification target {0} has no value encoding")]
    MissingTargetEncoding(usize),

    /// No records to train on
    #[error("Training data is empty")]
    EmptyDataset,

    /// The forest trainer reported a failure
    #[error("Training failed: {0}")]
    Training(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of an [`RdfError`]
///
/// Every kind is fatal for the current invocation; the kind only tells the
/// caller where the problem originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rejected before any data pass
    Configuration,
    /// A bad input record
    Data,
    /// An invariant of the pipeline was broken
    Internal,
    /// Reported by the external trainer
    Training,
    /// Surrounding I/O
    Io,
}

impl RdfError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RdfError::Config(_) | RdfError::Schema(_) | RdfError::ConfigSource(_) => {
                ErrorKind::Configuration
            }
            RdfError::RecordLength { .. }
            | RdfError::InvalidNumber { .. }
            | RdfError::MalformedLine(_)
            | RdfError::EmptyDataset => ErrorKind::Data,
            RdfError::UnseenCategory { .. }
            | RdfError::MissingLabel
            | RdfError::MissingTargetEncoding(_) => ErrorKind::Internal,
            RdfError::Training(_) => ErrorKind::Training,
            RdfError::Io(_) => ErrorKind::Io,
        }
    }
}

/// Result type for forest update operations
pub type Result<T> = std::result::Result<T, RdfError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(RdfError::Config("x".into()).kind(), ErrorKind::Configuration);
        assert_eq!(
            RdfError::RecordLength { expected: 3, found: 2 }.kind(),
            ErrorKind::Data
        );
        assert_eq!(RdfError::MissingLabel.kind(), ErrorKind::Internal);
        assert_eq!(
            RdfError::UnseenCategory { index: 0, value: "x".into() }.kind(),
            ErrorKind::Internal
        );
    }

    #[test]
    fn test_error_messages_name_the_column() {
        let err = RdfError::InvalidNumber { index: 2, value: "abc".into() };
        assert_eq!(err.to_string(), "Feature 2: invalid numeric value \"abc\"");
    }
}
