use rdf_core::RdfError;
use thiserror::Error;

/// Errors returned by the forest trainer.
#[derive(Debug, Error)]
pub enum TrainerError {
    #[error("dataset error: {0}")]
    Dataset(String),

    #[error("training error: {0}")]
    Training(String),

    #[error("artifact serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("artifact io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<TrainerError> for RdfError {
    fn from(err: TrainerError) -> Self {
        match err {
            TrainerError::Io(io) => RdfError::Io(io),
            other => RdfError::Training(other.to_string()),
        }
    }
}
