use thiserror::Error;

pub type MmmResult<T> = Result<T, MmmError>;

#[derive(Error, Debug)]
pub enum MmmError {
    #[error("Aligned dataset is empty: {0}")]
    EmptyDataset(String),

    #[error("No channel cost columns found (expected keys ending in '{0}')")]
    NoChannelData(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Computation error: {0}")]
    Computation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
