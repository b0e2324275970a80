//! Feedback storage errors.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedbackError {
    #[error("failed to write feedback log: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode feedback entry: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("failed to format timestamp: {0}")]
    Timestamp(#[from] time::error::Format),
}
