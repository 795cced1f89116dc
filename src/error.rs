use thiserror::Error;

/// Errors raised inside the crate. The gateway converts every one of these
/// into orchestration state before anything reaches a caller.
#[derive(Debug, Error)]
pub enum WritingCoachError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transport error: {0}")]
    Transport(String),

    /// The model answered but produced no usable text (safety block, empty candidates).
    #[error("Model returned no text: {0}")]
    Model(String),

    #[error("Invalid image payload: {0}")]
    InvalidImage(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, WritingCoachError>;
