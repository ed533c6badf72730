//! Error types for algoviz-vis.

use thiserror::Error;

/// Result type for visualization operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while driving playback or serving it.
#[derive(Debug, Error)]
pub enum Error {
    /// Input rejected or algorithm/input mismatch
    #[error(transparent)]
    Trace(#[from] algoviz_trace::Error),

    /// Invalid configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<algoviz_trace::ValidationError> for Error {
    fn from(e: algoviz_trace::ValidationError) -> Self {
        Error::Trace(e.into())
    }
}
