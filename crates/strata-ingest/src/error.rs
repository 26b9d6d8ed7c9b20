//! Error types for the ingestion pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for ingestion operations.
pub type IngestResult<T> = Result<T, IngestError>;

/// Errors that can occur during ingestion.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Engine(#[from] strata_process::ProcessError),

    #[error("Failed to create directory {path}: {source}")]
    Layout {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{path} is not inside {root}")]
    OutsideRoot { path: PathBuf, root: PathBuf },

    #[error("Conversion of {path} failed: {reason}")]
    Conversion { path: PathBuf, reason: String },

    #[error("Failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to move {from} to {to}: {source}")]
    MoveFailed {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid ignore pattern: {0}")]
    InvalidPattern(String),

    #[error("Watch error: {0}")]
    WatchError(String),
}
