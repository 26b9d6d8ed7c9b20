//! Error types for the extraction engines.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for engine operations.
pub type ProcessResult<T> = Result<T, ProcessError>;

/// Errors that can occur inside an extraction engine.
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Tool not found: {tool}. Please install it.")]
    ToolNotFound { tool: String },

    #[error("Transcription error: {0}")]
    TranscriptionError(String),

    #[error("OCR error: {0}")]
    OcrError(String),

    #[error("PDF error: {0}")]
    PdfError(String),

    #[error("Page {page} out of range (document has {count} pages)")]
    PageOutOfRange { page: usize, count: usize },

    #[error("DOCX error: {0}")]
    DocxError(String),

    #[error("Process failed with exit code {code}: {stderr}")]
    ProcessFailed { code: i32, stderr: String },

    #[error("Parse error: {0}")]
    ParseError(String),
}

impl From<lopdf::Error> for ProcessError {
    fn from(err: lopdf::Error) -> Self {
        ProcessError::PdfError(err.to_string())
    }
}

/// Fail early when an input file is missing.
pub(crate) fn require_file(path: &std::path::Path) -> ProcessResult<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(ProcessError::FileNotFound(path.to_path_buf()))
    }
}

/// Fail early when an external program is not on `PATH`.
pub(crate) fn require_tool(program: &str) -> ProcessResult<()> {
    which::which(program)
        .map(|_| ())
        .map_err(|_| ProcessError::ToolNotFound {
            tool: program.to_string(),
        })
}
