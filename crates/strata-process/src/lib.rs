//! Strata Process - External extraction engines.
//!
//! This crate provides:
//! - OCR for images (via Tesseract CLI)
//! - Audio/video transcription (via Whisper CLI)
//! - PDF page text (lopdf) and page rendering (via `pdftoppm`)
//! - Legacy document conversion (via LibreOffice) and `.docx` paragraphs (docx-rs)
//!
//! Each engine sits behind a trait so the pipeline can be driven by other backends.

mod error;
mod ocr;
mod office;
mod pdf;
mod transcribe;

pub use error::{ProcessError, ProcessResult};
pub use ocr::{OcrEngine, Tesseract, TesseractOptions};
pub use office::{ConversionResult, DocumentConverter, DocxReader, DocxRsReader, SofficeConverter};
pub use pdf::{LopdfEngine, PdfDocument, PdfEngine};
pub use transcribe::{Transcriber, WhisperCli};

/// Check if the external tools used by the default engines are available.
pub fn check_dependencies(office_converter: &str) -> Vec<(String, bool)> {
    ["tesseract", "whisper", "pdftoppm", office_converter]
        .iter()
        .map(|tool| (tool.to_string(), which::which(tool).is_ok()))
        .collect()
}
