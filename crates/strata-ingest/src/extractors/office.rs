//! Word documents, converting legacy `.doc` files first.

use super::Extractor;
use crate::error::{IngestError, IngestResult};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use strata_core::{has_extension, FileType, Strategy, LEGACY_OFFICE_EXTENSIONS};
use strata_process::{ConversionResult, DocumentConverter, DocxReader};
use tracing::debug;

/// Extractor joining the paragraphs of `.docx` and `.doc` files.
pub struct OfficeExtractor {
    converter: Arc<dyn DocumentConverter>,
    reader: Arc<dyn DocxReader>,
    scratch_dir: PathBuf,
}

impl OfficeExtractor {
    pub fn new(
        converter: Arc<dyn DocumentConverter>,
        reader: Arc<dyn DocxReader>,
        scratch_dir: PathBuf,
    ) -> Self {
        Self {
            converter,
            reader,
            scratch_dir,
        }
    }

    fn paragraphs(&self, docx_path: &Path) -> IngestResult<String> {
        let paragraphs = self.reader.paragraphs(docx_path)?;
        debug!("Read {} paragraphs from {:?}", paragraphs.len(), docx_path);
        Ok(paragraphs.join("\n"))
    }

    /// Convert to `.docx` in a private directory that is removed afterwards.
    fn read_legacy(&self, path: &Path) -> IngestResult<String> {
        let work_dir = tempfile::Builder::new()
            .prefix("strata-convert-")
            .tempdir_in(&self.scratch_dir)?;

        match self.converter.convert(path, work_dir.path()) {
            ConversionResult::Success(converted) => self.paragraphs(&converted),
            ConversionResult::Failure(reason) => Err(IngestError::Conversion {
                path: path.to_path_buf(),
                reason,
            }),
        }
    }
}

impl Extractor for OfficeExtractor {
    fn strategy(&self) -> Strategy {
        Strategy::OfficeDocument
    }

    fn file_type(&self, _path: &Path) -> FileType {
        FileType::Docx
    }

    fn read(&self, path: &Path) -> IngestResult<String> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if has_extension(LEGACY_OFFICE_EXTENSIONS, ext) {
            self.read_legacy(path)
        } else {
            self.paragraphs(path)
        }
    }
}
