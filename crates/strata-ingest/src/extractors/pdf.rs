//! PDF text with an OCR fallback for scanned pages.

use super::Extractor;
use crate::error::{IngestError, IngestResult};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use strata_core::{FileType, Strategy};
use strata_process::{OcrEngine, PdfDocument, PdfEngine};
use tracing::{debug, info, warn};

/// Extractor for PDF documents.
///
/// Pages without a text layer are rendered to a temporary PNG in the scratch
/// directory and passed through OCR. The image is removed whatever the outcome.
pub struct PdfExtractor {
    engine: Arc<dyn PdfEngine>,
    ocr: Arc<dyn OcrEngine>,
    scratch_dir: PathBuf,
}

impl PdfExtractor {
    pub fn new(engine: Arc<dyn PdfEngine>, ocr: Arc<dyn OcrEngine>, scratch_dir: PathBuf) -> Self {
        Self {
            engine,
            ocr,
            scratch_dir,
        }
    }

    fn ocr_page(&self, document: &dyn PdfDocument, index: usize) -> IngestResult<String> {
        let png = document.render_page(index)?;

        let raster = tempfile::Builder::new()
            .prefix("strata-page-")
            .suffix(".png")
            .tempfile_in(&self.scratch_dir)?;
        std::fs::write(raster.path(), &png)?;

        let recognized = self.ocr.recognize(raster.path());

        let raster_path = raster.path().to_path_buf();
        if let Err(e) = raster.close() {
            warn!("Failed to remove page image {:?}: {}", raster_path, e);
        }

        Ok(recognized?)
    }
}

impl Extractor for PdfExtractor {
    fn strategy(&self) -> Strategy {
        Strategy::Pdf
    }

    fn file_type(&self, _path: &Path) -> FileType {
        FileType::Pdf
    }

    fn read(&self, path: &Path) -> IngestResult<String> {
        let document = self.engine.open(path)?;
        let page_count = document.page_count();
        debug!("Reading {} pages from {:?}", page_count, path);

        let mut text = String::new();
        let mut fallback_error: Option<IngestError> = None;

        for index in 0..page_count {
            let page_text = match document.page_text(index) {
                Ok(page_text) => page_text,
                Err(e) => {
                    debug!("No text layer on page {} of {:?}: {}", index + 1, path, e);
                    String::new()
                }
            };

            if !page_text.trim().is_empty() {
                text.push_str(&page_text);
                continue;
            }

            info!("Page {} of {:?} has no text, running OCR", index + 1, path);
            match self.ocr_page(document.as_ref(), index) {
                Ok(recognized) => text.push_str(&recognized),
                Err(e) => {
                    warn!("OCR failed on page {} of {:?}: {}", index + 1, path, e);
                    fallback_error = Some(e);
                }
            }
        }

        // A document that yielded nothing because every fallback failed is an error,
        // not an empty document
        match fallback_error {
            Some(e) if text.trim().is_empty() => Err(e),
            _ => Ok(text),
        }
    }
}
