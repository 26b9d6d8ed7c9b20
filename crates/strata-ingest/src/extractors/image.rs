//! Image OCR.

use super::Extractor;
use crate::error::IngestResult;
use std::path::Path;
use std::sync::Arc;
use strata_core::{FileType, Strategy};
use strata_process::OcrEngine;
use tracing::debug;

/// Extractor running OCR over image files.
pub struct ImageExtractor {
    ocr: Arc<dyn OcrEngine>,
}

impl ImageExtractor {
    pub fn new(ocr: Arc<dyn OcrEngine>) -> Self {
        Self { ocr }
    }
}

impl Extractor for ImageExtractor {
    fn strategy(&self) -> Strategy {
        Strategy::ImageOcr
    }

    fn file_type(&self, _path: &Path) -> FileType {
        FileType::Image
    }

    fn read(&self, path: &Path) -> IngestResult<String> {
        debug!("Running OCR on {:?}", path);
        Ok(self.ocr.recognize(path)?)
    }
}
