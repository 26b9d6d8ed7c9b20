//! Source code, read verbatim.

use super::{file_name, Extractor};
use crate::error::IngestResult;
use std::path::Path;
use strata_core::{Extraction, FileType, Strategy};

/// Extractor storing UTF-8 source files as they are.
#[derive(Debug, Clone, Copy, Default)]
pub struct CodeExtractor;

impl Extractor for CodeExtractor {
    fn strategy(&self) -> Strategy {
        Strategy::PlainCode
    }

    fn file_type(&self, _path: &Path) -> FileType {
        FileType::Code
    }

    fn read(&self, path: &Path) -> IngestResult<String> {
        Ok(std::fs::read_to_string(path)?)
    }

    /// Only an empty file has no text; blank lines are content.
    fn extract(&self, path: &Path) -> Extraction {
        match self.read(path) {
            Ok(text) => Extraction::from_verbatim(file_name(path), FileType::Code, text),
            Err(e) => Extraction::Failed(e.to_string()),
        }
    }
}
