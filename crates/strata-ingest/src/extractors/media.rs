//! Audio and video transcription.

use super::Extractor;
use crate::error::IngestResult;
use std::path::Path;
use std::sync::Arc;
use strata_core::{FileType, Strategy};
use strata_process::Transcriber;
use tracing::info;

/// Extractor transcribing speech from audio and video files.
pub struct MediaExtractor {
    transcriber: Arc<dyn Transcriber>,
}

impl MediaExtractor {
    pub fn new(transcriber: Arc<dyn Transcriber>) -> Self {
        Self { transcriber }
    }
}

impl Extractor for MediaExtractor {
    fn strategy(&self) -> Strategy {
        Strategy::Transcription
    }

    fn file_type(&self, path: &Path) -> FileType {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        FileType::for_media(ext)
    }

    fn read(&self, path: &Path) -> IngestResult<String> {
        info!("Transcribing {:?}", path);
        Ok(self.transcriber.transcribe(path)?)
    }
}
