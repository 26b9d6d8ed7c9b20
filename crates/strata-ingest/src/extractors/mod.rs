//! Extraction strategies, one per family of file extensions.

mod code;
mod image;
mod media;
mod office;
mod pdf;

pub use code::CodeExtractor;
pub use image::ImageExtractor;
pub use media::MediaExtractor;
pub use office::OfficeExtractor;
pub use pdf::PdfExtractor;

use crate::error::IngestResult;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use strata_config::Config;
use strata_core::{Extraction, FileType, Strategy};
use strata_process::{
    DocumentConverter, DocxReader, DocxRsReader, LopdfEngine, OcrEngine, PdfEngine,
    SofficeConverter, Tesseract, TesseractOptions, Transcriber, WhisperCli,
};

/// Trait for extraction strategies.
pub trait Extractor: Send + Sync {
    /// The strategy this extractor implements.
    fn strategy(&self) -> Strategy;

    /// File type recorded for `path`.
    fn file_type(&self, path: &Path) -> FileType;

    /// Read the raw text of `path`.
    fn read(&self, path: &Path) -> IngestResult<String>;

    /// Extract `path` into a record.
    ///
    /// Errors are reported as [`Extraction::Failed`] and never returned to the caller.
    fn extract(&self, path: &Path) -> Extraction {
        match self.read(path) {
            Ok(text) => Extraction::from_content(file_name(path), self.file_type(path), text),
            Err(e) => Extraction::Failed(e.to_string()),
        }
    }
}

/// Base name of a path as recorded in a text record.
pub(crate) fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// External engines shared by every worker.
#[derive(Clone)]
pub struct Engines {
    pub ocr: Arc<dyn OcrEngine>,
    pub transcriber: Arc<dyn Transcriber>,
    pub pdf: Arc<dyn PdfEngine>,
    pub converter: Arc<dyn DocumentConverter>,
    pub docx: Arc<dyn DocxReader>,
}

impl Engines {
    /// Build the command-line backed engines described by `config`.
    pub fn from_config(config: &Config) -> Self {
        let scratch = config.processing.scratch_path();

        let whisper = WhisperCli::new(config.processing.whisper_model.clone(), scratch.clone())
            .with_language(config.processing.whisper_language.clone());

        let ocr = Tesseract::new(TesseractOptions {
            language: config.ocr.language.clone(),
            oem: config.ocr.oem,
            psm: config.ocr.psm,
            dpi: config.ocr.dpi,
        });

        Self {
            ocr: Arc::new(ocr),
            transcriber: Arc::new(whisper),
            pdf: Arc::new(LopdfEngine::new(config.pdf.render_dpi, scratch)),
            converter: Arc::new(SofficeConverter::new(config.office.converter.clone())),
            docx: Arc::new(DocxRsReader),
        }
    }
}

/// Dispatch table from [`Strategy`] to its extractor.
pub struct Extractors {
    image: ImageExtractor,
    media: MediaExtractor,
    pdf: PdfExtractor,
    office: OfficeExtractor,
    code: CodeExtractor,
    scratch_dir: PathBuf,
}

impl Extractors {
    /// Wire every strategy to the given engines.
    ///
    /// `scratch_dir` receives temporary page images and converted documents.
    pub fn new(engines: Engines, scratch_dir: impl Into<PathBuf>) -> Self {
        let scratch_dir = scratch_dir.into();
        Self {
            image: ImageExtractor::new(Arc::clone(&engines.ocr)),
            media: MediaExtractor::new(engines.transcriber),
            pdf: PdfExtractor::new(engines.pdf, engines.ocr, scratch_dir.clone()),
            office: OfficeExtractor::new(engines.converter, engines.docx, scratch_dir.clone()),
            code: CodeExtractor,
            scratch_dir,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Engines::from_config(config),
            config.processing.scratch_path(),
        )
    }

    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    pub fn get(&self, strategy: Strategy) -> &dyn Extractor {
        match strategy {
            Strategy::ImageOcr => &self.image,
            Strategy::Transcription => &self.media,
            Strategy::Pdf => &self.pdf,
            Strategy::OfficeDocument => &self.office,
            Strategy::PlainCode => &self.code,
        }
    }
}
