//! In-memory engines for tests.
//!
//! Every fake reads the file it is given and derives its answer from the contents:
//! `ERROR...` makes the engine fail, `PANIC` makes it panic, and `SLOW` delays it.

use crate::extractors::Engines;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use strata_process::{
    ConversionResult, DocumentConverter, DocxReader, OcrEngine, PdfDocument, PdfEngine,
    ProcessError, ProcessResult, Transcriber,
};

fn echo(path: &Path) -> ProcessResult<String> {
    let text = std::fs::read_to_string(path)?;
    if text.starts_with("ERROR") {
        return Err(ProcessError::ProcessFailed {
            code: 1,
            stderr: text,
        });
    }
    if text.starts_with("PANIC") {
        panic!("engine crashed on {:?}", path);
    }
    if text.starts_with("SLOW") {
        std::thread::sleep(Duration::from_millis(300));
    }
    Ok(text)
}

/// OCR returning the image's bytes as text and recording every image it saw.
#[derive(Default)]
pub struct EchoOcr {
    seen: Mutex<Vec<PathBuf>>,
}

impl EchoOcr {
    pub fn seen(&self) -> Vec<PathBuf> {
        self.seen.lock().unwrap().clone()
    }
}

impl OcrEngine for EchoOcr {
    fn recognize(&self, image_path: &Path) -> ProcessResult<String> {
        self.seen.lock().unwrap().push(image_path.to_path_buf());
        echo(image_path)
    }
}

/// Transcriber returning the media file's contents.
#[derive(Default)]
pub struct EchoTranscriber {
    calls: AtomicUsize,
    active: AtomicUsize,
    peak: AtomicUsize,
}

impl EchoTranscriber {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Most transcriptions that were ever running at once.
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

impl Transcriber for EchoTranscriber {
    fn transcribe(&self, media_path: &Path) -> ProcessResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        let result = echo(media_path);
        self.active.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

/// PDF engine treating the file as form-feed separated pages.
///
/// A `scan:X` page has no text layer and renders to `X`; a `garbled:X` page fails
/// text extraction and renders to `X`. A file starting with `CORRUPT` cannot be opened.
#[derive(Default)]
pub struct FakePdfEngine;

struct FakePdfDocument {
    pages: Vec<String>,
}

impl PdfEngine for FakePdfEngine {
    fn open(&self, path: &Path) -> ProcessResult<Box<dyn PdfDocument>> {
        let text = std::fs::read_to_string(path)?;
        if text.starts_with("CORRUPT") {
            return Err(ProcessError::PdfError("invalid file header".to_string()));
        }
        let pages = text.split('\x0c').map(str::to_string).collect();
        Ok(Box::new(FakePdfDocument { pages }))
    }
}

impl FakePdfDocument {
    fn page(&self, index: usize) -> ProcessResult<&str> {
        self.pages
            .get(index)
            .map(String::as_str)
            .ok_or(ProcessError::PageOutOfRange {
                page: index,
                count: self.pages.len(),
            })
    }
}

impl PdfDocument for FakePdfDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_text(&self, index: usize) -> ProcessResult<String> {
        let page = self.page(index)?;
        if page.starts_with("scan:") {
            Ok(String::new())
        } else if page.starts_with("garbled:") {
            Err(ProcessError::PdfError("bad content stream".to_string()))
        } else {
            Ok(page.to_string())
        }
    }

    fn render_page(&self, index: usize) -> ProcessResult<Vec<u8>> {
        let page = self.page(index)?;
        let image = page
            .strip_prefix("scan:")
            .or_else(|| page.strip_prefix("garbled:"))
            .unwrap_or(page);
        Ok(image.as_bytes().to_vec())
    }
}

/// Converter copying the legacy file to `<stem>.docx`, failing on `BROKEN` contents.
#[derive(Default)]
pub struct FakeConverter {
    calls: AtomicUsize,
}

impl FakeConverter {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl DocumentConverter for FakeConverter {
    fn convert(&self, legacy_path: &Path, out_dir: &Path) -> ConversionResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let text = match std::fs::read_to_string(legacy_path) {
            Ok(text) => text,
            Err(e) => return ConversionResult::Failure(e.to_string()),
        };
        if text.contains("BROKEN") {
            return ConversionResult::Failure("converter exited with code 1".to_string());
        }
        let stem = legacy_path.file_stem().unwrap().to_string_lossy();
        let converted = out_dir.join(format!("{}.docx", stem));
        std::fs::write(&converted, text).unwrap();
        ConversionResult::Success(converted)
    }
}

/// Reader treating each line of the file as a paragraph.
#[derive(Default)]
pub struct LinesDocxReader;

impl DocxReader for LinesDocxReader {
    fn paragraphs(&self, path: &Path) -> ProcessResult<Vec<String>> {
        let text = std::fs::read_to_string(path)?;
        Ok(text.split('\n').map(str::to_string).collect())
    }
}

/// A full set of fakes, kept concrete so tests can inspect them.
pub struct Mocks {
    pub ocr: Arc<EchoOcr>,
    pub transcriber: Arc<EchoTranscriber>,
    pub pdf: Arc<FakePdfEngine>,
    pub converter: Arc<FakeConverter>,
    pub docx: Arc<LinesDocxReader>,
}

impl Mocks {
    pub fn new() -> Self {
        Self {
            ocr: Arc::default(),
            transcriber: Arc::default(),
            pdf: Arc::default(),
            converter: Arc::default(),
            docx: Arc::default(),
        }
    }

    pub fn engines(&self) -> Engines {
        Engines {
            ocr: self.ocr.clone(),
            transcriber: self.transcriber.clone(),
            pdf: self.pdf.clone(),
            converter: self.converter.clone(),
            docx: self.docx.clone(),
        }
    }
}
