//! PDF text extraction (lopdf) and page rasterization (`pdftoppm`).

use crate::error::{require_file, require_tool, ProcessError, ProcessResult};
use lopdf::Document;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// Opens PDF documents.
pub trait PdfEngine: Send + Sync {
    fn open(&self, path: &Path) -> ProcessResult<Box<dyn PdfDocument>>;
}

/// An opened PDF. Page indices are zero-based.
pub trait PdfDocument {
    fn page_count(&self) -> usize;

    /// Structured text of one page; empty for scanned pages.
    fn page_text(&self, index: usize) -> ProcessResult<String>;

    /// Render one page to PNG bytes.
    fn render_page(&self, index: usize) -> ProcessResult<Vec<u8>>;
}

/// PDF engine reading text with lopdf and rendering pages with poppler's `pdftoppm`.
#[derive(Debug, Clone)]
pub struct LopdfEngine {
    renderer: String,
    render_dpi: u32,
    scratch_dir: PathBuf,
}

impl LopdfEngine {
    pub fn new(render_dpi: u32, scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            renderer: "pdftoppm".to_string(),
            render_dpi,
            scratch_dir: scratch_dir.into(),
        }
    }
}

impl PdfEngine for LopdfEngine {
    fn open(&self, path: &Path) -> ProcessResult<Box<dyn PdfDocument>> {
        require_file(path)?;

        let document = Document::load(path)?;
        // get_pages is keyed by 1-based page number
        let page_numbers: Vec<u32> = document.get_pages().keys().copied().collect();

        debug!("Opened PDF {:?} ({} pages)", path, page_numbers.len());

        Ok(Box::new(LopdfDocument {
            path: path.to_path_buf(),
            document,
            page_numbers,
            engine: self.clone(),
        }))
    }
}

struct LopdfDocument {
    path: PathBuf,
    document: Document,
    page_numbers: Vec<u32>,
    engine: LopdfEngine,
}

impl LopdfDocument {
    fn page_number(&self, index: usize) -> ProcessResult<u32> {
        self.page_numbers
            .get(index)
            .copied()
            .ok_or(ProcessError::PageOutOfRange {
                page: index,
                count: self.page_numbers.len(),
            })
    }
}

impl PdfDocument for LopdfDocument {
    fn page_count(&self) -> usize {
        self.page_numbers.len()
    }

    fn page_text(&self, index: usize) -> ProcessResult<String> {
        let page = self.page_number(index)?;
        Ok(self.document.extract_text(&[page])?)
    }

    fn render_page(&self, index: usize) -> ProcessResult<Vec<u8>> {
        let page = self.page_number(index)?.to_string();
        require_tool(&self.engine.renderer)?;

        let out_dir = tempfile::Builder::new()
            .prefix("strata-render-")
            .tempdir_in(&self.engine.scratch_dir)?;
        let root = out_dir.path().join("page");

        let output = Command::new(&self.engine.renderer)
            .args(["-f", &page, "-l", &page])
            .args(["-r", &self.engine.render_dpi.to_string()])
            .args(["-png", "-singlefile"])
            .arg(&self.path)
            .arg(&root)
            .output()?;

        if !output.status.success() {
            return Err(ProcessError::ProcessFailed {
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            });
        }

        let png = root.with_extension("png");
        if !png.exists() {
            return Err(ProcessError::PdfError(format!(
                "pdftoppm produced no image for page {}",
                page
            )));
        }

        Ok(std::fs::read(png)?)
    }
}
