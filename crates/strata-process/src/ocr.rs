//! OCR processing using Tesseract.

use crate::error::{require_file, require_tool, ProcessError, ProcessResult};
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// Optical character recognition over an image file.
pub trait OcrEngine: Send + Sync {
    /// Recognize the text in an image. Blank images return an empty string.
    fn recognize(&self, image_path: &Path) -> ProcessResult<String>;
}

/// Recognition settings passed to Tesseract.
#[derive(Debug, Clone)]
pub struct TesseractOptions {
    /// Language pack, e.g. `por`.
    pub language: String,
    /// OCR engine mode (3 = default, LSTM + legacy when available).
    pub oem: u8,
    /// Page segmentation mode (3 = fully automatic, no OSD).
    pub psm: u8,
    /// Resolution hint for images without DPI metadata.
    pub dpi: u32,
}

impl Default for TesseractOptions {
    fn default() -> Self {
        Self {
            language: "por".to_string(),
            oem: 3,
            psm: 3,
            dpi: 300,
        }
    }
}

/// OCR engine backed by the `tesseract` CLI.
#[derive(Debug, Clone)]
pub struct Tesseract {
    program: String,
    options: TesseractOptions,
}

impl Tesseract {
    pub fn new(options: TesseractOptions) -> Self {
        Self {
            program: "tesseract".to_string(),
            options,
        }
    }

    /// Arguments following the image path.
    fn args(&self) -> Vec<String> {
        vec![
            "stdout".to_string(), // Output to stdout instead of file
            "-l".to_string(),
            self.options.language.clone(),
            "--oem".to_string(),
            self.options.oem.to_string(),
            "--psm".to_string(),
            self.options.psm.to_string(),
            "--dpi".to_string(),
            self.options.dpi.to_string(),
        ]
    }
}

impl Default for Tesseract {
    fn default() -> Self {
        Self::new(TesseractOptions::default())
    }
}

impl OcrEngine for Tesseract {
    fn recognize(&self, image_path: &Path) -> ProcessResult<String> {
        require_file(image_path)?;
        require_tool(&self.program)?;

        debug!("Running OCR on {:?} ({})", image_path, self.options.language);

        let output = Command::new(&self.program)
            .arg(image_path)
            .args(self.args())
            .output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            // Tesseract sometimes outputs warnings to stderr but still works
            if !output.stdout.is_empty() {
                debug!("Tesseract warning: {}", stderr);
            } else {
                return Err(ProcessError::OcrError(stderr.to_string()));
            }
        }

        // Trailing form feed marks the end of the page
        let text = String::from_utf8_lossy(&output.stdout)
            .trim_end()
            .to_string();

        Ok(text)
    }
}
