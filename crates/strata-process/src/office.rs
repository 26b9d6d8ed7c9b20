//! Office documents: legacy `.doc` conversion (LibreOffice) and `.docx` paragraphs (docx-rs).

use crate::error::{require_file, ProcessError, ProcessResult};
use docx_rs::{DocumentChild, Paragraph, ParagraphChild, Run, RunChild};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info, warn};

/// Outcome of converting a legacy document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionResult {
    /// Path of the converted `.docx`.
    Success(PathBuf),
    Failure(String),
}

/// Converts legacy binary documents to `.docx`.
pub trait DocumentConverter: Send + Sync {
    /// Convert `legacy_path`, writing the result into `out_dir`.
    fn convert(&self, legacy_path: &Path, out_dir: &Path) -> ConversionResult;
}

/// Converter running LibreOffice in headless mode.
#[derive(Debug, Clone)]
pub struct SofficeConverter {
    program: String,
}

impl SofficeConverter {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for SofficeConverter {
    fn default() -> Self {
        Self::new("soffice")
    }
}

impl DocumentConverter for SofficeConverter {
    fn convert(&self, legacy_path: &Path, out_dir: &Path) -> ConversionResult {
        if !legacy_path.is_file() {
            return ConversionResult::Failure(format!(
                "File not found: {}",
                legacy_path.display()
            ));
        }
        if which::which(&self.program).is_err() {
            return ConversionResult::Failure(format!("Tool not found: {}", self.program));
        }

        info!("Converting {:?} to docx", legacy_path);

        let output = match Command::new(&self.program)
            .args(["--headless", "--convert-to", "docx", "--outdir"])
            .arg(out_dir)
            .arg(legacy_path)
            .output()
        {
            Ok(output) => output,
            Err(e) => return ConversionResult::Failure(format!("Failed to start converter: {}", e)),
        };

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            warn!("Converter stderr: {}", stderr.trim());
        }

        if !output.status.success() {
            return ConversionResult::Failure(format!(
                "Converter exited with code {}",
                output.status.code().unwrap_or(-1)
            ));
        }

        converted_path(legacy_path, out_dir)
    }
}

/// Where the converter is expected to leave its output.
fn converted_path(legacy_path: &Path, out_dir: &Path) -> ConversionResult {
    let stem = match legacy_path.file_stem() {
        Some(stem) => stem,
        None => return ConversionResult::Failure("Document has no file name".to_string()),
    };
    let docx_path = out_dir.join(format!("{}.docx", stem.to_string_lossy()));

    if docx_path.is_file() {
        debug!("Converted document at {:?}", docx_path);
        ConversionResult::Success(docx_path)
    } else {
        ConversionResult::Failure(format!(
            "Converted file was not found: {}",
            docx_path.display()
        ))
    }
}

/// Reads paragraph text from a `.docx` document.
pub trait DocxReader: Send + Sync {
    fn paragraphs(&self, path: &Path) -> ProcessResult<Vec<String>>;
}

/// Paragraph reader built on docx-rs.
#[derive(Debug, Clone, Default)]
pub struct DocxRsReader;

impl DocxReader for DocxRsReader {
    fn paragraphs(&self, path: &Path) -> ProcessResult<Vec<String>> {
        require_file(path)?;

        let bytes = std::fs::read(path)?;
        let docx = docx_rs::read_docx(&bytes)
            .map_err(|e| ProcessError::DocxError(format!("Failed to parse DOCX: {}", e)))?;

        // Body paragraphs only; tables and headers are not part of the paragraph list
        let paragraphs = docx
            .document
            .children
            .iter()
            .filter_map(|child| match child {
                DocumentChild::Paragraph(para) => Some(paragraph_text(para)),
                _ => None,
            })
            .collect();

        Ok(paragraphs)
    }
}

fn paragraph_text(para: &Paragraph) -> String {
    let mut text = String::new();
    for child in &para.children {
        match child {
            ParagraphChild::Run(run) => push_run(run, &mut text),
            ParagraphChild::Hyperlink(link) => {
                for inner in &link.children {
                    if let ParagraphChild::Run(run) = inner {
                        push_run(run, &mut text);
                    }
                }
            }
            _ => {}
        }
    }
    text
}

fn push_run(run: &Run, output: &mut String) {
    for child in &run.children {
        match child {
            RunChild::Text(t) => output.push_str(&t.text),
            RunChild::Tab(_) => output.push('\t'),
            RunChild::Break(_) => output.push('\n'),
            _ => {}
        }
    }
}
