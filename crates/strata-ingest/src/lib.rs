//! Strata Ingest - Staged file ingestion pipeline.
//!
//! This crate provides:
//! - Workspace layout (input, output and processed roots with kind subfolders)
//! - Extraction strategies for images, media, PDFs, Word documents and source code
//! - JSON text records and file relocation between stages
//! - A bounded worker pool running one pass over the input folders
//! - File system watching to trigger new passes

mod error;
mod extractors;
mod layout;
mod pipeline;
mod relocator;
mod watcher;
mod writer;

#[cfg(test)]
mod testing;

pub use error::{IngestError, IngestResult};
pub use extractors::{
    CodeExtractor, Engines, Extractor, Extractors, ImageExtractor, MediaExtractor,
    OfficeExtractor, PdfExtractor,
};
pub use layout::{mirror_path, Stage, WorkspaceLayout};
pub use pipeline::{
    compile_patterns, is_ignored, FileOutcome, FileReport, PendingFile, Pipeline,
    PipelineOptions, ProgressFn, RunReport,
};
pub use relocator::{move_file, Relocation, Relocator};
pub use watcher::{InputWatcher, WatchEvent, WatcherConfig};
pub use writer::write_record;
