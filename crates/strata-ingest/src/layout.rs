//! Workspace layout: the Input, Output and Processed roots and their kind subfolders.

use crate::error::{IngestError, IngestResult};
use std::path::{Path, PathBuf};
use strata_core::Kind;
use tracing::info;

/// One of the three workspace roots a file moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Files waiting to be processed.
    Input,
    /// Originals that have been handled.
    Output,
    /// Text records for originals that produced text.
    Processed,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::Input, Stage::Output, Stage::Processed];

    /// Directory name of this stage under the workspace root.
    pub fn dir_name(&self) -> &'static str {
        match self {
            Stage::Input => "input_dir",
            Stage::Output => "output_dir",
            Stage::Processed => "processed_dir",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.dir_name())
    }
}

/// Paths of a workspace rooted at a single directory.
#[derive(Debug, Clone)]
pub struct WorkspaceLayout {
    root: PathBuf,
}

impl WorkspaceLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn stage_dir(&self, stage: Stage) -> PathBuf {
        self.root.join(stage.dir_name())
    }

    pub fn kind_dir(&self, stage: Stage, kind: Kind) -> PathBuf {
        self.stage_dir(stage).join(kind.as_str())
    }

    /// Create every stage and kind directory that does not exist yet.
    ///
    /// Safe to call repeatedly and from several processes at once.
    pub fn ensure(&self) -> IngestResult<()> {
        for stage in Stage::ALL {
            for kind in Kind::ALL {
                let dir = self.kind_dir(stage, kind);
                if dir.is_dir() {
                    continue;
                }
                std::fs::create_dir_all(&dir).map_err(|source| IngestError::Layout {
                    path: dir.clone(),
                    source,
                })?;
                info!("Created directory {:?}", dir);
            }
        }
        Ok(())
    }

    /// Check whether every stage and kind directory exists.
    pub fn is_complete(&self) -> bool {
        Stage::ALL
            .iter()
            .all(|stage| Kind::ALL.iter().all(|kind| self.kind_dir(*stage, *kind).is_dir()))
    }

    /// Mirror `file` from one stage root onto another.
    pub fn mirror(&self, file: &Path, from: Stage, to: Stage) -> IngestResult<PathBuf> {
        mirror_path(file, &self.stage_dir(from), &self.stage_dir(to))
    }
}

/// Path under `dest_root` with the same position `file` has under `source_root`.
///
/// Parent directories of the result are created.
pub fn mirror_path(file: &Path, source_root: &Path, dest_root: &Path) -> IngestResult<PathBuf> {
    let relative = file
        .strip_prefix(source_root)
        .map_err(|_| IngestError::OutsideRoot {
            path: file.to_path_buf(),
            root: source_root.to_path_buf(),
        })?;

    if relative.as_os_str().is_empty() {
        return Err(IngestError::OutsideRoot {
            path: file.to_path_buf(),
            root: source_root.to_path_buf(),
        });
    }

    let destination = dest_root.join(relative);
    if let Some(parent) = destination.parent() {
        std::fs::create_dir_all(parent).map_err(|source| IngestError::Layout {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    Ok(destination)
}
