//! Moves originals to Output and their records to Processed.

use crate::error::{IngestError, IngestResult};
use crate::layout::{Stage, WorkspaceLayout};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[cfg(windows)]
const CROSS_DEVICE: i32 = 17;
#[cfg(not(windows))]
const CROSS_DEVICE: i32 = 18;

/// Final locations of a relocated file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relocation {
    pub original: PathBuf,
    pub artifact: Option<PathBuf>,
}

/// Moves files between workspace stages.
#[derive(Debug, Clone)]
pub struct Relocator {
    layout: WorkspaceLayout,
}

impl Relocator {
    pub fn new(layout: WorkspaceLayout) -> Self {
        Self { layout }
    }

    /// Move `original` from Input to Output, then `artifact` from Output to Processed.
    ///
    /// If the original cannot leave Input the artifact is deleted, so the next pass
    /// writes exactly one record for it. Otherwise, on error, the files stay wherever
    /// the last successful move left them.
    pub fn relocate(&self, original: &Path, artifact: Option<&Path>) -> IngestResult<Relocation> {
        let moved = self
            .layout
            .mirror(original, Stage::Input, Stage::Output)
            .and_then(|dest| move_file(original, &dest).map(|()| dest));
        let original_dest = match moved {
            Ok(dest) => dest,
            Err(e) => {
                if let Some(artifact) = artifact {
                    discard(artifact);
                }
                return Err(e);
            }
        };
        debug!("Moved {:?} to {:?}", original, original_dest);

        let artifact_dest = match artifact {
            Some(artifact) => {
                let dest = self.layout.mirror(artifact, Stage::Output, Stage::Processed)?;
                move_file(artifact, &dest)?;
                debug!("Moved {:?} to {:?}", artifact, dest);
                Some(dest)
            }
            None => None,
        };

        Ok(Relocation {
            original: original_dest,
            artifact: artifact_dest,
        })
    }
}

fn discard(artifact: &Path) {
    match std::fs::remove_file(artifact) {
        Ok(()) => debug!("Discarded {:?}", artifact),
        Err(e) => warn!("Failed to discard {:?}: {}", artifact, e),
    }
}

/// Rename `from` to `to`, copying across file systems when a rename is not possible.
pub fn move_file(from: &Path, to: &Path) -> IngestResult<()> {
    let result = match std::fs::rename(from, to) {
        Err(e) if e.raw_os_error() == Some(CROSS_DEVICE) => copy_then_remove(from, to),
        other => other,
    };

    result.map_err(|source| IngestError::MoveFailed {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    })
}

fn copy_then_remove(from: &Path, to: &Path) -> io::Result<()> {
    std::fs::copy(from, to)?;
    if let Err(e) = std::fs::remove_file(from) {
        // Keep a single copy of the file
        let _ = std::fs::remove_file(to);
        return Err(e);
    }
    Ok(())
}
