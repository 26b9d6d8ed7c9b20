//! File system watcher that triggers new passes when Input changes.

use crate::error::{IngestError, IngestResult};
use crate::pipeline::is_ignored;
use glob::Pattern;
use notify::{RecommendedWatcher, RecursiveMode};
use notify_debouncer_mini::{new_debouncer, DebouncedEvent, Debouncer};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver};
use std::time::Duration;
use strata_config::WatchConfig;
use tracing::{debug, error, info};

/// Events emitted by the input watcher.
#[derive(Debug, Clone)]
pub enum WatchEvent {
    /// Files appeared or changed under the watched directory.
    FilesChanged(Vec<PathBuf>),
    /// An error occurred.
    Error(String),
}

/// Configuration for the input watcher.
#[derive(Debug, Clone)]
pub struct WatcherConfig {
    /// Patterns to ignore.
    pub ignore_patterns: Vec<Pattern>,
    /// Debounce duration.
    pub debounce: Duration,
}

impl WatcherConfig {
    /// Create from config.
    pub fn from_config(config: &WatchConfig) -> IngestResult<Self> {
        Ok(Self {
            ignore_patterns: crate::pipeline::compile_patterns(&config.ignore_patterns)?,
            debounce: Duration::from_secs(config.debounce_seconds.max(1)),
        })
    }
}

/// Watches the Input root for new files.
pub struct InputWatcher {
    config: WatcherConfig,
    debouncer: Debouncer<RecommendedWatcher>,
    receiver: Receiver<Result<Vec<DebouncedEvent>, notify::Error>>,
}

impl InputWatcher {
    /// Create a new watcher.
    pub fn new(config: WatcherConfig) -> IngestResult<Self> {
        let (tx, rx) = channel();

        let debouncer = new_debouncer(config.debounce, tx)
            .map_err(|e| IngestError::WatchError(e.to_string()))?;

        Ok(Self {
            config,
            debouncer,
            receiver: rx,
        })
    }

    /// Start watching `dir` recursively.
    pub fn watch(&mut self, dir: &Path) -> IngestResult<()> {
        if !dir.is_dir() {
            return Err(IngestError::WatchError(format!(
                "Watch directory does not exist: {}",
                dir.display()
            )));
        }

        info!("Watching directory: {:?}", dir);
        self.debouncer
            .watcher()
            .watch(dir, RecursiveMode::Recursive)
            .map_err(|e| IngestError::WatchError(e.to_string()))
    }

    /// Wait for the next batch of relevant changes (blocking).
    ///
    /// Batches made only of directories, removals or ignored names are skipped.
    /// Returns `None` once the watcher has shut down.
    pub fn next_event(&self) -> Option<WatchEvent> {
        loop {
            match self.receiver.recv() {
                Ok(Ok(events)) => {
                    let paths = self.relevant_paths(events);
                    if !paths.is_empty() {
                        info!("{} file(s) changed", paths.len());
                        return Some(WatchEvent::FilesChanged(paths));
                    }
                }
                Ok(Err(e)) => {
                    error!("Watch error: {:?}", e);
                    return Some(WatchEvent::Error(e.to_string()));
                }
                Err(_) => return None,
            }
        }
    }

    fn relevant_paths(&self, events: Vec<DebouncedEvent>) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = events
            .into_iter()
            .map(|event| event.path)
            .filter(|path| {
                if !path.is_file() {
                    return false;
                }
                if is_ignored(path, &self.config.ignore_patterns) {
                    debug!("Ignoring file: {:?}", path);
                    return false;
                }
                true
            })
            .collect();
        paths.sort();
        paths.dedup();
        paths
    }
}
