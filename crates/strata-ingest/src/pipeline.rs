//! Discovery and the bounded worker pool that takes each file from Input to its final stage.

use crate::error::{IngestError, IngestResult};
use crate::extractors::Extractors;
use crate::layout::{Stage, WorkspaceLayout};
use crate::relocator::Relocator;
use crate::writer::write_record;
use chrono::{DateTime, Utc};
use glob::Pattern;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use strata_config::Config;
use strata_core::{Extraction, Kind, Strategy};
use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

/// Compile glob patterns matched against file names.
pub fn compile_patterns(patterns: &[String]) -> IngestResult<Vec<Pattern>> {
    patterns
        .iter()
        .map(|p| Pattern::new(p).map_err(|e| IngestError::InvalidPattern(format!("{}: {}", p, e))))
        .collect()
}

/// Check whether the file name of `path` matches any pattern.
pub fn is_ignored(path: &Path, patterns: &[Pattern]) -> bool {
    match path.file_name().and_then(|n| n.to_str()) {
        Some(name) => patterns.iter().any(|p| p.matches(name)),
        None => false,
    }
}

/// Tunables for a pipeline pass.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Files processed at the same time.
    pub workers: usize,
    /// Limit on a single extraction; `None` waits forever.
    pub file_timeout: Option<Duration>,
    /// File names skipped as still being written.
    pub ignore_patterns: Vec<Pattern>,
    /// Run one transcription at a time. The timeout starts once a file holds the turn.
    pub serialize_transcription: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            workers: 1,
            file_timeout: None,
            ignore_patterns: Vec::new(),
            serialize_transcription: true,
        }
    }
}

impl PipelineOptions {
    pub fn from_config(config: &Config) -> IngestResult<Self> {
        Ok(Self {
            workers: config.processing.max_concurrent_jobs,
            file_timeout: config.processing.timeout(),
            ignore_patterns: compile_patterns(&config.watch.ignore_patterns)?,
            serialize_transcription: config.processing.serialize_transcription,
        })
    }
}

/// A file waiting in an Input kind subfolder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFile {
    pub path: PathBuf,
    pub kind: Kind,
    /// `None` for files that are passed through without extraction.
    pub strategy: Option<Strategy>,
}

impl PendingFile {
    pub fn new(path: PathBuf, kind: Kind) -> Self {
        let strategy = Strategy::for_path(&path);
        Self {
            path,
            kind,
            strategy,
        }
    }
}

/// What happened to a single file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileOutcome {
    /// A record was written.
    Extracted,
    /// The file was readable but held no text.
    NoText,
    /// Extraction or record writing failed.
    Failed,
    /// No strategy handles this file type.
    PassThrough,
}

impl FileOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileOutcome::Extracted => "extracted",
            FileOutcome::NoText => "no-text",
            FileOutcome::Failed => "failed",
            FileOutcome::PassThrough => "pass-through",
        }
    }
}

impl std::fmt::Display for FileOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Report for one processed file.
#[derive(Debug, Clone)]
pub struct FileReport {
    pub source: PathBuf,
    pub strategy: Option<Strategy>,
    pub outcome: FileOutcome,
    /// Final location of the record, once moved to Processed.
    pub artifact: Option<PathBuf>,
    /// Why extraction or writing failed.
    pub error: Option<String>,
    /// Set when the original left Input.
    pub relocated: bool,
    /// Why relocation failed.
    pub relocation_error: Option<String>,
}

/// Summary of a full pass.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub files: Vec<FileReport>,
}

impl RunReport {
    pub fn count(&self, outcome: FileOutcome) -> usize {
        self.files.iter().filter(|f| f.outcome == outcome).count()
    }

    pub fn relocation_failures(&self) -> usize {
        self.files.iter().filter(|f| !f.relocated).count()
    }

    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// Callback invoked after each file completes.
pub type ProgressFn = dyn Fn(&FileReport) + Send + Sync;

struct Shared {
    layout: WorkspaceLayout,
    extractors: Extractors,
    relocator: Relocator,
    file_timeout: Option<Duration>,
    transcription_gate: Option<Arc<Mutex<()>>>,
    progress: Option<Arc<ProgressFn>>,
}

/// The ingestion pipeline for one workspace.
pub struct Pipeline {
    shared: Arc<Shared>,
    options: PipelineOptions,
}

impl Pipeline {
    pub fn new(layout: WorkspaceLayout, extractors: Extractors, options: PipelineOptions) -> Self {
        let shared = Shared {
            relocator: Relocator::new(layout.clone()),
            layout,
            extractors,
            file_timeout: options.file_timeout,
            transcription_gate: options
                .serialize_transcription
                .then(|| Arc::new(Mutex::new(()))),
            progress: None,
        };
        Self {
            shared: Arc::new(shared),
            options,
        }
    }

    /// Build a pipeline backed by the command-line engines.
    pub fn from_config(config: &Config) -> IngestResult<Self> {
        Ok(Self::new(
            WorkspaceLayout::new(config.general.root_path()),
            Extractors::from_config(config),
            PipelineOptions::from_config(config)?,
        ))
    }

    /// Report each finished file to `progress`.
    pub fn with_progress(mut self, progress: impl Fn(&FileReport) + Send + Sync + 'static) -> Self {
        let progress: Arc<ProgressFn> = Arc::new(progress);
        match Arc::get_mut(&mut self.shared) {
            Some(shared) => shared.progress = Some(progress),
            None => warn!("Pipeline already shared, progress callback ignored"),
        }
        self
    }

    pub fn layout(&self) -> &WorkspaceLayout {
        &self.shared.layout
    }

    /// List pending files, kind by kind in a fixed order.
    pub fn discover(&self) -> IngestResult<Vec<PendingFile>> {
        let mut pending = Vec::new();

        for kind in Kind::ALL {
            let dir = self.shared.layout.kind_dir(Stage::Input, kind);
            if !dir.is_dir() {
                debug!("Skipping missing directory {:?}", dir);
                continue;
            }

            for entry in WalkDir::new(&dir).follow_links(true).sort_by_file_name() {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        warn!("Skipping unreadable entry: {}", e);
                        continue;
                    }
                };

                if !entry.file_type().is_file() {
                    continue;
                }

                if is_ignored(entry.path(), &self.options.ignore_patterns) {
                    debug!("Ignoring {:?}", entry.path());
                    continue;
                }

                pending.push(PendingFile::new(entry.into_path(), kind));
            }
        }

        Ok(pending)
    }

    /// Run one pass over every pending file.
    ///
    /// Fails only when the workspace or scratch directory cannot be created, or Input
    /// cannot be listed; per-file problems are recorded in the report.
    pub async fn run(&self) -> IngestResult<RunReport> {
        self.shared.layout.ensure()?;
        let scratch = self.shared.extractors.scratch_dir();
        std::fs::create_dir_all(scratch).map_err(|source| IngestError::Layout {
            path: scratch.to_path_buf(),
            source,
        })?;

        let started_at = Utc::now();
        let pending = self.discover()?;
        let workers = self.options.workers.max(1);
        info!(files = pending.len(), workers, "Starting pass");

        let semaphore = Arc::new(Semaphore::new(workers));
        let mut tasks = JoinSet::new();

        for file in pending {
            let permit = match Arc::clone(&semaphore).acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => break,
            };
            let shared = Arc::clone(&self.shared);
            tasks.spawn(async move {
                let _permit = permit;
                let report = process_file(&shared, file).await;
                if let Some(progress) = &shared.progress {
                    progress(&report);
                }
                report
            });
        }

        let mut files = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(report) => files.push(report),
                Err(e) => error!("Worker task failed: {}", e),
            }
        }

        let report = RunReport {
            started_at,
            finished_at: Utc::now(),
            files,
        };
        info!(
            extracted = report.count(FileOutcome::Extracted),
            no_text = report.count(FileOutcome::NoText),
            failed = report.count(FileOutcome::Failed),
            pass_through = report.count(FileOutcome::PassThrough),
            relocation_failures = report.relocation_failures(),
            "Pass complete"
        );
        Ok(report)
    }
}

async fn process_file(shared: &Arc<Shared>, file: PendingFile) -> FileReport {
    let extraction = match file.strategy {
        Some(strategy) => Some(extract(shared, strategy, &file.path).await),
        None => None,
    };

    let source = file.path.clone();
    let strategy = file.strategy;
    let worker = Arc::clone(shared);
    match tokio::task::spawn_blocking(move || worker.finish(file, extraction)).await {
        Ok(report) => report,
        Err(e) => {
            error!(path = ?source, "Worker crashed while storing results: {}", e);
            FileReport {
                source,
                strategy,
                outcome: FileOutcome::Failed,
                artifact: None,
                error: Some(e.to_string()),
                relocated: false,
                relocation_error: None,
            }
        }
    }
}

/// Run the blocking extractor on its own thread, bounded by the file timeout.
///
/// A timed out extraction keeps running in the background; its result is dropped.
/// Transcriptions wait for their turn before the clock starts, and a timed out one
/// keeps the turn until its engine returns.
async fn extract(shared: &Arc<Shared>, strategy: Strategy, path: &Path) -> Extraction {
    let turn = match (&shared.transcription_gate, strategy) {
        (Some(gate), Strategy::Transcription) => Some(Arc::clone(gate).lock_owned().await),
        _ => None,
    };

    let worker = Arc::clone(shared);
    let owned_path = path.to_path_buf();
    let task = tokio::task::spawn_blocking(move || {
        let _turn = turn;
        worker.extractors.get(strategy).extract(&owned_path)
    });

    let joined = match shared.file_timeout {
        Some(limit) => match tokio::time::timeout(limit, task).await {
            Ok(joined) => joined,
            Err(_) => return Extraction::Failed(format!("timed out after {:?}", limit)),
        },
        None => task.await,
    };

    match joined {
        Ok(extraction) => extraction,
        Err(e) => Extraction::Failed(format!("extractor panicked: {}", e)),
    }
}

impl Shared {
    /// Write the record, if any, and move the file out of Input.
    fn finish(&self, file: PendingFile, extraction: Option<Extraction>) -> FileReport {
        let path = file.path.as_path();
        let strategy = file.strategy.map(|s| s.as_str()).unwrap_or("none");
        let mut report = FileReport {
            source: file.path.clone(),
            strategy: file.strategy,
            outcome: FileOutcome::PassThrough,
            artifact: None,
            error: None,
            relocated: false,
            relocation_error: None,
        };
        let mut written = None;

        match extraction {
            None => {
                info!(path = ?path, outcome = "pass-through", "No strategy for file");
            }
            Some(Extraction::Found(record)) => {
                let stored = self
                    .layout
                    .mirror(path, Stage::Input, Stage::Output)
                    .and_then(|mirrored| write_record(&record, &mirrored));
                match stored {
                    Ok(artifact) => {
                        report.outcome = FileOutcome::Extracted;
                        info!(path = ?path, strategy, outcome = "extracted", "Text extracted");
                        written = Some(artifact);
                    }
                    Err(e) => {
                        report.outcome = FileOutcome::Failed;
                        warn!(path = ?path, strategy, outcome = "failed", "Failed to write record: {}", e);
                        report.error = Some(e.to_string());
                    }
                }
            }
            Some(Extraction::NotFound) => {
                report.outcome = FileOutcome::NoText;
                info!(path = ?path, strategy, outcome = "no-text", "No text found");
            }
            Some(Extraction::Failed(reason)) => {
                report.outcome = FileOutcome::Failed;
                warn!(path = ?path, strategy, outcome = "failed", "Extraction failed: {}", reason);
                report.error = Some(reason);
            }
        }

        match self.relocator.relocate(path, written.as_deref()) {
            Ok(relocation) => {
                report.relocated = true;
                report.artifact = relocation.artifact;
                debug!(path = ?path, destination = ?relocation.original, "Relocated");
            }
            Err(e) => {
                error!(path = ?path, "Relocation failed, leaving file for a later pass: {}", e);
                report.relocation_error = Some(e.to_string());
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Mocks;
    use std::sync::Mutex;
    use strata_core::TextRecord;
    use tempfile::{tempdir, TempDir};

    struct Workspace {
        dir: TempDir,
        layout: WorkspaceLayout,
        mocks: Mocks,
    }

    impl Workspace {
        fn new() -> Self {
            let dir = tempdir().unwrap();
            let layout = WorkspaceLayout::new(dir.path().join("root"));
            layout.ensure().unwrap();
            std::fs::create_dir(dir.path().join("scratch")).unwrap();
            Self {
                dir,
                layout,
                mocks: Mocks::new(),
            }
        }

        fn add(&self, kind: Kind, relative: &str, contents: &str) -> PathBuf {
            let path = self.layout.kind_dir(Stage::Input, kind).join(relative);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(&path, contents).unwrap();
            path
        }

        fn pipeline(&self, options: PipelineOptions) -> Pipeline {
            let extractors = Extractors::new(self.mocks.engines(), self.dir.path().join("scratch"));
            Pipeline::new(self.layout.clone(), extractors, options)
        }

        fn at(&self, stage: Stage, kind: Kind, relative: &str) -> PathBuf {
            self.layout.kind_dir(stage, kind).join(relative)
        }

        /// Records under Processed for a kind subfolder, recursively.
        fn records(&self, kind: Kind) -> Vec<TextRecord> {
            WalkDir::new(self.layout.kind_dir(Stage::Processed, kind))
                .into_iter()
                .map(|e| e.unwrap())
                .filter(|e| e.file_type().is_file())
                .map(|e| serde_json::from_str(&std::fs::read_to_string(e.path()).unwrap()).unwrap())
                .collect()
        }

        fn input_is_empty(&self) -> bool {
            WalkDir::new(self.layout.stage_dir(Stage::Input))
                .into_iter()
                .map(|e| e.unwrap())
                .all(|e| !e.file_type().is_file())
        }
    }

    fn options(workers: usize) -> PipelineOptions {
        PipelineOptions {
            workers,
            ..PipelineOptions::default()
        }
    }

    #[test]
    fn test_compile_patterns() {
        let patterns = compile_patterns(&["*.part".to_string(), "*.tmp".to_string()]).unwrap();
        assert!(is_ignored(Path::new("/in/video/movie.mp4.part"), &patterns));
        assert!(is_ignored(Path::new("/in/text/x.tmp"), &patterns));
        assert!(!is_ignored(Path::new("/in/video/movie.mp4"), &patterns));

        let err = compile_patterns(&["[".to_string()]).unwrap_err();
        assert!(matches!(err, IngestError::InvalidPattern(_)));
    }

    #[test]
    fn test_discover_order_and_classification() {
        let ws = Workspace::new();
        ws.add(Kind::Video, "clip.mp4", "v");
        ws.add(Kind::Text, "notes.txt", "t");
        ws.add(Kind::Images, "scan.png", "i");
        ws.add(Kind::Code, "b/main.py", "c");
        ws.add(Kind::Audio, "talk.mp3", "a");

        let pending = ws.pipeline(options(1)).discover().unwrap();

        let kinds: Vec<_> = pending.iter().map(|p| p.kind).collect();
        assert_eq!(kinds, Kind::ALL);
        let strategies: Vec<_> = pending.iter().map(|p| p.strategy).collect();
        assert_eq!(
            strategies,
            [
                Some(Strategy::Transcription),
                Some(Strategy::PlainCode),
                Some(Strategy::ImageOcr),
                None,
                Some(Strategy::Transcription),
            ]
        );
    }

    #[test]
    fn test_discover_skips_ignored_names() {
        let ws = Workspace::new();
        ws.add(Kind::Video, "movie.mp4.part", "partial");
        ws.add(Kind::Code, "app.js", "x");

        let pipeline = ws.pipeline(PipelineOptions {
            ignore_patterns: compile_patterns(&["*.part".to_string()]).unwrap(),
            ..options(1)
        });
        let pending = pipeline.discover().unwrap();

        assert_eq!(pending.len(), 1);
        assert!(pending[0].path.ends_with("app.js"));
    }

    #[tokio::test]
    async fn test_ignored_file_stays_in_input() {
        let ws = Workspace::new();
        let partial = ws.add(Kind::Video, "movie.mp4.crdownload", "partial");

        let pipeline = ws.pipeline(PipelineOptions {
            ignore_patterns: compile_patterns(&["*.crdownload".to_string()]).unwrap(),
            ..options(1)
        });
        let report = pipeline.run().await.unwrap();

        assert!(report.files.is_empty());
        assert!(partial.exists());
    }

    #[tokio::test]
    async fn test_relocation_invariant() {
        let ws = Workspace::new();
        ws.add(Kind::Code, "proj/src/main.py", "print(1)");
        ws.add(Kind::Images, "blank.png", "\x0c");
        ws.add(Kind::Text, "notes/readme.txt", "plain text");
        ws.add(Kind::Audio, "talk.wav", "bom dia");
        ws.add(Kind::Video, "clip.mov", "ERROR decoder");

        let report = ws.pipeline(options(2)).run().await.unwrap();

        assert_eq!(report.files.len(), 5);
        assert!(ws.input_is_empty());
        assert_eq!(report.relocation_failures(), 0);

        for (kind, relative) in [
            (Kind::Code, "proj/src/main.py"),
            (Kind::Images, "blank.png"),
            (Kind::Text, "notes/readme.txt"),
            (Kind::Audio, "talk.wav"),
            (Kind::Video, "clip.mov"),
        ] {
            assert!(ws.at(Stage::Output, kind, relative).exists(), "{}", relative);
        }

        // Only files with text have a record, next to the mirrored path
        let code = ws.records(Kind::Code);
        assert_eq!(code.len(), 1);
        assert_eq!(code[0].content, "print(1)");
        assert!(ws.at(Stage::Processed, Kind::Code, "proj/src").is_dir());
        assert_eq!(ws.records(Kind::Audio).len(), 1);
        assert!(ws.records(Kind::Images).is_empty());
        assert!(ws.records(Kind::Text).is_empty());
        assert!(ws.records(Kind::Video).is_empty());

        // Nothing left behind in Output except originals
        for entry in WalkDir::new(ws.layout.stage_dir(Stage::Output)) {
            let entry = entry.unwrap();
            assert_ne!(entry.path().extension().and_then(|e| e.to_str()), Some("json"));
        }

        assert_eq!(report.count(FileOutcome::Extracted), 2);
        assert_eq!(report.count(FileOutcome::NoText), 1);
        assert_eq!(report.count(FileOutcome::PassThrough), 1);
        assert_eq!(report.count(FileOutcome::Failed), 1);
    }

    #[tokio::test]
    async fn test_failure_is_isolated() {
        let ws = Workspace::new();
        ws.add(Kind::Images, "1.png", "first");
        ws.add(Kind::Images, "2.png", "ERROR engine failure");
        ws.add(Kind::Images, "3.png", "third");

        let report = ws.pipeline(options(1)).run().await.unwrap();

        let mut contents: Vec<_> = ws.records(Kind::Images).into_iter().map(|r| r.content).collect();
        contents.sort();
        assert_eq!(contents, ["first", "third"]);
        assert!(ws.at(Stage::Output, Kind::Images, "2.png").exists());
        assert!(ws.input_is_empty());

        let failed: Vec<_> = report
            .files
            .iter()
            .filter(|f| f.outcome == FileOutcome::Failed)
            .collect();
        assert_eq!(failed.len(), 1);
        assert!(failed[0].source.ends_with("2.png"));
        assert!(failed[0].relocated);
    }

    #[tokio::test]
    async fn test_panicking_engine_is_isolated() {
        let ws = Workspace::new();
        ws.add(Kind::Images, "a.png", "PANIC");
        ws.add(Kind::Images, "b.png", "fine");

        let report = ws.pipeline(options(1)).run().await.unwrap();

        assert_eq!(report.count(FileOutcome::Failed), 1);
        assert_eq!(report.count(FileOutcome::Extracted), 1);
        assert!(ws.at(Stage::Output, Kind::Images, "a.png").exists());
        assert!(ws.input_is_empty());
    }

    #[tokio::test]
    async fn test_blank_image_moves_without_record() {
        let ws = Workspace::new();
        ws.add(Kind::Images, "blank.png", "");

        let report = ws.pipeline(options(1)).run().await.unwrap();

        assert_eq!(report.files[0].outcome, FileOutcome::NoText);
        assert!(report.files[0].artifact.is_none());
        assert!(ws.at(Stage::Output, Kind::Images, "blank.png").exists());
        assert!(ws.records(Kind::Images).is_empty());
    }

    #[tokio::test]
    async fn test_pdf_fallback_end_to_end() {
        let ws = Workspace::new();
        ws.add(Kind::Text, "fatura.pdf", "Cover page\x0cscan:INVOICE");

        let report = ws.pipeline(options(1)).run().await.unwrap();

        let records = ws.records(Kind::Text);
        assert_eq!(records.len(), 1);
        assert!(records[0].content.contains("INVOICE"));
        assert_eq!(records[0].file_name, "fatura.pdf");
        assert!(report.files[0].artifact.as_ref().unwrap().exists());
        assert!(std::fs::read_dir(ws.dir.path().join("scratch")).unwrap().next().is_none());
    }

    #[tokio::test]
    async fn test_same_base_name_gets_distinct_records() {
        let ws = Workspace::new();
        ws.add(Kind::Code, "report.py", "a = 1");
        ws.add(Kind::Code, "report.js", "let a = 1;");

        let report = ws.pipeline(options(2)).run().await.unwrap();

        let artifacts: Vec<_> = report.files.iter().filter_map(|f| f.artifact.clone()).collect();
        assert_eq!(artifacts.len(), 2);
        assert_ne!(artifacts[0], artifacts[1]);
        assert_eq!(ws.records(Kind::Code).len(), 2);
    }

    #[tokio::test]
    async fn test_timeout_fails_file_and_relocates_it() {
        let ws = Workspace::new();
        ws.add(Kind::Audio, "long.mp3", "SLOW lecture");

        let report = ws
            .pipeline(PipelineOptions {
                file_timeout: Some(Duration::from_millis(20)),
                ..options(1)
            })
            .run()
            .await
            .unwrap();

        let file = &report.files[0];
        assert_eq!(file.outcome, FileOutcome::Failed);
        assert!(file.error.as_ref().unwrap().contains("timed out"));
        assert!(file.relocated);
        assert!(ws.at(Stage::Output, Kind::Audio, "long.mp3").exists());
        assert!(ws.records(Kind::Audio).is_empty());
    }

    #[tokio::test]
    async fn test_many_files_with_several_workers() {
        let ws = Workspace::new();
        for i in 0..12 {
            ws.add(Kind::Code, &format!("m{}.py", i), &format!("x = {}", i));
        }

        let report = ws.pipeline(options(4)).run().await.unwrap();

        assert_eq!(report.count(FileOutcome::Extracted), 12);
        assert_eq!(ws.records(Kind::Code).len(), 12);
        assert!(ws.input_is_empty());
    }

    #[tokio::test]
    async fn test_progress_sees_every_file() {
        let ws = Workspace::new();
        ws.add(Kind::Code, "a.py", "1");
        ws.add(Kind::Text, "b.txt", "2");

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let pipeline = ws
            .pipeline(options(1))
            .with_progress(move |report| sink.lock().unwrap().push(report.outcome));

        pipeline.run().await.unwrap();

        let mut outcomes = seen.lock().unwrap().clone();
        outcomes.sort_by_key(|o| o.as_str());
        assert_eq!(outcomes, [FileOutcome::Extracted, FileOutcome::PassThrough]);
    }

    #[tokio::test]
    async fn test_second_pass_is_empty() {
        let ws = Workspace::new();
        ws.add(Kind::Code, "a.py", "1");
        let pipeline = ws.pipeline(options(1));

        assert_eq!(pipeline.run().await.unwrap().files.len(), 1);
        assert!(pipeline.run().await.unwrap().files.is_empty());
    }

    #[tokio::test]
    async fn test_blocked_output_leaves_no_stray_record() {
        let ws = Workspace::new();
        let source = ws.add(Kind::Code, "a.py", "print(1)");
        std::fs::create_dir_all(ws.at(Stage::Output, Kind::Code, "a.py/occupied")).unwrap();
        let pipeline = ws.pipeline(options(1));

        for _ in 0..2 {
            let report = pipeline.run().await.unwrap();
            let file = &report.files[0];
            assert!(!file.relocated);
            assert!(file.relocation_error.is_some());
            assert!(file.artifact.is_none());
        }

        assert!(source.exists());
        for stage in [Stage::Output, Stage::Processed] {
            for entry in WalkDir::new(ws.layout.stage_dir(stage)) {
                let entry = entry.unwrap();
                assert_ne!(entry.path().extension().and_then(|e| e.to_str()), Some("json"));
            }
        }
    }

    #[tokio::test]
    async fn test_scratch_dir_is_created() {
        let ws = Workspace::new();
        ws.add(Kind::Text, "fatura.pdf", "scan:INVOICE");
        let scratch = ws.dir.path().join("cache/strata");

        let extractors = Extractors::new(ws.mocks.engines(), &scratch);
        let pipeline = Pipeline::new(ws.layout.clone(), extractors, options(1));
        let report = pipeline.run().await.unwrap();

        assert!(scratch.is_dir());
        assert_eq!(report.files[0].outcome, FileOutcome::Extracted);
        assert_eq!(ws.records(Kind::Text)[0].content, "INVOICE");
    }

    #[tokio::test]
    async fn test_scratch_failure_is_fatal() {
        let ws = Workspace::new();
        let source = ws.add(Kind::Text, "fatura.pdf", "scan:INVOICE");
        let scratch = ws.dir.path().join("taken");
        std::fs::write(&scratch, b"x").unwrap();

        let extractors = Extractors::new(ws.mocks.engines(), &scratch);
        let pipeline = Pipeline::new(ws.layout.clone(), extractors, options(1));

        assert!(matches!(pipeline.run().await, Err(IngestError::Layout { .. })));
        assert!(source.exists());
    }

    #[tokio::test]
    async fn test_whitespace_only_code_keeps_its_record() {
        let ws = Workspace::new();
        ws.add(Kind::Code, "blank.py", "\n\n    \n");
        ws.add(Kind::Code, "empty.py", "");

        let report = ws.pipeline(options(1)).run().await.unwrap();

        let records = ws.records(Kind::Code);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].file_name, "blank.py");
        assert_eq!(records[0].content, "\n\n    \n");
        assert_eq!(report.count(FileOutcome::NoText), 1);
    }

    #[tokio::test]
    async fn test_transcription_wait_does_not_count_toward_timeout() {
        let ws = Workspace::new();
        for i in 0..4 {
            ws.add(Kind::Audio, &format!("talk{}.mp3", i), "SLOW talk");
        }

        let report = ws
            .pipeline(PipelineOptions {
                file_timeout: Some(Duration::from_secs(1)),
                ..options(4)
            })
            .run()
            .await
            .unwrap();

        assert_eq!(report.count(FileOutcome::Extracted), 4);
        assert_eq!(ws.mocks.transcriber.peak(), 1);
    }

    #[tokio::test]
    async fn test_unserialized_transcriptions_overlap() {
        let ws = Workspace::new();
        for i in 0..3 {
            ws.add(Kind::Video, &format!("clip{}.mp4", i), "SLOW clip");
        }

        let report = ws
            .pipeline(PipelineOptions {
                serialize_transcription: false,
                ..options(3)
            })
            .run()
            .await
            .unwrap();

        assert_eq!(report.count(FileOutcome::Extracted), 3);
        assert!(ws.mocks.transcriber.peak() > 1);
    }

    #[tokio::test]
    async fn test_layout_failure_is_fatal() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("file");
        std::fs::write(&root, b"x").unwrap();

        let mocks = Mocks::new();
        let pipeline = Pipeline::new(
            WorkspaceLayout::new(&root),
            Extractors::new(mocks.engines(), dir.path()),
            options(1),
        );

        assert!(matches!(pipeline.run().await, Err(IngestError::Layout { .. })));
    }
}
