//! Audio and video transcription using Whisper.

use crate::error::{require_file, require_tool, ProcessError, ProcessResult};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

/// Speech-to-text over an audio or video file.
///
/// One instance is built at startup and shared by every worker.
pub trait Transcriber: Send + Sync {
    /// Transcribe the media file. Silence returns an empty string.
    fn transcribe(&self, media_path: &Path) -> ProcessResult<String>;
}

#[derive(Debug, Deserialize)]
struct WhisperJsonOutput {
    text: String,
    #[serde(default)]
    segments: Vec<WhisperSegment>,
}

#[derive(Debug, Deserialize)]
struct WhisperSegment {
    text: String,
}

/// Transcriber backed by the `whisper` CLI (pip install openai-whisper).
///
/// Each call spawns its own process and loads the model, so concurrent calls are safe
/// but memory hungry.
#[derive(Debug, Clone)]
pub struct WhisperCli {
    program: String,
    model: String,
    language: Option<String>,
    scratch_dir: PathBuf,
}

impl WhisperCli {
    /// Create a transcriber using the given model size (tiny, base, small, medium, large).
    pub fn new(model: impl Into<String>, scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: "whisper".to_string(),
            model: model.into(),
            language: None,
            scratch_dir: scratch_dir.into(),
        }
    }

    /// Force a language instead of auto-detection.
    pub fn with_language(mut self, language: Option<String>) -> Self {
        self.language = language;
        self
    }

    fn parse_output(json_content: &str) -> ProcessResult<String> {
        let output: WhisperJsonOutput = serde_json::from_str(json_content).map_err(|e| {
            ProcessError::ParseError(format!("Failed to parse Whisper output: {}", e))
        })?;

        if !output.text.trim().is_empty() || output.segments.is_empty() {
            return Ok(output.text);
        }

        Ok(output
            .segments
            .iter()
            .map(|s| s.text.trim())
            .collect::<Vec<_>>()
            .join(" "))
    }
}

impl Transcriber for WhisperCli {
    fn transcribe(&self, media_path: &Path) -> ProcessResult<String> {
        require_file(media_path)?;
        require_tool(&self.program)?;

        let output_dir = tempfile::Builder::new()
            .prefix("strata-whisper-")
            .tempdir_in(&self.scratch_dir)?;

        info!("Transcribing {:?} with model '{}'", media_path, self.model);

        let mut command = Command::new(&self.program);
        command
            .arg(media_path)
            .args(["--model", &self.model])
            .args(["--output_format", "json"])
            .arg("--output_dir")
            .arg(output_dir.path());
        if let Some(language) = &self.language {
            command.args(["--language", language]);
        }

        let output = command.output()?;

        if !output.status.success() {
            return Err(ProcessError::TranscriptionError(
                String::from_utf8_lossy(&output.stderr).to_string(),
            ));
        }

        // Whisper names its output after the input stem
        let stem = media_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("audio");
        let json_path = output_dir.path().join(format!("{}.json", stem));

        if !json_path.exists() {
            return Err(ProcessError::TranscriptionError(
                "Whisper output file not found".to_string(),
            ));
        }

        let text = Self::parse_output(&std::fs::read_to_string(&json_path)?)?;
        debug!("Transcribed {} characters", text.len());
        Ok(text)
    }
}
