//! Configuration structures and loading.

use crate::error::{ConfigError, ConfigResult};
use crate::paths::AppPaths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub processing: ProcessingConfig,

    #[serde(default)]
    pub ocr: OcrConfig,

    #[serde(default)]
    pub pdf: PdfConfig,

    #[serde(default)]
    pub office: OfficeConfig,

    #[serde(default)]
    pub watch: WatchConfig,
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> ConfigResult<Self> {
        let paths = AppPaths::new().ok_or(ConfigError::NoConfigDir)?;
        Self::load_from(&paths.config_file)
    }

    /// Load configuration from a specific path. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Render the effective configuration as TOML.
    pub fn to_toml(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Create a default config file with comments.
    pub fn create_default_file(path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, Self::default_config_string())?;
        Ok(())
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.processing.max_concurrent_jobs == 0 {
            return Err(ConfigError::Invalid(
                "processing.max_concurrent_jobs must be at least 1".to_string(),
            ));
        }
        if self.ocr.psm > 13 {
            return Err(ConfigError::Invalid(format!(
                "ocr.psm must be between 0 and 13, got {}",
                self.ocr.psm
            )));
        }
        if self.ocr.oem > 3 {
            return Err(ConfigError::Invalid(format!(
                "ocr.oem must be between 0 and 3, got {}",
                self.ocr.oem
            )));
        }
        if self.ocr.language.trim().is_empty() {
            return Err(ConfigError::Invalid("ocr.language is empty".to_string()));
        }
        Ok(())
    }

    /// Generate a default config file with helpful comments.
    pub fn default_config_string() -> String {
        r#"# Strata Configuration

[general]
# Workspace root holding input_dir, output_dir and processed_dir
root_dir = "."

[processing]
# Files processed at the same time. OCR and Whisper are heavy; keep this low.
max_concurrent_jobs = 1

# Per-file extraction timeout in seconds (0 disables)
timeout_seconds = 1800

# Run one transcription at a time even with several workers
serialize_transcription = true

# Whisper model size: tiny, base, small, medium, large
whisper_model = "small"

# Force a transcription language (auto-detected when unset)
# whisper_language = "pt"

# Where temporary page images and converted documents are written
# scratch_dir = "/tmp/strata"

[ocr]
# Tesseract language, engine mode, page segmentation mode and resolution hint
language = "por"
oem = 3
psm = 3
dpi = 300

[pdf]
# Resolution used when rasterizing textless pages for OCR
render_dpi = 300

[office]
# LibreOffice binary used to convert .doc to .docx
converter = "soffice"

[watch]
# Files still being written; skipped until they are renamed
ignore_patterns = [
    "*.part",
    "*.crdownload",
    "*.tmp",
]

# Quiet period before a batch of changes triggers a pass (seconds)
debounce_seconds = 2
"#
        .to_string()
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub root_dir: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            root_dir: ".".to_string(),
        }
    }
}

impl GeneralConfig {
    /// Workspace root with `~` expanded.
    pub fn root_path(&self) -> PathBuf {
        expand(&self.root_dir)
    }
}

/// Scheduler and extraction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    pub max_concurrent_jobs: usize,
    pub timeout_seconds: u64,
    pub serialize_transcription: bool,
    pub whisper_model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whisper_language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scratch_dir: Option<String>,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            max_concurrent_jobs: 1,
            timeout_seconds: 1800,
            serialize_transcription: true,
            whisper_model: "small".to_string(),
            whisper_language: None,
            scratch_dir: None,
        }
    }
}

impl ProcessingConfig {
    /// Directory for temporary files, defaulting to the system temp dir.
    pub fn scratch_path(&self) -> PathBuf {
        self.scratch_dir
            .as_deref()
            .map(expand)
            .unwrap_or_else(std::env::temp_dir)
    }

    /// Per-file timeout, `None` when disabled.
    pub fn timeout(&self) -> Option<std::time::Duration> {
        (self.timeout_seconds > 0).then(|| std::time::Duration::from_secs(self.timeout_seconds))
    }
}

/// Tesseract settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    pub language: String,
    pub oem: u8,
    pub psm: u8,
    pub dpi: u32,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            language: "por".to_string(),
            oem: 3,
            psm: 3,
            dpi: 300,
        }
    }
}

/// PDF rasterization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    pub render_dpi: u32,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self { render_dpi: 300 }
    }
}

/// Legacy office conversion settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OfficeConfig {
    pub converter: String,
}

impl Default for OfficeConfig {
    fn default() -> Self {
        Self {
            converter: "soffice".to_string(),
        }
    }
}

/// Discovery and file watching settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    pub ignore_patterns: Vec<String>,
    pub debounce_seconds: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            ignore_patterns: vec![
                "*.part".to_string(),
                "*.crdownload".to_string(),
                "*.tmp".to_string(),
            ],
            debounce_seconds: 2,
        }
    }
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}
