//! Application paths management.

use directories::ProjectDirs;
use std::path::PathBuf;

/// Location of the configuration file, following platform conventions.
#[derive(Debug, Clone)]
pub struct AppPaths {
    pub config_dir: PathBuf,
    pub config_file: PathBuf,
}

impl AppPaths {
    /// Create paths using platform-specific directories.
    pub fn new() -> Option<Self> {
        let proj_dirs = ProjectDirs::from("com", "strata", "strata")?;
        let config_dir = proj_dirs.config_dir().to_path_buf();

        Some(Self {
            config_file: config_dir.join("config.toml"),
            config_dir,
        })
    }

    /// Paths rooted at an explicit config file (the `--config` flag).
    pub fn with_config_file(config_file: impl Into<PathBuf>) -> Self {
        let config_file = config_file.into();
        let config_dir = config_file
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_default();
        Self {
            config_dir,
            config_file,
        }
    }

    /// Create the config directory.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.config_dir)
    }

    /// Check if a config file has been written.
    pub fn is_initialized(&self) -> bool {
        self.config_file.exists()
    }
}
