//! CLI command implementations.

pub mod config;
pub mod init;
pub mod run;
pub mod status;
pub mod watch;

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};
use strata_config::{AppPaths, Config};
use strata_ingest::{FileOutcome, RunReport};

/// Settings given on the command line that take precedence over the config file.
#[derive(Debug, Default)]
pub struct Overrides {
    pub root: Option<PathBuf>,
    pub workers: Option<usize>,
    pub timeout: Option<u64>,
}

impl Overrides {
    fn apply(self, config: &mut Config) {
        if let Some(root) = self.root {
            config.general.root_dir = root.to_string_lossy().into_owned();
        }
        if let Some(workers) = self.workers {
            config.processing.max_concurrent_jobs = workers;
        }
        if let Some(timeout) = self.timeout {
            config.processing.timeout_seconds = timeout;
        }
    }
}

/// Get the application paths, honouring `--config`.
pub fn get_paths(config_file: Option<&Path>) -> Result<AppPaths> {
    match config_file {
        Some(file) => Ok(AppPaths::with_config_file(file)),
        None => AppPaths::new().context("Failed to determine application directories"),
    }
}

/// Load the configuration and apply command line overrides.
pub fn load_config(config_file: Option<&Path>, overrides: Overrides) -> Result<Config> {
    let paths = get_paths(config_file)?;
    let mut config = Config::load_from(&paths.config_file)
        .with_context(|| format!("Failed to load {}", paths.config_file.display()))?;

    overrides.apply(&mut config);
    config.validate().context("Invalid settings")?;
    Ok(config)
}

/// Warn about external programs the default engines need.
pub fn warn_missing_tools(config: &Config) {
    let missing: Vec<_> = strata_process::check_dependencies(&config.office.converter)
        .into_iter()
        .filter(|(_, available)| !available)
        .collect();

    if missing.is_empty() {
        return;
    }

    println!("{}", "Warning: Some processing tools are not available:".yellow());
    for (tool, _) in &missing {
        println!("  - {}", tool);
    }
    println!("Files needing them will fail and be moved without a record.\n");
}

/// Print the outcome counts of a pass.
pub fn print_summary(report: &RunReport) {
    let extracted = report.count(FileOutcome::Extracted);
    let no_text = report.count(FileOutcome::NoText);
    let passed = report.count(FileOutcome::PassThrough);
    let failed = report.count(FileOutcome::Failed);
    let stuck = report.relocation_failures();

    println!(
        "\n{} {} files in {:.1}s",
        "Processed:".green().bold(),
        report.files.len(),
        report.duration().num_milliseconds() as f64 / 1000.0
    );
    println!("  {} Extracted: {}", "●".green(), extracted);
    println!("  {} No text: {}", "○".yellow(), no_text);
    println!("  {} Passed through: {}", "→".blue(), passed);
    if failed > 0 {
        println!("  {} Failed: {}", "✗".red(), failed);
        for file in report
            .files
            .iter()
            .filter(|f| f.outcome == FileOutcome::Failed)
            .take(5)
        {
            println!("    {} {}", file_label(&file.source), file.error.as_deref().unwrap_or("").dimmed());
        }
    }
    if stuck > 0 {
        println!(
            "  {} Left in input: {} (will be retried on the next run)",
            "!".red().bold(),
            stuck
        );
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_overrides_take_precedence() {
        let mut config = Config::default();
        Overrides {
            root: Some(PathBuf::from("/data/inbox")),
            workers: Some(4),
            timeout: Some(0),
        }
        .apply(&mut config);

        assert_eq!(config.general.root_dir, "/data/inbox");
        assert_eq!(config.processing.max_concurrent_jobs, 4);
        assert!(config.processing.timeout().is_none());
    }

    #[test]
    fn test_load_config_rejects_zero_workers() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("config.toml");

        let err = load_config(
            Some(file.as_path()),
            Overrides {
                workers: Some(0),
                ..Overrides::default()
            },
        )
        .unwrap_err();
        assert!(format!("{:#}", err).contains("max_concurrent_jobs"));
    }

    #[test]
    fn test_load_config_missing_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("none.toml");
        let config = load_config(Some(file.as_path()), Overrides::default()).unwrap();
        assert_eq!(config.processing.max_concurrent_jobs, 1);
    }
}
