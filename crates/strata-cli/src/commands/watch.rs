//! Watch command implementation.

use super::{load_config, print_summary, warn_missing_tools, Overrides};
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;
use strata_ingest::{InputWatcher, Pipeline, Stage, WatchEvent, WatcherConfig};
use tokio::runtime::Runtime;
use tracing::{error, info};

/// Process what is pending, then run a new pass for every batch of changes.
pub fn run(config_file: Option<&Path>, overrides: Overrides) -> Result<()> {
    let config = load_config(config_file, overrides)?;
    let pipeline = Pipeline::from_config(&config).context("Failed to build pipeline")?;
    pipeline
        .layout()
        .ensure()
        .context("Failed to create workspace directories")?;

    warn_missing_tools(&config);

    let input = pipeline.layout().stage_dir(Stage::Input);
    let watcher_config = WatcherConfig::from_config(&config.watch)?;
    let mut watcher = InputWatcher::new(watcher_config)?;
    watcher.watch(&input)?;

    println!("{}", "Starting file watcher...".cyan());
    println!("  {} {}", "+".green(), input.display());
    println!("\nPress Ctrl+C to stop.\n");

    let rt = Runtime::new().context("Failed to create async runtime")?;
    run_pass(&rt, &pipeline)?;

    while let Some(event) = watcher.next_event() {
        match event {
            WatchEvent::FilesChanged(paths) => {
                info!("Change detected in {} file(s)", paths.len());
                for path in &paths {
                    println!("{} {}", "New file:".green(), path.display());
                }
                run_pass(&rt, &pipeline)?;
            }
            WatchEvent::Error(e) => {
                error!("Watch error: {}", e);
                eprintln!("{} {}", "Watch error:".red(), e);
            }
        }
    }

    Ok(())
}

fn run_pass(rt: &Runtime, pipeline: &Pipeline) -> Result<()> {
    let report = rt.block_on(pipeline.run())?;
    if !report.files.is_empty() {
        print_summary(&report);
    }
    Ok(())
}
