//! Run command - one pass over the input folders.

use super::{load_config, print_summary, warn_missing_tools, Overrides};
use anyhow::{Context, Result};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use strata_ingest::{Pipeline, Stage};
use tokio::runtime::Runtime;

pub fn run(config_file: Option<&Path>, overrides: Overrides, dry_run: bool) -> Result<()> {
    let config = load_config(config_file, overrides)?;
    let pipeline = Pipeline::from_config(&config).context("Failed to build pipeline")?;

    if !dry_run {
        pipeline
            .layout()
            .ensure()
            .context("Failed to create workspace directories")?;
    }

    println!(
        "{} {}",
        "Scanning:".cyan(),
        pipeline.layout().stage_dir(Stage::Input).display()
    );
    let pending = pipeline.discover()?;

    if pending.is_empty() {
        println!("{}", "Nothing to process.".yellow());
        return Ok(());
    }

    println!("Found {} files", pending.len());

    if dry_run {
        for file in &pending {
            let strategy = file
                .strategy
                .map(|s| s.to_string())
                .unwrap_or_else(|| "pass-through".to_string());
            println!("  {} [{}]", file.path.display(), strategy);
        }
        println!("\n{}", "Dry run - no files were moved.".cyan());
        return Ok(());
    }

    warn_missing_tools(&config);

    let pb = ProgressBar::new(pending.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let bar = pb.clone();
    let pipeline = pipeline.with_progress(move |report| {
        if let Some(name) = report.source.file_name() {
            bar.set_message(name.to_string_lossy().into_owned());
        }
        bar.inc(1);
    });

    let rt = Runtime::new().context("Failed to create async runtime")?;
    let report = rt.block_on(pipeline.run())?;

    pb.finish_and_clear();
    print_summary(&report);

    Ok(())
}
