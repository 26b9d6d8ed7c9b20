//! Status command - show pending work and tool availability.

use super::{load_config, Overrides};
use anyhow::Result;
use colored::Colorize;
use std::path::{Path, PathBuf};
use strata_core::Kind;
use strata_ingest::{Stage, WorkspaceLayout};

pub fn run(config_file: Option<&Path>, root: Option<PathBuf>) -> Result<()> {
    let config = load_config(
        config_file,
        Overrides {
            root,
            ..Overrides::default()
        },
    )?;
    let layout = WorkspaceLayout::new(config.general.root_path());

    println!("{}", "Strata Status".cyan().bold());
    println!("{}", "─".repeat(50));
    println!("Workspace: {}", layout.root().display());

    if !layout.is_complete() {
        println!();
        println!(
            "{}",
            "Workspace folders are missing. Run 'strata init' to create them.".yellow()
        );
    }

    println!();
    println!(
        "{}",
        format!("{:<10} {:>8} {:>8} {:>10}", "Kind", "Pending", "Output", "Processed")
            .white()
            .bold()
    );
    let mut total_pending = 0;
    for kind in Kind::ALL {
        let pending = count_files(&layout, Stage::Input, kind);
        total_pending += pending;
        println!(
            "{:<10} {:>8} {:>8} {:>10}",
            kind.as_str(),
            pending,
            count_files(&layout, Stage::Output, kind),
            count_files(&layout, Stage::Processed, kind),
        );
    }

    println!();
    println!("{}", "External Tools".white().bold());
    for (tool, available) in strata_process::check_dependencies(&config.office.converter) {
        if available {
            println!("  {} {}", "●".green(), tool);
        } else {
            println!("  {} {} (not found)", "✗".red(), tool);
        }
    }

    if total_pending == 0 {
        println!();
        println!(
            "{}",
            "No files waiting. Drop files into the input folders and run 'strata run'.".dimmed()
        );
    }

    Ok(())
}

fn count_files(layout: &WorkspaceLayout, stage: Stage, kind: Kind) -> usize {
    let dir = layout.kind_dir(stage, kind);
    if !dir.is_dir() {
        return 0;
    }
    walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .count()
}
