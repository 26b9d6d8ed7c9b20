//! Initialize Strata.

use super::{get_paths, load_config, Overrides};
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};
use strata_config::Config;
use strata_ingest::{Stage, WorkspaceLayout};

pub fn run(config_file: Option<&Path>, root: Option<PathBuf>) -> Result<()> {
    let paths = get_paths(config_file)?;

    println!("{}", "Initializing Strata...".cyan().bold());

    if paths.is_initialized() {
        println!(
            "  {} Config already exists: {}",
            "Note:".yellow().bold(),
            paths.config_file.display()
        );
    } else {
        paths
            .ensure_dirs()
            .context("Failed to create config directory")?;
        Config::create_default_file(&paths.config_file)
            .context("Failed to create config file")?;
        println!(
            "  {} Created config: {}",
            "✓".green(),
            paths.config_file.display()
        );
    }

    let config = load_config(
        config_file,
        Overrides {
            root,
            ..Overrides::default()
        },
    )?;
    let layout = WorkspaceLayout::new(config.general.root_path());
    layout
        .ensure()
        .context("Failed to create workspace directories")?;
    println!(
        "  {} Workspace ready: {}",
        "✓".green(),
        layout.root().display()
    );

    println!();
    println!("{}", "Strata initialized successfully!".green().bold());
    println!();
    println!("Next steps:");
    println!(
        "  1. Drop files into {}",
        layout.stage_dir(Stage::Input).display().to_string().cyan()
    );
    println!("  2. Process them: {}", "strata run".cyan());
    println!("  3. Or keep processing as files arrive: {}", "strata watch".cyan());

    Ok(())
}
