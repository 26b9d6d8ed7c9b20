//! Configuration commands.

use super::{get_paths, load_config, Overrides};
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;

pub fn show(config_file: Option<&Path>) -> Result<()> {
    let paths = get_paths(config_file)?;
    let config = load_config(config_file, Overrides::default())?;

    println!("{}", "Current Configuration".cyan().bold());
    println!("{}", "─".repeat(50));
    if !paths.config_file.exists() {
        println!(
            "{}",
            "No config file found, showing defaults. Run 'strata init' to create one.".dimmed()
        );
    }
    println!(
        "{}",
        config.to_toml().context("Failed to render configuration")?
    );

    Ok(())
}

pub fn path(config_file: Option<&Path>) -> Result<()> {
    let paths = get_paths(config_file)?;
    println!("{}", paths.config_file.display());
    Ok(())
}
