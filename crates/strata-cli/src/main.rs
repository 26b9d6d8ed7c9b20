//! Strata CLI - Sort a folder of documents into searchable text records

mod commands;

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Strata - Extract text from images, recordings and documents dropped into a folder
#[derive(Parser)]
#[command(name = "strata")]
#[command(version)]
#[command(about = "Extract text from images, recordings and documents dropped into a folder", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use this config file instead of the default location
    #[arg(short, long, global = true, env = "STRATA_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the default config and create the workspace folders
    Init {
        /// Workspace root (default: from config)
        #[arg(short, long)]
        root: Option<PathBuf>,
    },

    /// Process every file currently waiting in the input folders
    Run {
        /// Workspace root (default: from config)
        #[arg(short, long)]
        root: Option<PathBuf>,

        /// Number of files processed at the same time
        #[arg(short, long)]
        workers: Option<usize>,

        /// Per-file timeout in seconds (0 disables)
        #[arg(short, long)]
        timeout: Option<u64>,

        /// List what would be processed without touching any file
        #[arg(long)]
        dry_run: bool,
    },

    /// Process pending files, then keep processing new ones as they arrive
    Watch {
        /// Workspace root (default: from config)
        #[arg(short, long)]
        root: Option<PathBuf>,

        /// Number of files processed at the same time
        #[arg(short, long)]
        workers: Option<usize>,
    },

    /// Show pending files and external tool availability
    Status {
        /// Workspace root (default: from config)
        #[arg(short, long)]
        root: Option<PathBuf>,
    },

    /// Inspect configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the effective configuration
    Show,

    /// Print the config file location
    Path,
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("strata=debug,info"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("strata=info,warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = cli.config.as_deref();
    let result = match cli.command {
        Commands::Init { root } => commands::init::run(config, root),
        Commands::Run {
            root,
            workers,
            timeout,
            dry_run,
        } => commands::run::run(
            config,
            commands::Overrides {
                root,
                workers,
                timeout,
            },
            dry_run,
        ),
        Commands::Watch { root, workers } => commands::watch::run(
            config,
            commands::Overrides {
                root,
                workers,
                timeout: None,
            },
        ),
        Commands::Status { root } => commands::status::run(config, root),
        Commands::Config(cmd) => match cmd {
            ConfigCommands::Show => commands::config::show(config),
            ConfigCommands::Path => commands::config::path(config),
        },
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}
