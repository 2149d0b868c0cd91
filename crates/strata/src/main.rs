//! Strata CLI - static site generator with nested layouts.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "strata")]
#[command(about = "Static site generator with nested layouts and a live-rendering server")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to strata.toml config file
    #[arg(short, long, default_value = "strata.toml")]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Render every page of the content directory into the output directory
    Build,

    /// Remove the output directory
    Clean,

    /// Render pages on request (default when no command is given)
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Open browser
        #[arg(long)]
        open: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    let config = config::load_config(&cli.config)?;

    // Execute command
    match cli.command {
        Some(Commands::Build) => {
            commands::build::run(&config).await?;
        }
        Some(Commands::Clean) => {
            commands::clean::run(&config).await?;
        }
        Some(Commands::Serve { port, host, open }) => {
            commands::serve::run(&config, port, host, open).await?;
        }
        None => {
            commands::serve::run(&config, None, None, false).await?;
        }
    }

    Ok(())
}
