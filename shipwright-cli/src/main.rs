//! Shipwright CLI
//!
//! Command-line interface for shipping a platform: locally, through CI, or
//! straight from a platform image.

mod commands;
mod config;
mod registry;

use anyhow::{Context, Result};
use clap::Parser;
use commands::{Commands, handle_command};
use config::{Config, FileConfig};
use shipwright_deploy::DeployEnvironment;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "shipwright")]
#[command(about = "Platform build-and-deploy workflow", long_about = None)]
struct Cli {
    /// Verbose logging, also forwarded to every step
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (default: ./shipwright.yaml when present)
    #[arg(long, global = true, env = "SHIPWRIGHT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_filter = if cli.verbose {
        "shipwright=debug"
    } else {
        "shipwright=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let base_dir = std::env::current_dir().context("Failed to read the working directory")?;
    let file = FileConfig::load(cli.config.as_deref(), &base_dir)?;

    let config = Config {
        file,
        base_dir,
        environment: DeployEnvironment::from_process(),
        verbose: cli.verbose,
    };

    handle_command(cli.command, &config).await
}
