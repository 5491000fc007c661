//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod deploy;
mod image;
mod ship;

pub use deploy::DeployArgs;
pub use image::ImageCommands;
pub use ship::ShipArgs;

use anyhow::Result;
use clap::Subcommand;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Ship the platform: bump, then deploy locally or through CI
    Ship(ShipArgs),
    /// Deploy a prepared platform or a platform image
    Deploy(DeployArgs),
    /// Platform image management
    Image {
        #[command(subcommand)]
        command: ImageCommands,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
///
/// # Arguments
/// * `command` - The command to execute
/// * `config` - The CLI configuration
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Ship(args) => ship::handle_ship_command(args, config).await,
        Commands::Deploy(args) => deploy::handle_deploy_command(args, config),
        Commands::Image { command } => image::handle_image_command(command, config),
    }
}
