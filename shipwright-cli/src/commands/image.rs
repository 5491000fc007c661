//! Image command handlers
//!
//! Packs a prepared platform directory into a platform image.

use anyhow::{Context, Result, bail};
use clap::Subcommand;
use colored::*;
use shipwright_workflow::{GitCli, GitSynchronizer};
use std::path::{Path, PathBuf};

use crate::config::Config;

/// Directory default image names are placed in
const IMAGE_DIR: &str = "img";

/// Image subcommands
#[derive(Subcommand)]
pub enum ImageCommands {
    /// Pack a directory into a platform image
    Pack {
        /// Directory to pack
        source: PathBuf,

        /// Image path (default: img/<repository>-<version>.pi)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Handle image commands
///
/// # Arguments
/// * `command` - The image command to execute
/// * `config` - The CLI configuration
pub fn handle_image_command(command: ImageCommands, config: &Config) -> Result<()> {
    match command {
        ImageCommands::Pack { source, output } => pack(config, &source, output),
    }
}

fn pack(config: &Config, source: &Path, output: Option<PathBuf>) -> Result<()> {
    let source = config.base_dir.join(source);
    if !source.is_dir() {
        bail!("Source directory does not exist: {}", source.display());
    }

    let output = match output {
        Some(path) => config.base_dir.join(path),
        None => {
            let git = GitCli::new(&config.base_dir);
            let repo = git
                .repository_name()
                .context("Failed to determine the repository name for the image")?;
            let version = git
                .head_version()
                .context("Failed to determine the version for the image")?;
            config
                .base_dir
                .join(IMAGE_DIR)
                .join(default_image_name(&repo, &version))
        }
    };

    shipwright_deploy::pack_directory(&source, &output)?;

    println!("{}", "✓ Platform image packed!".green().bold());
    println!("  Source: {}", source.display().to_string().dimmed());
    println!("  Image:  {}", output.display().to_string().cyan());
    Ok(())
}

/// `<repository basename>-<version>.pi`
fn default_image_name(repo: &str, version: &str) -> String {
    let name = repo.rsplit('/').next().unwrap_or(repo);
    format!("{}-{}.pi", name, version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FileConfig;
    use shipwright_deploy::DeployEnvironment;
    use tempfile::TempDir;

    fn config(dir: &Path) -> Config {
        Config {
            file: FileConfig::default(),
            base_dir: dir.to_path_buf(),
            environment: DeployEnvironment::default(),
            verbose: false,
        }
    }

    #[test]
    fn test_default_image_name() {
        assert_eq!(default_image_name("acme/platform", "v1.2.0"), "platform-v1.2.0.pi");
        assert_eq!(default_image_name("platform", "3f2a9c1"), "platform-3f2a9c1.pi");
    }

    #[test]
    fn test_pack_to_explicit_output() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("prepared/platform")).unwrap();
        std::fs::write(dir.path().join("prepared/platform/platform.yaml"), "- hosts: all\n").unwrap();

        pack(
            &config(dir.path()),
            Path::new("prepared"),
            Some(PathBuf::from("out/platform-test.pi")),
        )
        .unwrap();

        let image = dir.path().join("out/platform-test.pi");
        assert!(image.is_file());

        let extracted = dir.path().join("extracted");
        std::fs::create_dir_all(&extracted).unwrap();
        shipwright_deploy::extract(&image, &extracted).unwrap();
        assert_eq!(
            std::fs::read_to_string(extracted.join("platform/platform.yaml")).unwrap(),
            "- hosts: all\n"
        );
    }

    #[test]
    fn test_pack_missing_source() {
        let dir = TempDir::new().unwrap();
        let err = pack(&config(dir.path()), Path::new("nope"), None).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }
}
