//! Inventory cache precondition
//!
//! Each environment has an inventory configuration
//! (`<inventory_dir>/<environment>.yaml`) whose `source_inventory.cache_path`
//! names the directory holding the inventory cache. Without the cache there
//! is nothing to deploy to.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::config::DeployConfig;

#[derive(Debug, Default, Deserialize)]
struct InventoryConfiguration {
    #[serde(default)]
    source_inventory: SourceInventory,
}

#[derive(Debug, Default, Deserialize)]
struct SourceInventory {
    #[serde(default)]
    cache_path: String,
}

/// Path of an environment's inventory configuration, relative to the working directory
pub fn configuration_path(config: &DeployConfig, environment: &str) -> PathBuf {
    config.inventory_dir.join(format!("{}.yaml", environment))
}

/// Resolves the inventory cache file of an environment
///
/// Returns `None` (with a warning) when the configuration cannot be read or
/// parsed. Relative cache paths are resolved against `workdir`.
pub fn cache_file(workdir: &Path, config: &DeployConfig, environment: &str) -> Option<PathBuf> {
    let path = workdir.join(configuration_path(config, environment));

    let data = match fs::read_to_string(&path) {
        Ok(data) => data,
        Err(e) => {
            warn!(
                "Failed to read inventory configuration {}: {}",
                path.display(),
                e
            );
            return None;
        }
    };

    let parsed: InventoryConfiguration = match serde_yaml::from_str(&data) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!(
                "Failed to parse inventory configuration {}: {}",
                path.display(),
                e
            );
            return None;
        }
    };

    Some(
        workdir
            .join(parsed.source_inventory.cache_path)
            .join(&config.cache_file),
    )
}

/// Whether the inventory cache of an environment exists
pub fn cache_exists(workdir: &Path, config: &DeployConfig, environment: &str) -> bool {
    match cache_file(workdir, config, environment) {
        Some(cache) => {
            let exists = cache.exists();
            debug!("Inventory cache {} exists: {}", cache.display(), exists);
            exists
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_configuration(workdir: &Path, environment: &str, body: &str) {
        let path = workdir.join(configuration_path(&DeployConfig::default(), environment));
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, body).unwrap();
    }

    #[test]
    fn test_cache_resolved_from_configuration() {
        let dir = TempDir::new().unwrap();
        write_configuration(
            dir.path(),
            "dev",
            "source_inventory:\n  cache_path: .cache/inventory\n  type: online\n",
        );
        let config = DeployConfig::default();

        assert_eq!(
            cache_file(dir.path(), &config, "dev").unwrap(),
            dir.path().join(".cache/inventory/ansible-online_net.cache")
        );
        assert!(!cache_exists(dir.path(), &config, "dev"));

        fs::create_dir_all(dir.path().join(".cache/inventory")).unwrap();
        fs::write(
            dir.path().join(".cache/inventory/ansible-online_net.cache"),
            "{}",
        )
        .unwrap();
        assert!(cache_exists(dir.path(), &config, "dev"));
    }

    #[test]
    fn test_absolute_cache_path() {
        let dir = TempDir::new().unwrap();
        let cache_dir = TempDir::new().unwrap();
        fs::write(cache_dir.path().join("ansible-online_net.cache"), "{}").unwrap();
        write_configuration(
            dir.path(),
            "prod",
            &format!("source_inventory:\n  cache_path: {}\n", cache_dir.path().display()),
        );

        assert!(cache_exists(dir.path(), &DeployConfig::default(), "prod"));
    }

    #[test]
    fn test_missing_or_broken_configuration() {
        let dir = TempDir::new().unwrap();
        let config = DeployConfig::default();
        assert!(cache_file(dir.path(), &config, "dev").is_none());

        write_configuration(dir.path(), "dev", "source_inventory: [unclosed\n");
        assert!(!cache_exists(dir.path(), &config, "dev"));
    }
}
