//! Throwaway askpass helper
//!
//! The vault password is handed to the deployment tool through an askpass
//! script that echoes one environment variable. Only the script touches the
//! disk; the password itself lives in the subprocess environment.

use std::io::Write;
use std::path::Path;
use tempfile::TempPath;
use tracing::debug;

use crate::error::{DeployError, Result};

/// An owner-only executable script, deleted when dropped
#[derive(Debug)]
pub struct AskpassScript {
    path: TempPath,
}

impl AskpassScript {
    /// Creates the script in the system temporary directory
    ///
    /// # Arguments
    /// * `variable` - Environment variable the script prints
    pub fn create(variable: &str) -> Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix("askpass-")
            .suffix(".sh")
            .tempfile()
            .map_err(DeployError::Askpass)?;

        file.write_all(script(variable).as_bytes())
            .map_err(DeployError::Askpass)?;
        file.flush().map_err(DeployError::Askpass)?;

        // Close the handle before anything executes the script
        let path = file.into_temp_path();
        make_owner_executable(&path).map_err(DeployError::Askpass)?;

        debug!("Created askpass script {}", path.display());
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn script(variable: &str) -> String {
    format!("#!/bin/sh\necho \"${}\"\n", variable)
}

#[cfg(unix)]
fn make_owner_executable(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))
}

#[cfg(not(unix))]
fn make_owner_executable(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    #[test]
    fn test_script_is_owner_only_and_removed_on_drop() {
        let script = AskpassScript::create("PLASMA_VAULT_PASS").unwrap();
        let path = script.path().to_path_buf();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "#!/bin/sh\necho \"$PLASMA_VAULT_PASS\"\n");
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o700);

        drop(script);
        assert!(!path.exists());
    }

    #[test]
    fn test_script_echoes_variable() {
        let script = AskpassScript::create("SHIPWRIGHT_TEST_SECRET").unwrap();
        let output = std::process::Command::new("sh")
            .arg(script.path())
            .env("SHIPWRIGHT_TEST_SECRET", "hunter2")
            .output()
            .unwrap();

        assert_eq!(String::from_utf8_lossy(&output.stdout), "hunter2\n");
    }
}
