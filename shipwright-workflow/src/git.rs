//! Source control synchronization
//!
//! Before work is delegated to CI, the local repository must be fully
//! reflected on the `origin` remote: uncommitted changes are committed, a
//! branch missing on the remote is created, and local commits are pushed.
//! Every operation is idempotent and nothing is ever force-pushed.

use std::path::PathBuf;
use std::process::{Command, Output};
use thiserror::Error;
use tracing::{debug, info};

/// Message of commits created for uncommitted changes
pub const AUTO_COMMIT_MESSAGE: &str = "chore: commit unversioned changes before shipping";

/// Errors from source control operations
#[derive(Debug, Error)]
pub enum GitError {
    #[error("failed to run git")]
    Launch(#[source] std::io::Error),

    #[error("git {command} failed: {stderr}")]
    Command { command: String, stderr: String },

    #[error("HEAD is detached; check out a branch first")]
    DetachedHead,

    #[error("cannot derive a repository name from remote URL {0:?}")]
    RemoteUrl(String),
}

/// Source control operations the workflow relies on
pub trait GitSynchronizer: Send + Sync {
    /// Commits uncommitted changes, if any
    ///
    /// # Returns
    /// Whether a commit was created
    fn ensure_committed(&self) -> Result<bool, GitError>;

    /// Creates the current branch on the remote if it is absent there
    ///
    /// # Returns
    /// Whether the branch was pushed
    fn ensure_branch_pushed(&self) -> Result<bool, GitError>;

    /// Pushes local commits the remote branch does not have
    ///
    /// # Returns
    /// Number of commits pushed
    fn push_pending_commits(&self) -> Result<usize, GitError>;

    /// Name of the checked out branch
    fn current_branch(&self) -> Result<String, GitError>;

    /// Repository path derived from the remote URL (e.g. `group/platform`)
    fn repository_name(&self) -> Result<String, GitError>;
}

/// [`GitSynchronizer`] backed by the `git` command line
#[derive(Debug, Clone)]
pub struct GitCli {
    repo_dir: PathBuf,
    remote: String,
}

impl GitCli {
    /// Creates a synchronizer for the repository at `repo_dir` and its `origin` remote
    pub fn new(repo_dir: impl Into<PathBuf>) -> Self {
        Self {
            repo_dir: repo_dir.into(),
            remote: "origin".to_string(),
        }
    }

    /// Version of HEAD: the tag pointing at it, or the short commit hash
    pub fn head_version(&self) -> Result<String, GitError> {
        let tag = self.raw(&["describe", "--tags", "--exact-match", "HEAD"])?;
        if tag.status.success() {
            return Ok(String::from_utf8_lossy(&tag.stdout).trim().to_string());
        }
        self.git(&["rev-parse", "--short=7", "HEAD"])
    }

    fn raw(&self, args: &[&str]) -> Result<Output, GitError> {
        debug!("git {}", args.join(" "));
        Command::new("git")
            .arg("-C")
            .arg(&self.repo_dir)
            .args(args)
            .output()
            .map_err(GitError::Launch)
    }

    /// Runs git and returns its trimmed stdout, failing on a non-zero exit
    fn git(&self, args: &[&str]) -> Result<String, GitError> {
        let output = self.raw(args)?;
        if !output.status.success() {
            return Err(GitError::Command {
                command: args.join(" "),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn remote_has_branch(&self, branch: &str) -> Result<bool, GitError> {
        let output = self.raw(&["ls-remote", "--exit-code", "--heads", &self.remote, branch])?;
        match output.status.code() {
            Some(0) => Ok(true),
            // --exit-code: no matching refs
            Some(2) => Ok(false),
            _ => Err(GitError::Command {
                command: format!("ls-remote --heads {} {}", self.remote, branch),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }),
        }
    }
}

impl GitSynchronizer for GitCli {
    fn ensure_committed(&self) -> Result<bool, GitError> {
        let status = self.git(&["status", "--porcelain"])?;
        if status.is_empty() {
            debug!("Working tree clean");
            return Ok(false);
        }

        info!("Committing unversioned changes");
        self.git(&["add", "--all"])?;
        self.git(&["commit", "--message", AUTO_COMMIT_MESSAGE])?;
        Ok(true)
    }

    fn ensure_branch_pushed(&self) -> Result<bool, GitError> {
        let branch = self.current_branch()?;
        if self.remote_has_branch(&branch)? {
            return Ok(false);
        }

        info!("Branch {} is not on {}, pushing it", branch, self.remote);
        self.git(&["push", "--set-upstream", &self.remote, &branch])?;
        Ok(true)
    }

    fn push_pending_commits(&self) -> Result<usize, GitError> {
        let branch = self.current_branch()?;
        self.git(&["fetch", &self.remote, &branch])?;

        let range = format!("{}/{}..HEAD", self.remote, branch);
        let pending: usize = self
            .git(&["rev-list", "--count", &range])?
            .parse()
            .map_err(|_| GitError::Command {
                command: format!("rev-list --count {}", range),
                stderr: "unexpected output".to_string(),
            })?;

        if pending == 0 {
            debug!("No commits to push on {}", branch);
            return Ok(0);
        }

        info!("Pushing {} commit(s) to {}/{}", pending, self.remote, branch);
        self.git(&["push", &self.remote, &branch])?;
        Ok(pending)
    }

    fn current_branch(&self) -> Result<String, GitError> {
        let branch = self.git(&["rev-parse", "--abbrev-ref", "HEAD"])?;
        if branch == "HEAD" {
            return Err(GitError::DetachedHead);
        }
        Ok(branch)
    }

    fn repository_name(&self) -> Result<String, GitError> {
        let url = self.git(&["remote", "get-url", &self.remote])?;
        repository_path(&url).ok_or(GitError::RemoteUrl(url))
    }
}

/// Extracts the repository path from a remote URL
///
/// Handles `scheme://host[:port]/group/repo(.git)` and scp-like
/// `user@host:group/repo(.git)`. A local path yields its last component.
pub fn repository_path(url: &str) -> Option<String> {
    let url = url.trim().trim_end_matches('/');
    let path = if let Some((_, rest)) = url.split_once("://") {
        rest.split_once('/').map(|(_, path)| path)?
    } else if let Some((host, path)) = url.split_once(':') {
        if host.contains('/') {
            url.rsplit('/').next()?
        } else {
            path
        }
    } else {
        url.rsplit('/').next()?
    };

    let path = path.trim_start_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);
    if path.is_empty() {
        None
    } else {
        Some(path.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    #[test]
    fn test_repository_path() {
        let cases = [
            ("git@gitlab.example.com:acme/platform.git", "acme/platform"),
            ("https://gitlab.example.com/acme/sub/platform.git", "acme/sub/platform"),
            ("ssh://git@gitlab.example.com:2222/acme/platform", "acme/platform"),
            ("/srv/git/platform.git", "platform"),
        ];
        for (url, expected) in cases {
            assert_eq!(repository_path(url).as_deref(), Some(expected), "{}", url);
        }
        assert_eq!(repository_path("https://gitlab.example.com/"), None);
    }

    fn git_available() -> bool {
        Command::new("git").arg("--version").output().is_ok()
    }

    fn run(dir: &Path, args: &[&str]) -> String {
        let output = Command::new("git")
            .arg("-C")
            .arg(dir)
            .args(args)
            .output()
            .unwrap();
        assert!(
            output.status.success(),
            "git {:?}: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    /// A work repository with one commit and a bare `origin`
    fn repository() -> (TempDir, PathBuf, PathBuf) {
        let root = TempDir::new().unwrap();
        let remote = root.path().join("platform.git");
        let work = root.path().join("work");
        fs::create_dir_all(&work).unwrap();

        run(root.path(), &["init", "--bare", remote.to_str().unwrap()]);
        run(&work, &["init"]);
        run(&work, &["symbolic-ref", "HEAD", "refs/heads/main"]);
        run(&work, &["config", "user.name", "Ship Tester"]);
        run(&work, &["config", "user.email", "ship@example.com"]);
        run(&work, &["config", "commit.gpgsign", "false"]);
        run(&work, &["remote", "add", "origin", remote.to_str().unwrap()]);
        fs::write(work.join("platform.yaml"), "name: platform\n").unwrap();
        run(&work, &["add", "--all"]);
        run(&work, &["commit", "--message", "initial"]);

        (root, work, remote)
    }

    #[test]
    fn test_commit_push_cycle() {
        if !git_available() {
            return;
        }
        let (_root, work, remote) = repository();
        let git = GitCli::new(&work);

        assert_eq!(git.current_branch().unwrap(), "main");
        assert_eq!(git.repository_name().unwrap(), "platform");

        // Clean tree: nothing to commit
        assert!(!git.ensure_committed().unwrap());

        // Branch missing on the remote
        assert!(git.ensure_branch_pushed().unwrap());
        assert!(!git.ensure_branch_pushed().unwrap());
        assert_eq!(git.push_pending_commits().unwrap(), 0);

        fs::write(work.join("new.yaml"), "x: 1\n").unwrap();
        assert!(git.ensure_committed().unwrap());
        assert_eq!(
            run(&work, &["log", "-1", "--format=%s"]),
            AUTO_COMMIT_MESSAGE
        );

        assert_eq!(git.push_pending_commits().unwrap(), 1);
        assert_eq!(git.push_pending_commits().unwrap(), 0);
        assert_eq!(
            run(&remote, &["rev-parse", "main"]),
            run(&work, &["rev-parse", "HEAD"])
        );
    }

    #[test]
    fn test_head_version() {
        if !git_available() {
            return;
        }
        let (_root, work, _remote) = repository();
        let git = GitCli::new(&work);

        let short = git.head_version().unwrap();
        assert_eq!(short.len(), 7);

        run(&work, &["tag", "v1.4.0"]);
        assert_eq!(git.head_version().unwrap(), "v1.4.0");
    }

    #[test]
    fn test_detached_head() {
        if !git_available() {
            return;
        }
        let (_root, work, _remote) = repository();
        run(&work, &["checkout", "--detach"]);

        assert!(matches!(
            GitCli::new(&work).current_branch(),
            Err(GitError::DetachedHead)
        ));
    }
}
