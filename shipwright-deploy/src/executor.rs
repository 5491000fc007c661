//! Deployment executor
//!
//! Runs one deployment:
//! - Extracting the platform image into a scratch directory, if one is given
//! - Selecting the working directory (extracted image or prepared platform)
//! - Checking the inventory cache
//! - Invoking the deployment tool with the askpass helper in place
//!
//! The process working directory is never changed; the tool is started in the
//! selected directory instead. The scratch directory and the askpass helper
//! are removed on every exit path.

use shipwright_actions::{Streams, pipe_input};
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use tracing::{debug, info, warn};

use crate::askpass::AskpassScript;
use crate::config::{DeployConfig, DeployEnvironment};
use crate::error::{DeployError, Result};
use crate::image;
use crate::inventory;
use crate::invocation::{DeploymentInvocation, InvocationParams};

/// A single deployment
#[derive(Clone, Default)]
pub struct DeployRequest {
    pub environment: String,
    pub tags: String,
    /// Platform image to deploy from; takes precedence over `prepare_dir`
    pub image: Option<PathBuf>,
    /// Prepared platform to deploy from when no image is given
    pub prepare_dir: Option<PathBuf>,
    /// Verbose tool output
    pub debug: bool,
    /// Dry run
    pub check: bool,
    /// Duplicate tool output into the log file
    pub logs: bool,
    /// Vault password; inherited from the caller's environment when `None`
    pub password: Option<String>,
}

impl std::fmt::Debug for DeployRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeployRequest")
            .field("environment", &self.environment)
            .field("tags", &self.tags)
            .field("image", &self.image)
            .field("prepare_dir", &self.prepare_dir)
            .field("debug", &self.debug)
            .field("check", &self.check)
            .field("logs", &self.logs)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// How a deployment ended without error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployOutcome {
    Deployed,
    /// The inventory cache was missing; nothing was run
    SkippedMissingCache,
}

/// Runs deployments against a fixed configuration
#[derive(Debug, Clone)]
pub struct DeploymentExecutor {
    config: DeployConfig,
    base_dir: PathBuf,
    environment: DeployEnvironment,
}

impl DeploymentExecutor {
    /// Creates an executor
    ///
    /// # Arguments
    /// * `config` - Deployment configuration
    /// * `base_dir` - Caller's directory; relative paths are resolved against it
    /// * `environment` - Caller's environment, inherited by the tool
    pub fn new(config: DeployConfig, base_dir: PathBuf, environment: DeployEnvironment) -> Self {
        Self {
            config,
            base_dir,
            environment,
        }
    }

    pub fn config(&self) -> &DeployConfig {
        &self.config
    }

    /// Runs a deployment
    ///
    /// # Arguments
    /// * `request` - What to deploy where
    /// * `streams` - Output of the tool is written here; with inherited
    ///   streams the tool is attached to the terminal directly
    ///
    /// # Returns
    /// [`DeployOutcome::SkippedMissingCache`] when the environment has no
    /// inventory cache, [`DeployOutcome::Deployed`] once the tool exits 0
    pub fn execute(&self, request: &DeployRequest, streams: &mut Streams) -> Result<DeployOutcome> {
        self.config.validate()?;

        // Owns the extracted image until this function returns
        let mut scratch = None;

        let workdir = match &request.image {
            Some(image_path) => {
                let image_path = self.resolve(image_path);
                if !image_path.is_file() {
                    return Err(DeployError::ImageNotFound(image_path));
                }

                let dir = ScratchDir::create(self.resolve(&self.config.scratch_dir))?;
                info!("Extracting platform image {}", image_path.display());
                image::extract(&image_path, dir.path())?;
                let path = dir.path().to_path_buf();
                scratch = Some(dir);
                path
            }
            None => match request
                .prepare_dir
                .as_ref()
                .filter(|p| !p.as_os_str().is_empty())
            {
                Some(dir) => self.resolve(dir),
                None => return Err(DeployError::NoWorkingDirectory),
            },
        };

        if !workdir.is_dir() {
            return Err(DeployError::MissingWorkingDirectory(workdir));
        }
        debug!("Deploying from {}", workdir.display());

        if !inventory::cache_exists(&workdir, &self.config, &request.environment) {
            warn!("Inventory cache does not exist, skipping deployment");
            return Ok(DeployOutcome::SkippedMissingCache);
        }

        info!("Deploying {} to {}", request.tags, request.environment);

        let askpass = AskpassScript::create(&self.config.secret_variable)?;
        let invocation = DeploymentInvocation::build(
            &self.config,
            InvocationParams {
                environment: &request.environment,
                tags: &request.tags,
                debug: request.debug,
                check: request.check,
                password: request.password.as_deref(),
            },
            &self.environment,
            askpass.path(),
        );

        let result = self.run(&invocation, &workdir, request.logs, streams);

        drop(askpass);
        drop(scratch);

        result?;
        info!("Deployment completed successfully");
        Ok(DeployOutcome::Deployed)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    fn run(
        &self,
        invocation: &DeploymentInvocation,
        workdir: &Path,
        logs: bool,
        streams: &mut Streams,
    ) -> Result<()> {
        let tool = invocation.program.clone();

        let mut command = Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .current_dir(workdir)
            .env_clear()
            .envs(invocation.env.iter());
        if let Some((key, value)) = invocation.secret() {
            command.env(key, value);
        }

        let log_file = if logs {
            let path = self.resolve(&self.config.log_file);
            let file = File::create(&path).map_err(|source| DeployError::LogFile {
                path: path.clone(),
                source,
            })?;
            info!("Writing deployment log to {}", path.display());
            Some(file)
        } else {
            None
        };

        info!("Running: {}", invocation.command_line());

        let launch = |source: io::Error| DeployError::Launch {
            tool: tool.clone(),
            source,
        };

        let status = if streams.is_inherited() && log_file.is_none() {
            command
                .stdin(Stdio::inherit())
                .stdout(Stdio::inherit())
                .stderr(Stdio::inherit())
                .status()
                .map_err(launch)?
        } else {
            let stdin = if streams.is_inherited() {
                Stdio::inherit()
            } else {
                Stdio::piped()
            };
            let child = command
                .stdin(stdin)
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .spawn()
                .map_err(launch)?;
            tee_output(child, streams, log_file, &tool)?
        };

        match status.code() {
            Some(0) => Ok(()),
            Some(code) => Err(DeployError::ToolFailed { tool, code }),
            None => Err(DeployError::ToolTerminated { tool }),
        }
    }
}

/// Feeds the streams' stdin to the child and copies its stdout and stderr
/// into the streams (and the log file) until both close, then waits for the
/// child
fn tee_output(
    mut child: Child,
    streams: &mut Streams,
    log_file: Option<File>,
    tool: &str,
) -> Result<ExitStatus> {
    let output_error = |source: io::Error| DeployError::Output {
        tool: tool.to_string(),
        source,
    };

    let (log_out, log_err) = match log_file {
        Some(file) => {
            let clone = file.try_clone().map_err(output_error)?;
            (Some(file), Some(clone))
        }
        None => (None, None),
    };

    let child_in = child.stdin.take();
    let child_out = child.stdout.take();
    let child_err = child.stderr.take();
    let stdin = &mut streams.stdin;
    let stdout = &mut streams.stdout;
    let stderr = &mut streams.stderr;

    let copied = thread::scope(|scope| {
        let input = scope.spawn(move || pipe_input(stdin, child_in));
        let out = scope.spawn(move || copy_into(child_out, stdout, log_out));
        let err = scope.spawn(move || copy_into(child_err, stderr, log_err));
        let input = input.join().unwrap_or_else(|_| Err(copy_panicked()));
        let out = out.join().unwrap_or_else(|_| Err(copy_panicked()));
        let err = err.join().unwrap_or_else(|_| Err(copy_panicked()));
        input.and(out).and(err)
    });

    let status = child.wait().map_err(|source| DeployError::Launch {
        tool: tool.to_string(),
        source,
    })?;
    copied.map_err(output_error)?;
    Ok(status)
}

fn copy_into<R: Read>(
    source: Option<R>,
    sink: &mut Box<dyn Write + Send>,
    mut log: Option<File>,
) -> io::Result<()> {
    let Some(mut source) = source else {
        return Ok(());
    };

    let mut buf = [0u8; 8192];
    loop {
        let n = source.read(&mut buf)?;
        if n == 0 {
            break;
        }
        sink.write_all(&buf[..n])?;
        if let Some(log) = log.as_mut() {
            log.write_all(&buf[..n])?;
        }
    }
    sink.flush()
}

fn copy_panicked() -> io::Error {
    io::Error::other("stream copy thread panicked")
}

/// A scratch directory recreated on creation and removed on drop
struct ScratchDir {
    path: PathBuf,
}

impl ScratchDir {
    fn create(path: PathBuf) -> Result<Self> {
        let scratch_error = |source: io::Error| DeployError::ScratchDir {
            path: path.clone(),
            source,
        };

        match fs::remove_dir_all(&path) {
            Ok(()) => debug!("Removed stale scratch directory {}", path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(scratch_error(e)),
        }
        fs::create_dir_all(&path).map_err(scratch_error)?;

        Ok(Self { path })
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        info!("Cleaning up {}", self.path.display());
        if let Err(e) = fs::remove_dir_all(&self.path) {
            warn!(
                "Failed to remove scratch directory {}: {}",
                self.path.display(),
                e
            );
        }
    }
}
