//! Running staged scripts in disposable containers.
//!
//! Each execution shells out to the container runtime CLI:
//!
//! ```text
//! docker run --rm --name <unique> -v <staging>:/app <image> sh -c <command> [sh <modules>...]
//! ```
//!
//! # Notes on installs
//!
//! Module names are never interpolated into the shell string. They are passed as
//! positional parameters and expanded with `"$@"`, so each name reaches pip as a
//! single argument. The install and the script are joined with `&&` so the script
//! does not run when the install fails.
//!
//! # Notes on timeouts and cancellation
//!
//! Killing the runtime CLI does not stop the container it started, so every run
//! gets a unique `--name`. When the configured timeout expires, or the calling
//! future is dropped, the container is force-removed by that name.

use std::process::Stdio;
use std::time::Instant;

use tokio::process::Command;
use tracing::{debug, instrument, trace, warn};
use uuid::Uuid;

use super::SandboxConfig;
use super::workspace::StagingDir;
use crate::error::SandboxError;

/// Exit code reported when the process was terminated by a signal.
pub const SIGNAL_EXIT_CODE: i32 = -1;

/// Output from a script executed in the sandbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Standard output from the script.
    pub stdout: String,
    /// Standard error from the script and the runtime CLI.
    pub stderr: String,
    /// Exit code (0 typically indicates success).
    pub exit_code: i32,
}

impl CommandOutput {
    /// Returns `true` if the command exited successfully (exit code 0).
    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Converts a failed run into `SandboxError::NonZeroExit`, keeping stdout on success.
    ///
    /// # Errors
    ///
    /// Returns `SandboxError::NonZeroExit` carrying the exit code and stderr.
    pub fn into_stdout(self) -> Result<String, SandboxError> {
        if self.success() {
            Ok(self.stdout)
        } else {
            Err(SandboxError::NonZeroExit {
                code: self.exit_code,
                stderr: self.stderr,
            })
        }
    }
}

/// Runs Python scripts in a fresh container per call.
///
/// Holds only immutable configuration, so one instance can be shared across
/// concurrent calls.
///
/// # Example
///
/// ```no_run
/// use python_executor::sandbox::{SandboxConfig, SandboxContainer};
///
/// # async fn demo() -> Result<(), python_executor::error::SandboxError> {
/// let sandbox = SandboxContainer::new(SandboxConfig::default());
/// let stdout = sandbox.run_script("print('hello')", &[]).await?;
/// assert_eq!(stdout, "hello\n");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SandboxContainer {
    config: SandboxConfig,
}

impl SandboxContainer {
    /// Creates a new sandbox with the given configuration.
    #[must_use]
    pub fn new(config: SandboxConfig) -> Self {
        Self { config }
    }

    /// Returns a reference to the sandbox configuration.
    #[must_use]
    pub fn config(&self) -> &SandboxConfig {
        &self.config
    }

    /// Generates a unique container name.
    #[must_use]
    pub fn container_name() -> String {
        format!("python-exec-{}", Uuid::new_v4().simple())
    }

    /// Shell command run inside the container.
    ///
    /// With modules, expects them as positional parameters (`"$@"`).
    #[must_use]
    pub fn shell_command(&self, has_modules: bool) -> String {
        let run = format!("python {}", self.config.script_path());
        if has_modules {
            format!("python -m pip install --quiet \"$@\" && {run}")
        } else {
            run
        }
    }

    /// Builds the runtime CLI arguments for one execution.
    #[must_use]
    pub fn build_run_args(&self, volume: &str, name: &str, modules: &[String]) -> Vec<String> {
        let mut args: Vec<String> = vec![
            "run".into(),
            "--rm".into(),
            "--name".into(),
            name.into(),
            "-v".into(),
            volume.into(),
            self.config.image.clone(),
            "sh".into(),
            "-c".into(),
            self.shell_command(!modules.is_empty()),
        ];

        if !modules.is_empty() {
            // $0 for the inline script, then one positional parameter per module
            args.push("sh".into());
            args.extend(modules.iter().cloned());
        }

        args
    }

    /// Stages `code`, runs it in a container and returns the captured output.
    ///
    /// The staging directory is removed before this returns, whatever the outcome.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - `SandboxError::StagingFailed` / `SandboxError::WriteFailed` if staging fails
    /// - `SandboxError::LaunchFailed` if the runtime CLI cannot be spawned
    /// - `SandboxError::Timeout` if the configured timeout expires
    #[instrument(skip(self, code, modules), fields(runtime = %self.config.runtime, module_count = modules.len()))]
    pub async fn execute(
        &self,
        code: &str,
        modules: &[String],
    ) -> Result<CommandOutput, SandboxError> {
        let staging = StagingDir::with_script(&self.config.staging_prefix, code)?;

        let name = Self::container_name();
        let args = self.build_run_args(
            &staging.volume_spec(&self.config.mount_point),
            &name,
            modules,
        );
        trace!(?args, "Runtime arguments");

        let mut cmd = Command::new(&self.config.runtime);
        cmd.args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!(container = %name, "Starting container");
        let start = Instant::now();
        let mut guard = ContainerGuard::new(&self.config.runtime, &name);

        let result = match self.config.timeout {
            Some(limit) => match tokio::time::timeout(limit, cmd.output()).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(container = %name, elapsed_ms = %start.elapsed().as_millis(), "Execution timed out, removing container");
                    guard.disarm();
                    force_remove(&self.config.runtime, &name).await;
                    staging.close();
                    return Err(SandboxError::Timeout {
                        timeout_seconds: limit.as_secs(),
                    });
                }
            },
            None => cmd.output().await,
        };
        guard.disarm();
        staging.close();

        let output = result.map_err(SandboxError::LaunchFailed)?;
        let exit_code = output.status.code().unwrap_or(SIGNAL_EXIT_CODE);

        debug!(container = %name, exit_code, elapsed_ms = %start.elapsed().as_millis(), "Container exited");
        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code,
        })
    }

    /// Runs `code` and returns stdout verbatim, treating a non-zero exit as an error.
    ///
    /// # Errors
    ///
    /// Returns the same errors as `execute()`, plus `SandboxError::NonZeroExit`.
    pub async fn run_script(&self, code: &str, modules: &[String]) -> Result<String, SandboxError> {
        self.execute(code, modules).await?.into_stdout()
    }
}

/// Force-removes a container by name, logging the outcome.
async fn force_remove(runtime: &str, name: &str) {
    let status = Command::new(runtime)
        .args(["rm", "-f", name])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await;

    match status {
        Ok(status) if status.success() => debug!(container = %name, "Container removed"),
        Ok(status) => warn!(container = %name, %status, "Container removal failed"),
        Err(e) => warn!(container = %name, error = %e, "Failed to run container removal"),
    }
}

/// Removes the named container if dropped while still armed.
///
/// Covers the call future being dropped mid-run, e.g. when the client cancels.
struct ContainerGuard {
    runtime: String,
    name: String,
    armed: bool,
}

impl ContainerGuard {
    fn new(runtime: &str, name: &str) -> Self {
        Self {
            runtime: runtime.to_string(),
            name: name.to_string(),
            armed: true,
        }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for ContainerGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }

        warn!(container = %self.name, "Execution cancelled, removing container");
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let runtime = std::mem::take(&mut self.runtime);
                let name = std::mem::take(&mut self.name);
                handle.spawn(async move { force_remove(&runtime, &name).await });
            }
            Err(_) => warn!(container = %self.name, "No async runtime, container left running"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn modules(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_command_output_success() {
        let output = CommandOutput {
            stdout: "hi\n".into(),
            stderr: String::new(),
            exit_code: 0,
        };
        assert!(output.success());
        assert_eq!(output.into_stdout().unwrap(), "hi\n");

        let output = CommandOutput {
            stdout: String::new(),
            stderr: "Traceback".into(),
            exit_code: 1,
        };
        assert!(!output.success());
        let err = output.into_stdout().unwrap_err();
        assert_eq!(err.to_string(), "Python execution failed with code 1: Traceback");
    }

    #[test]
    fn test_run_args_without_modules() {
        let sandbox = SandboxContainer::new(SandboxConfig::default());
        let args = sandbox.build_run_args("/tmp/x:/app", "c1", &[]);

        assert_eq!(
            args,
            vec![
                "run",
                "--rm",
                "--name",
                "c1",
                "-v",
                "/tmp/x:/app",
                crate::sandbox::config::DEFAULT_IMAGE,
                "sh",
                "-c",
                "python /app/script.py",
            ]
        );
        assert!(!args.iter().any(|a| a.contains("pip")));
    }

    #[test]
    fn test_run_args_with_modules() {
        let sandbox = SandboxContainer::new(SandboxConfig::default());
        let args = sandbox.build_run_args("/tmp/x:/app", "c1", &modules(&["a", "b", "c"]));

        let script = &args[9];
        let install = script.find("pip install --quiet \"$@\"").expect("install step");
        let and = script.find("&&").expect("sequenced with &&");
        let run = script.find("python /app/script.py").expect("run step");
        assert!(install < and && and < run);

        assert_eq!(&args[10..], &["sh", "a", "b", "c"]);
    }

    #[test]
    fn test_module_names_not_interpolated() {
        let sandbox = SandboxContainer::new(SandboxConfig::default());
        let args = sandbox.build_run_args("/tmp/x:/app", "c1", &modules(&["x; rm -rf /"]));

        assert!(!args[9].contains("rm -rf"));
        assert_eq!(args.last().map(String::as_str), Some("x; rm -rf /"));
    }

    #[test]
    fn test_custom_mount_point_and_image() {
        let config = SandboxConfig::default()
            .with_image("python:3.12")
            .with_mount_point("/work");
        let sandbox = SandboxContainer::new(config);
        let args = sandbox.build_run_args("/tmp/x:/work", "c1", &[]);

        assert_eq!(args[6], "python:3.12");
        assert_eq!(args[9], "python /work/script.py");
    }

    #[test]
    fn test_container_names_unique() {
        let a = SandboxContainer::container_name();
        let b = SandboxContainer::container_name();
        assert!(a.starts_with("python-exec-"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_config_accessor() {
        let sandbox = SandboxContainer::new(SandboxConfig::default().with_runtime("podman"));
        assert_eq!(sandbox.config().runtime, "podman");
    }
}
