//! Configuration for sandbox containers.

use std::time::Duration;

/// Container runtime CLI used when none is configured.
pub const DEFAULT_RUNTIME: &str = "docker";

/// Python 3 image with Playwright and a headless browser preinstalled.
pub const DEFAULT_IMAGE: &str = "mcr.microsoft.com/playwright/python:v1.49.1-noble";

/// Where the staging directory is mounted inside the container.
pub const DEFAULT_MOUNT_POINT: &str = "/app";

/// File name the submitted code is written to.
pub const SCRIPT_FILE_NAME: &str = "script.py";

/// Default hard limit for a single execution.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Configuration for a sandbox container.
///
/// Use the builder methods to customize the sandbox behavior.
///
/// # Example
///
/// ```
/// use python_executor::sandbox::SandboxConfig;
/// use std::time::Duration;
///
/// let config = SandboxConfig::default()
///     .with_runtime("podman")
///     .with_image("python:3.12-slim")
///     .with_timeout(Some(Duration::from_secs(60)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxConfig {
    /// Container runtime CLI (`docker`, `podman`, or a path to one).
    pub runtime: String,

    /// Image the script runs in.
    pub image: String,

    /// Mount point of the staging directory inside the container.
    pub mount_point: String,

    /// Maximum time allowed for one execution. `None` waits forever.
    pub timeout: Option<Duration>,

    /// Prefix for staging directory names.
    pub staging_prefix: String,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            runtime: String::from(DEFAULT_RUNTIME),
            image: String::from(DEFAULT_IMAGE),
            mount_point: String::from(DEFAULT_MOUNT_POINT),
            timeout: Some(DEFAULT_TIMEOUT),
            staging_prefix: String::from("python_repl"),
        }
    }
}

impl SandboxConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the container runtime CLI.
    #[must_use]
    pub fn with_runtime(mut self, runtime: impl Into<String>) -> Self {
        self.runtime = runtime.into();
        self
    }

    /// Sets the container image.
    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    /// Sets the in-container mount point for the staging directory.
    #[must_use]
    pub fn with_mount_point(mut self, mount_point: impl Into<String>) -> Self {
        self.mount_point = mount_point.into();
        self
    }

    /// Sets the execution timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the execution timeout from whole seconds, `0` meaning no limit.
    #[must_use]
    pub fn with_timeout_secs(self, seconds: u64) -> Self {
        let timeout = (seconds > 0).then(|| Duration::from_secs(seconds));
        self.with_timeout(timeout)
    }

    /// Sets the staging directory name prefix.
    #[must_use]
    pub fn with_staging_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.staging_prefix = prefix.into();
        self
    }

    /// Path of the staged script as seen from inside the container.
    #[must_use]
    pub fn script_path(&self) -> String {
        format!(
            "{}/{}",
            self.mount_point.trim_end_matches('/'),
            SCRIPT_FILE_NAME
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SandboxConfig::default();
        assert_eq!(config.runtime, "docker");
        assert_eq!(config.image, DEFAULT_IMAGE);
        assert_eq!(config.mount_point, "/app");
        assert_eq!(config.timeout, Some(Duration::from_secs(300)));
        assert_eq!(config.staging_prefix, "python_repl");
    }

    #[test]
    fn test_builder_chain() {
        let config = SandboxConfig::new()
            .with_runtime("podman")
            .with_image("python:3.12")
            .with_mount_point("/work/")
            .with_timeout(Some(Duration::from_secs(5)))
            .with_staging_prefix("test_");

        assert_eq!(config.runtime, "podman");
        assert_eq!(config.image, "python:3.12");
        assert_eq!(config.timeout, Some(Duration::from_secs(5)));
        assert_eq!(config.staging_prefix, "test_");
        assert_eq!(config.script_path(), "/work/script.py");
    }

    #[test]
    fn test_timeout_secs_zero_disables() {
        let config = SandboxConfig::new().with_timeout_secs(0);
        assert!(config.timeout.is_none());

        let config = SandboxConfig::new().with_timeout_secs(12);
        assert_eq!(config.timeout, Some(Duration::from_secs(12)));
    }

    #[test]
    fn test_default_script_path() {
        assert_eq!(SandboxConfig::default().script_path(), "/app/script.py");
    }
}
