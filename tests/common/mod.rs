//! Shared helpers for integration tests.
//!
//! `StubRuntime` stands in for the container runtime CLI: a small shell script
//! that logs every invocation and then behaves as configured. It lets the tests
//! exercise staging, argument building and exit-code handling without Docker.

#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use python_executor::SandboxConfig;
use tempfile::TempDir;

/// Prints the staged script, as `python` would for a script made of output.
pub const ECHO_SCRIPT: &str = r#"cat "$host/script.py""#;

/// Prints the host path of the staging directory.
pub const PRINT_STAGING_DIR: &str = r#"printf '%s' "$host""#;

/// Fails the way a raised exception does.
pub const FAIL: &str = r#"echo "Traceback: ValueError: boom" >&2
exit 3"#;

/// Never finishes within a test timeout.
pub const HANG: &str = "sleep 5";

pub struct StubRuntime {
    dir: TempDir,
    path: PathBuf,
    log: PathBuf,
}

impl StubRuntime {
    /// Creates a stub whose `run` subcommand executes `behaviour`.
    ///
    /// Inside `behaviour`, `$host` is the host side of the `-v` mount.
    pub fn new(behaviour: &str) -> Self {
        let dir = TempDir::new().expect("failed to create stub dir");
        let path = dir.path().join("fake-runtime");
        let log = dir.path().join("invocations.log");

        let script = format!(
            r#"#!/bin/sh
printf '%s\n' "$*" >> '{log}'
[ "$1" = "run" ] || exit 0
prev=""
mount=""
for arg in "$@"; do
  if [ "$prev" = "-v" ]; then mount="$arg"; fi
  prev="$arg"
done
host="${{mount%%:*}}"
{behaviour}
"#,
            log = log.display(),
        );

        fs::write(&path, script).expect("failed to write stub runtime");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
            .expect("failed to chmod stub runtime");

        Self { dir, path, log }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sandbox configuration pointing at this stub with a short timeout.
    pub fn config(&self) -> SandboxConfig {
        SandboxConfig::default()
            .with_runtime(self.path.to_string_lossy())
            .with_timeout(Some(Duration::from_secs(10)))
    }

    /// Every invocation so far, one space-joined argument line each.
    pub fn invocations(&self) -> Vec<String> {
        match fs::read_to_string(&self.log) {
            Ok(content) => content.lines().map(String::from).collect(),
            Err(_) => Vec::new(),
        }
    }
}

/// Whether a Docker daemon is reachable, for the tests that need a real one.
pub fn docker_available() -> bool {
    std::process::Command::new("docker")
        .arg("version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}
