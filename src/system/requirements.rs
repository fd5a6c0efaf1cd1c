//! Container runtime checks.

use std::process::{Command, Stdio};

use tracing::{debug, info, warn};

use crate::error::{Result, SystemRequirementsError};

/// Results of the startup checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemRequirements {
    /// Runtime CLI that was checked.
    pub runtime: String,
    /// Server version reported by the runtime, if it reports one.
    pub runtime_version: Option<String>,
    /// Whether the image is already present locally (otherwise the first call pulls it).
    pub image_present: bool,
}

/// Check all system requirements and return detailed results.
///
/// Returns `Ok(SystemRequirements)` with all check results, or
/// `Err` with the first failing requirement. A missing image is only a warning.
///
/// # Errors
///
/// Returns `SystemRequirementsError::RuntimeUnavailable` if the runtime does not answer.
pub fn check_all(runtime: &str, image: &str) -> Result<SystemRequirements> {
    let runtime_version = check_runtime(runtime)?;
    let image_present = check_image(runtime, image)?;

    if !image_present {
        warn!(image, "Image not present locally, the first execution will pull it");
    }

    Ok(SystemRequirements {
        runtime: runtime.to_string(),
        runtime_version,
        image_present,
    })
}

/// Runs [`check_all`] at startup and reports the outcome without failing.
///
/// An unavailable runtime only fails individual calls, so the server keeps
/// starting either way. Returns `None` when the check failed.
pub fn startup_check(runtime: &str, image: &str) -> Option<SystemRequirements> {
    match check_all(runtime, image) {
        Ok(reqs) => {
            info!(
                runtime = %reqs.runtime,
                version = reqs.runtime_version.as_deref().unwrap_or("unknown"),
                image,
                image_present = reqs.image_present,
                "Container runtime ready"
            );
            Some(reqs)
        }
        Err(crate::Error::SystemRequirements(e)) => {
            warn!(runtime, error = %e, "Container runtime unavailable, calls will fail until it answers");
            None
        }
        Err(e) => {
            warn!(runtime, error = %e, "Container runtime check failed");
            None
        }
    }
}

/// Check that the runtime CLI exists and can reach its daemon.
///
/// Runs `<runtime> version`. The server version is parsed from the output when present.
///
/// # Errors
///
/// Returns `SystemRequirementsError::RuntimeUnavailable` if the CLI is missing or exits non-zero.
pub fn check_runtime(runtime: &str) -> Result<Option<String>> {
    let output = Command::new(runtime)
        .arg("version")
        .stdin(Stdio::null())
        .output()
        .map_err(|e| SystemRequirementsError::RuntimeUnavailable {
            runtime: runtime.to_string(),
            reason: e.to_string(),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(SystemRequirementsError::RuntimeUnavailable {
            runtime: runtime.to_string(),
            reason: first_line(&stderr).unwrap_or("version check failed").to_string(),
        }
        .into());
    }

    let version = parse_server_version(&String::from_utf8_lossy(&output.stdout));
    debug!(runtime, ?version, "Container runtime available");
    Ok(version)
}

/// Check whether `image` is present in the runtime's local store.
///
/// # Errors
///
/// Returns `SystemRequirementsError::ReadFailed` if the runtime cannot be spawned.
pub fn check_image(runtime: &str, image: &str) -> Result<bool> {
    let status = Command::new(runtime)
        .args(["image", "inspect", image])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map_err(|source| SystemRequirementsError::ReadFailed {
            context: format!("{runtime} image inspect {image}"),
            source,
        })?;

    Ok(status.success())
}

/// Extract the server version from `docker version` / `podman version` output.
///
/// Both print a `Server:` section (podman only when remote) whose first
/// `Version:` line is the daemon's. Falls back to the first `Version:` line.
fn parse_server_version(output: &str) -> Option<String> {
    let version_in = |text: &str| {
        text.lines()
            .map(str::trim)
            .find_map(|line| line.strip_prefix("Version:"))
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    match output.find("Server:") {
        Some(idx) => version_in(&output[idx..]).or_else(|| version_in(output)),
        None => version_in(output),
    }
}

fn first_line(text: &str) -> Option<&str> {
    text.lines().map(str::trim).find(|l| !l.is_empty())
}
