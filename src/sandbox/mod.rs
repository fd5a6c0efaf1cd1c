//! Disposable container execution of Python scripts.
//!
//! A call stages the code in a fresh temporary directory, mounts it into a
//! container started with `--rm`, optionally installs pip packages, runs the
//! script and captures its output. Nothing persists between calls.
//!
//! # Example
//!
//! ```no_run
//! use python_executor::sandbox::{SandboxConfig, SandboxContainer};
//!
//! # async fn demo() -> Result<(), python_executor::error::SandboxError> {
//! let config = SandboxConfig::default().with_timeout_secs(60);
//! let sandbox = SandboxContainer::new(config);
//!
//! let output = sandbox
//!     .execute("import requests; print(requests.__name__)", &["requests".to_string()])
//!     .await?;
//! assert!(output.success());
//! # Ok(())
//! # }
//! ```

pub mod config;
mod container;
mod workspace;

pub use config::SandboxConfig;
pub use container::{CommandOutput, SIGNAL_EXIT_CODE, SandboxContainer};
pub use workspace::StagingDir;
