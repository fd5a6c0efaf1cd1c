//! Python executor - an MCP server that runs Python code in disposable containers.
//!
//! The server exposes a single tool, `execute-python`. Each call stages the code
//! in a fresh temporary directory, runs it in a container removed on exit
//! (optionally pip-installing modules first) and returns whatever the script
//! printed to stdout.
//!
//! # Platform Requirements
//!
//! - A container runtime CLI (`docker` by default, `podman` works too)
//! - Access to the `mcr.microsoft.com/playwright/python` image, or another image
//!   with `python` and `pip` on its `PATH`
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use python_executor::{SandboxConfig, SandboxContainer, server, system};
//!
//! #[tokio::main]
//! async fn main() -> miette::Result<()> {
//!     let config = SandboxConfig::default();
//!
//!     // Validate the container runtime
//!     system::check_all(&config.runtime, &config.image)?;
//!
//!     // Start MCP server over stdio
//!     let sandbox = Arc::new(SandboxContainer::new(config));
//!     server::run(sandbox, server::Transport::Stdio).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod sandbox;
pub mod server;
pub mod system;

// Re-export commonly used types
pub use error::{Error, Result};
pub use sandbox::{CommandOutput, SandboxConfig, SandboxContainer};
pub use server::{ExecutePythonRequest, PythonExecutorServer, Transport};
