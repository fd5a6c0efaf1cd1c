//! Error types for the Python executor.
//!
//! Uses thiserror for deriving std::error::Error and miette for rich diagnostics.
//! The `Display` text of [`RequestError`] and [`SandboxError`] is returned to MCP
//! clients verbatim as the tool error message, so keep it human-readable.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for the application.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// System requirements not met
    #[error("System requirements check failed")]
    #[diagnostic(code(pyexec::system::requirements))]
    SystemRequirements(#[from] SystemRequirementsError),

    /// MCP server error
    #[error("MCP server error")]
    #[diagnostic(code(pyexec::server))]
    Server(#[from] ServerError),
}

/// Errors raised while decoding `execute-python` arguments.
#[derive(Error, Debug, Diagnostic, PartialEq, Eq)]
pub enum RequestError {
    /// Arguments were not a JSON object
    #[error("Invalid arguments")]
    #[diagnostic(code(pyexec::request::invalid_arguments))]
    InvalidArguments,

    /// `code` was absent or not a string
    #[error("Missing or invalid code parameter")]
    #[diagnostic(
        code(pyexec::request::missing_code),
        help("Pass the Python source as a string in the `code` parameter")
    )]
    MissingCode,
}

/// Errors related to staging and running a script in a container.
#[derive(Error, Debug, Diagnostic)]
pub enum SandboxError {
    /// Temporary staging directory could not be created
    #[error("Failed to create temporary directory: {0}")]
    #[diagnostic(code(pyexec::sandbox::staging))]
    StagingFailed(#[source] std::io::Error),

    /// Script could not be written into the staging directory
    #[error("Failed to write script to temporary directory: {0}")]
    #[diagnostic(code(pyexec::sandbox::write))]
    WriteFailed(#[source] std::io::Error),

    /// The container runtime could not be launched or waited on
    #[error("Python execution failed: {0}")]
    #[diagnostic(
        code(pyexec::sandbox::launch),
        help("Check that the container runtime is installed and its daemon is running")
    )]
    LaunchFailed(#[source] std::io::Error),

    /// The container exited with a non-zero status
    #[error("Python execution failed with code {code}: {stderr}")]
    #[diagnostic(code(pyexec::sandbox::exit_status))]
    NonZeroExit { code: i32, stderr: String },

    /// Execution exceeded the configured timeout
    #[error("Python execution timed out after {timeout_seconds} seconds")]
    #[diagnostic(code(pyexec::sandbox::timeout))]
    Timeout { timeout_seconds: u64 },
}

/// Errors related to system requirements validation.
#[derive(Error, Debug, Diagnostic)]
pub enum SystemRequirementsError {
    /// The container runtime did not answer
    #[error("Container runtime `{runtime}` is not available: {reason}")]
    #[diagnostic(
        code(pyexec::system::runtime_unavailable),
        help("Install Docker (or pass --runtime podman) and make sure the daemon is running; calls fail until then")
    )]
    RuntimeUnavailable { runtime: String, reason: String },

    /// Failed to run a runtime check command
    #[error("Failed to read system information: {context}")]
    #[diagnostic(code(pyexec::system::read_failed))]
    ReadFailed {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors related to the MCP server.
#[derive(Error, Debug, Diagnostic)]
pub enum ServerError {
    /// Failed to initialize server
    #[error("Failed to initialize MCP server: {0}")]
    #[diagnostic(code(pyexec::server::init))]
    InitializationFailed(String),

    /// Transport error
    #[error("Transport error: {0}")]
    #[diagnostic(code(pyexec::server::transport))]
    Transport(String),

    /// Could not bind the HTTP listener
    #[error("Failed to bind {addr}: {source}")]
    #[diagnostic(
        code(pyexec::server::bind),
        help("Another process may already be listening on this address; try --bind")
    )]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, Error>;
