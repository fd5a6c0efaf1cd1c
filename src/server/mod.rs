//! MCP server implementation.
//!
//! This module provides the MCP server that handles `execute-python` calls and
//! the transports it can be served over.

mod handler;
mod request;
mod transport;

pub use handler::{PythonExecutorServer, SERVER_NAME, run_stdio};
pub use request::{ExecutePythonParams, ExecutePythonRequest, ToolArguments, parse_modules};
pub use transport::{DEFAULT_BIND, MCP_PATH, Transport, run, run_http};
