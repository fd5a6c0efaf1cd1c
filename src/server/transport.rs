//! Transport bootstrap: stdio or HTTP event-stream.

use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;

use rmcp::transport::streamable_http_server::{
    StreamableHttpServerConfig, StreamableHttpService, session::local::LocalSessionManager,
};
use tracing::{debug, info, warn};

use super::handler::{PythonExecutorServer, run_stdio};
use crate::error::{Result, ServerError};
use crate::sandbox::SandboxContainer;

/// Default listen address for the HTTP transport.
pub const DEFAULT_BIND: &str = "0.0.0.0:8080";

/// Path the MCP endpoint is served under in HTTP mode.
pub const MCP_PATH: &str = "/mcp";

/// How the server talks to its client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    /// JSON-RPC over stdin/stdout.
    Stdio,
    /// Streamable HTTP with server-sent event responses.
    Sse { bind: SocketAddr },
}

impl Transport {
    /// Base URL clients should connect to, if this transport has one.
    #[must_use]
    pub fn base_url(&self) -> Option<String> {
        match self {
            Self::Stdio => None,
            Self::Sse { bind } => Some(format!("http://localhost:{}", bind.port())),
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdio => write!(f, "stdio"),
            Self::Sse { bind } => write!(f, "sse ({bind})"),
        }
    }
}

/// Serve the tool over the selected transport until the client or a signal stops it.
///
/// # Errors
///
/// Returns error if the transport cannot be started or fails while serving.
pub async fn run(sandbox: Arc<SandboxContainer>, transport: Transport) -> Result<()> {
    debug!(%transport, "Selected transport");
    match transport {
        Transport::Stdio => run_stdio(PythonExecutorServer::with_sandbox(sandbox)).await,
        Transport::Sse { bind } => run_http(sandbox, bind).await,
    }
}

/// Run the MCP server as an HTTP service on `bind`.
///
/// Each HTTP session gets its own server instance sharing `sandbox`.
///
/// # Errors
///
/// Returns `ServerError::Bind` if the listener cannot be bound.
pub async fn run_http(sandbox: Arc<SandboxContainer>, bind: SocketAddr) -> Result<()> {
    let service = StreamableHttpService::new(
        move || Ok(PythonExecutorServer::with_sandbox(Arc::clone(&sandbox))),
        LocalSessionManager::default().into(),
        StreamableHttpServerConfig::default(),
    );
    let router = axum::Router::new().nest_service(MCP_PATH, service);

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .map_err(|source| ServerError::Bind {
            addr: bind.to_string(),
            source,
        })?;

    let base_url = Transport::Sse { bind }.base_url().unwrap_or_default();
    info!(%bind, "Starting SSE server on {base_url}{MCP_PATH}");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ServerError::Transport(e.to_string()))?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl-C, shutting down"),
        Err(e) => warn!(error = %e, "Failed to listen for Ctrl-C"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url() {
        assert_eq!(Transport::Stdio.base_url(), None);

        let bind: SocketAddr = DEFAULT_BIND.parse().unwrap();
        assert_eq!(
            Transport::Sse { bind }.base_url().as_deref(),
            Some("http://localhost:8080")
        );
    }

    #[test]
    fn test_display() {
        let bind: SocketAddr = "127.0.0.1:9000".parse().unwrap();
        assert_eq!(Transport::Stdio.to_string(), "stdio");
        assert_eq!(Transport::Sse { bind }.to_string(), "sse (127.0.0.1:9000)");
    }
}
