//! MCP server handler implementation.

use std::sync::Arc;

use rmcp::{
    ErrorData as McpError, ServiceExt,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
    transport::stdio,
};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::request::{ExecutePythonRequest, ToolArguments};
use crate::error::ServerError;
use crate::sandbox::{SandboxConfig, SandboxContainer};

/// Name the server reports during initialization.
pub const SERVER_NAME: &str = "python-executor";

/// The MCP server exposing the `execute-python` tool.
///
/// Cheap to clone; every clone shares the same sandbox configuration.
#[derive(Clone)]
pub struct PythonExecutorServer {
    sandbox: Arc<SandboxContainer>,
    tool_router: ToolRouter<Self>,
}

impl PythonExecutorServer {
    /// Create a new server running scripts with the given sandbox configuration.
    #[must_use]
    pub fn new(config: SandboxConfig) -> Self {
        Self::with_sandbox(Arc::new(SandboxContainer::new(config)))
    }

    /// Create a new server around an existing, possibly shared, sandbox.
    #[must_use]
    pub fn with_sandbox(sandbox: Arc<SandboxContainer>) -> Self {
        Self {
            sandbox,
            tool_router: Self::tool_router(),
        }
    }

    /// Returns the sandbox used for executions.
    #[must_use]
    pub fn sandbox(&self) -> &SandboxContainer {
        &self.sandbox
    }

    /// Handles one `execute-python` call with untyped arguments.
    ///
    /// Every failure is reported as an error result; nothing is propagated.
    pub async fn execute(&self, arguments: Value) -> CallToolResult {
        let request = match ExecutePythonRequest::from_arguments(arguments) {
            Ok(request) => request,
            Err(e) => {
                warn!(error = %e, "Rejected execute-python arguments");
                return CallToolResult::error(vec![Content::text(e.to_string())]);
            }
        };

        debug!(
            code_len = request.code.len(),
            modules = ?request.modules,
            "Executing Python code"
        );

        match self
            .sandbox
            .run_script(&request.code, &request.modules)
            .await
        {
            Ok(stdout) => CallToolResult::success(vec![Content::text(stdout)]),
            Err(e) => {
                warn!(error = %e, "Python execution failed");
                CallToolResult::error(vec![Content::text(e.to_string())])
            }
        }
    }
}

#[tool_router]
impl PythonExecutorServer {
    #[tool(
        name = "execute-python",
        description = "Execute Python code in an isolated environment. Playwright and headless browser are available for web scraping. Use this tool when you need real-time information, only output printed to stdout or stderr is returned so ALWAYS use print statements! Please note all code is run in an ephemeral container so modules and code do not persist."
    )]
    async fn execute_python(
        &self,
        Parameters(arguments): Parameters<ToolArguments>,
    ) -> Result<CallToolResult, McpError> {
        Ok(self.execute(arguments.into_inner()).await)
    }
}

#[tool_handler]
impl rmcp::ServerHandler for PythonExecutorServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Python executor - runs Python code in a disposable container via the \
                 execute-python tool. Print results to stdout; nothing persists between calls."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: SERVER_NAME.into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

/// Run the MCP server over stdin/stdout until the client disconnects.
///
/// # Errors
///
/// Returns error if the MCP handshake or the transport fails.
pub async fn run_stdio(server: PythonExecutorServer) -> crate::error::Result<()> {
    let runtime = server.sandbox().config().runtime.clone();

    let service = server
        .serve(stdio())
        .await
        .map_err(|e| ServerError::InitializationFailed(e.to_string()))?;
    info!(%runtime, "Serving execute-python over stdio");

    let reason = service
        .waiting()
        .await
        .map_err(|e| ServerError::Transport(e.to_string()))?;

    info!(?reason, "Stdio client disconnected");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmcp::ServerHandler;

    #[test]
    fn test_server_info() {
        let server = PythonExecutorServer::new(SandboxConfig::default());
        let info = server.get_info();

        assert_eq!(info.server_info.name, SERVER_NAME);
        assert!(info.capabilities.tools.is_some());
    }

    #[test]
    fn test_tool_registered() {
        let server = PythonExecutorServer::new(SandboxConfig::default());
        let tools = server.tool_router.list_all();

        assert_eq!(tools.len(), 1);
        let tool = &tools[0];
        assert_eq!(tool.name, "execute-python");

        let description = tool.description.as_deref().unwrap_or_default();
        assert!(description.contains("do not persist"));
        assert!(description.contains("print statements"));

        let schema = serde_json::Value::Object((*tool.input_schema).clone());
        assert_eq!(schema["required"], serde_json::json!(["code"]));
    }
}
