//! Python executor - Entry Point
//!
//! This is the main entry point for the MCP server binary.

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use miette::{IntoDiagnostic, Result};
use tracing::{Level, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use python_executor::sandbox::config::{DEFAULT_IMAGE, DEFAULT_RUNTIME};
use python_executor::server::{DEFAULT_BIND, Transport};
use python_executor::{SandboxConfig, SandboxContainer, server, system};

/// Python executor - run Python code in disposable containers for AI agents.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Run in SSE mode (HTTP event-stream) instead of stdio mode
    #[arg(long, default_value = "false")]
    sse: bool,

    /// Listen address for SSE mode
    #[arg(long, default_value = DEFAULT_BIND)]
    bind: SocketAddr,

    /// Container runtime CLI to invoke
    #[arg(long, default_value = DEFAULT_RUNTIME)]
    runtime: String,

    /// Image the code runs in (must provide python and pip)
    #[arg(long, default_value = DEFAULT_IMAGE)]
    image: String,

    /// Kill an execution after this many seconds (0 disables the limit)
    #[arg(long, default_value = "300")]
    timeout_secs: u64,

    /// Skip the container runtime checks
    #[arg(long, default_value = "false")]
    skip_checks: bool,

    /// Enable verbose logging
    #[arg(short, long, default_value = "false")]
    verbose: bool,
}

impl Args {
    fn sandbox_config(&self) -> SandboxConfig {
        SandboxConfig::default()
            .with_runtime(&self.runtime)
            .with_image(&self.image)
            .with_timeout_secs(self.timeout_secs)
    }

    fn transport(&self) -> Transport {
        if self.sse {
            Transport::Sse { bind: self.bind }
        } else {
            Transport::Stdio
        }
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    // stdout carries JSON-RPC in stdio mode
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = args.sandbox_config();
    let transport = args.transport();
    info!(
        version = env!("CARGO_PKG_VERSION"),
        %transport,
        runtime = %config.runtime,
        image = %config.image,
        timeout_secs = config.timeout.map_or(0, |t| t.as_secs()),
        "Python executor starting"
    );

    if args.skip_checks {
        warn!("Skipping container runtime checks (--skip-checks)");
    } else {
        system::startup_check(&config.runtime, &config.image);
    }

    let sandbox = Arc::new(SandboxContainer::new(config));

    if let Err(e) = server::run(sandbox, transport).await {
        error!(error = %e, "Failed to start {transport} server");
        return Err(e).into_diagnostic();
    }

    Ok(())
}
