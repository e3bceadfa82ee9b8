//! mcp-agent-server
//!
//! MCP tool server over stdio. Stdout carries the protocol, so logs go to
//! stderr.

use clap::Parser;
use mcp_agent::server::serve;
use mcp_agent::{Error, Result, VERSION};
use tracing::info;
use tracing_subscriber::filter::Directive;

#[derive(Parser)]
#[command(
    name = "mcp-agent-server",
    version = VERSION,
    about = "MCP server exposing add, load_csv and csv_stats over stdio"
)]
struct Args {
    /// Transport to serve on (only stdio is supported)
    #[arg(long, default_value = "stdio")]
    transport: String,

    /// Bind host for network transports
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Bind port for network transports
    #[arg(long, default_value_t = 8000)]
    port: u16,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(long, default_value = "INFO")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let directive = format!("mcp_agent={}", args.log_level.to_lowercase())
        .parse::<Directive>()
        .map_err(|e| Error::Config(format!("Invalid --log-level {}: {}", args.log_level, e)))?;
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(directive))
        .with_writer(std::io::stderr)
        .init();

    if args.transport != "stdio" {
        return Err(Error::Config(format!(
            "Unsupported transport '{}' (only stdio is supported)",
            args.transport
        )));
    }

    info!(
        "Starting MCP server on stdio (host={}, port={} unused)",
        args.host, args.port
    );
    serve(tokio::io::stdin(), tokio::io::stdout()).await
}
