//! Run setup: acquire the tool session, run the loop, release the session.

use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::agent::agentic_loop::{AgentLoop, LoopCallback, LoopReport};
use crate::agent::client::OllamaClient;
use crate::config::{default_server_command, Config};
use crate::error::Result;
use crate::mcp::{tool_definitions, McpClient};

/// Spawn the configured MCP server and complete the handshake
pub async fn connect_server(config: &Config) -> Result<McpClient> {
    let command = match config.mcp.command.clone() {
        Some(command) => command,
        None => default_server_command()?.to_string_lossy().into_owned(),
    };

    info!("Connecting to MCP server: {}", command);
    McpClient::spawn(&command, &config.mcp.args, &config.mcp.env).await
}

/// Answer `question` with a fresh tool session.
///
/// Only setup (spawning the server, the handshake, listing tools, building
/// the model client) can fail; once the loop starts the result is a report.
pub async fn run_question(
    config: &Config,
    question: &str,
    max_iterations: u32,
    callback: &dyn LoopCallback,
) -> Result<LoopReport> {
    run_question_with_cancellation(config, question, max_iterations, callback, CancellationToken::new()).await
}

/// Like [`run_question`], stopping early once `cancel` fires
pub async fn run_question_with_cancellation(
    config: &Config,
    question: &str,
    max_iterations: u32,
    callback: &dyn LoopCallback,
    cancel: CancellationToken,
) -> Result<LoopReport> {
    let session = connect_server(config).await?;

    let report = run_with_session(config, &session, question, max_iterations, callback, cancel).await;

    if let Err(e) = session.shutdown().await {
        warn!("Failed to stop MCP server {}: {}", session.name(), e);
    }
    report
}

async fn run_with_session(
    config: &Config,
    session: &McpClient,
    question: &str,
    max_iterations: u32,
    callback: &dyn LoopCallback,
    cancel: CancellationToken,
) -> Result<LoopReport> {
    let tools = tool_definitions(session).await?;
    info!(
        "Loaded tools: {:?}",
        tools.iter().map(|t| t.function.name.as_str()).collect::<Vec<_>>()
    );
    if tools.is_empty() {
        warn!("MCP server {} exposes no tools", session.name());
    }

    let model = OllamaClient::new(config.provider.ollama.clone())?
        .with_system_prompt(config.agent.system_prompt.clone())
        .with_tools(tools);

    let mut agent = AgentLoop::new(&model, session)
        .with_callback(callback)
        .with_cancellation(cancel);
    if let Some(secs) = config.agent.tool_timeout_secs {
        agent = agent.with_tool_timeout(Duration::from_secs(secs));
    }

    Ok(agent.run_detailed(question, max_iterations).await)
}
