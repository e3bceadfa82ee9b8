//! mcp-agent CLI
//!
//! Ask a question, list the server's tools, or print a sample configuration.

use async_trait::async_trait;
use clap::{Parser, Subcommand};
use console::style;
use mcp_agent::agent::{
    connect_server, run_question_with_cancellation, AssistantMessage, LoopCallback, LoopOutcome,
    ToolInvocationRequest, ToolInvocationResult,
};
use mcp_agent::config::{config_path, sample_config, save_config, validate_config, Config};
use mcp_agent::{Error, Result, VERSION};
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(
    name = "mcp-agent",
    version = VERSION,
    about = "Answer questions with a local Ollama model and MCP tools",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask a question (uses the configured default question when omitted)
    Ask {
        /// The question to answer
        question: Option<String>,

        /// Maximum number of tool rounds
        #[arg(short = 'n', long)]
        max_iterations: Option<u32>,

        /// Ollama model to use
        #[arg(short, long)]
        model: Option<String>,

        /// MCP server executable to launch
        #[arg(long, env = "MCP_SERVER_COMMAND")]
        server_command: Option<String>,
    },

    /// List the tools the MCP server exposes
    Tools {
        /// MCP server executable to launch
        #[arg(long, env = "MCP_SERVER_COMMAND")]
        server_command: Option<String>,
    },

    /// Print a sample configuration
    InitConfig {
        /// Write it to the config file instead of printing
        #[arg(long)]
        write: bool,

        /// Overwrite an existing config file
        #[arg(long, short)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("mcp_agent=info".parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Ask {
            question,
            max_iterations,
            model,
            server_command,
        }) => ask(question, max_iterations, model, server_command).await,
        Some(Commands::Tools { server_command }) => list_tools(server_command).await,
        Some(Commands::InitConfig { write, force }) => init_config(write, force),
        None => ask(None, None, None, None).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

/// Load config and fold in command-line overrides
fn load_config(model: Option<String>, server_command: Option<String>) -> Result<Config> {
    let mut config = Config::from_env()?;
    if let Some(model) = model {
        config.provider.ollama.model = model;
    }
    if let Some(command) = server_command {
        config.mcp.command = Some(command);
    }

    let validation = validate_config(&config);
    for warning in &validation.warnings {
        eprintln!("{} {}", style("Warning:").yellow(), warning);
    }
    if !validation.valid {
        let errors: Vec<String> = validation.errors.iter().map(|e| e.to_string()).collect();
        return Err(Error::Config(errors.join("; ")));
    }

    Ok(config)
}

async fn ask(
    question: Option<String>,
    max_iterations: Option<u32>,
    model: Option<String>,
    server_command: Option<String>,
) -> Result<()> {
    let config = load_config(model, server_command)?;
    let question = question.unwrap_or_else(|| config.agent.default_question.clone());
    let max_iterations = max_iterations.unwrap_or(config.agent.max_iterations);

    println!("{} {}", style("Question:").bold(), question);
    println!(
        "{}",
        style(format!("model: {}", config.provider.ollama.model)).dim()
    );

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let progress = ConsoleProgress { max_iterations };
    let report =
        run_question_with_cancellation(&config, &question, max_iterations, &progress, cancel).await?;

    match report.outcome {
        LoopOutcome::FinalAnswer(answer) => {
            println!("\n{}", style("=== Final answer ===").green().bold());
            println!("{}", answer);
            Ok(())
        }
        LoopOutcome::IterationLimitReached => {
            eprintln!(
                "\n{}",
                style(format!(
                    "Warning: reached the maximum number of iterations ({})",
                    max_iterations
                ))
                .yellow()
            );
            Ok(())
        }
        LoopOutcome::Cancelled => {
            eprintln!("\n{}", style("Cancelled.").yellow());
            Ok(())
        }
        LoopOutcome::ModelFailed(message) => Err(Error::Model(message)),
    }
}

async fn list_tools(server_command: Option<String>) -> Result<()> {
    let config = load_config(None, server_command)?;
    let session = connect_server(&config).await?;
    let tools = session.list_tools().await;
    if let Err(e) = session.shutdown().await {
        tracing::warn!("Failed to stop MCP server: {}", e);
    }

    let tools = tools?;
    println!("{} ({})", style("Available tools").bold(), tools.len());
    for tool in tools {
        println!("  {} - {}", style(&tool.name).cyan(), tool.description);
        if !tool.input_schema.required.is_empty() {
            println!("      required: {}", tool.input_schema.required.join(", "));
        }
    }
    Ok(())
}

fn init_config(write: bool, force: bool) -> Result<()> {
    if !write {
        println!("{}", sample_config()?);
        return Ok(());
    }

    let path = config_path();
    if path.exists() && !force {
        return Err(Error::Config(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }
    save_config(&Config::default(), &path)?;
    println!("{} Wrote {}", style("✓").green(), path.display());
    Ok(())
}

/// Prints each step of a run to the terminal
struct ConsoleProgress {
    max_iterations: u32,
}

#[async_trait]
impl LoopCallback for ConsoleProgress {
    async fn on_iteration_start(&self, iteration: u32) {
        println!(
            "\n{}",
            style(format!("--- Iteration {}/{} ---", iteration + 1, self.max_iterations)).cyan()
        );
    }

    async fn on_assistant_message(&self, message: &AssistantMessage) {
        if !message.content.trim().is_empty() {
            println!("{} {}", style("Assistant:").bold(), message.content.trim());
        }
    }

    async fn on_tool_result(&self, request: &ToolInvocationRequest, result: &ToolInvocationResult) {
        let args = serde_json::to_string(&request.arguments).unwrap_or_default();
        println!("{} {} {}", style("Tool:").bold(), style(&request.name).cyan(), style(args).dim());
        if result.failed {
            println!("  {} {}", style("✗").red(), result.text);
        } else {
            println!("  {} {}", style("✓").green(), result.text);
        }
    }
}
