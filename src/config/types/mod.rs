//! Configuration types module

pub mod provider;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::agent::DEFAULT_MAX_ITERATIONS;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Agent configuration
    #[serde(default)]
    pub agent: AgentConfig,

    /// Provider configuration (Ollama)
    #[serde(default)]
    pub provider: provider::ProviderConfig,

    /// MCP server launch configuration
    #[serde(default)]
    pub mcp: McpServerConfig,
}

impl Config {
    /// Load configuration from the config file and environment
    pub fn from_env() -> crate::error::Result<Self> {
        crate::config::load_config()
    }
}

/// Agent-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Tool rounds allowed per question
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
    /// System prompt sent ahead of the conversation
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
    /// Question asked when none is given on the command line
    #[serde(default = "default_question")]
    pub default_question: String,
    /// Per-tool-call timeout; unbounded when unset
    #[serde(default)]
    pub tool_timeout_secs: Option<u64>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        AgentConfig {
            max_iterations: default_max_iterations(),
            system_prompt: default_system_prompt(),
            default_question: default_question(),
            tool_timeout_secs: None,
        }
    }
}

fn default_max_iterations() -> u32 {
    DEFAULT_MAX_ITERATIONS
}

fn default_system_prompt() -> String {
    "You are a helpful assistant. Use the available tools when they help answer \
     the user's question, then give a clear final answer."
        .to_string()
}

fn default_question() -> String {
    "Load the file sample.csv and show me its statistics.".to_string()
}

/// How to launch the tool-execution server
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct McpServerConfig {
    /// Server executable; the bundled `mcp-agent-server` when unset
    #[serde(default)]
    pub command: Option<String>,
    /// Extra command-line arguments
    #[serde(default)]
    pub args: Vec<String>,
    /// Extra environment variables
    #[serde(default)]
    pub env: HashMap<String, String>,
}
