//! # mcp-agent
//!
//! A tool-using agent that answers questions with a local Ollama model and
//! tools served over the Model Context Protocol.
//!
//! ## Features
//!
//! - **Agent loop:** iteration-bounded tool rounds with a pluggable extraction chain
//! - **Textual tool calls:** recovers calls written as JSON in plain text
//! - **MCP client:** newline-delimited JSON-RPC 2.0 over stdio
//! - **Bundled server:** `add`, `load_csv`, `csv_stats`, a greeting resource and prompt

pub mod agent;
pub mod config;
pub mod error;
pub mod mcp;
pub mod server;
pub mod tools;

pub use config::Config;
pub use error::{Error, Result};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const NAME: &str = env!("CARGO_PKG_NAME");
