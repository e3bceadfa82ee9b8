//! MCP (Model Context Protocol) module
//!
//! Provides the agent's tool-execution session: a JSON-RPC client that
//! talks to an MCP server over stdio.
//!
//! ## Architecture
//!
//! - **client**: MCP client for connecting to MCP servers
//! - **protocol**: Wire protocol types (JSON-RPC based), shared with the bundled server
//! - **bridge**: Adapts MCP tools into model tool definitions and the agent's `ToolSession`
//!
//! ## Usage
//!
//! ```rust,no_run
//! use mcp_agent::mcp::McpClient;
//! use std::collections::HashMap;
//!
//! # async fn example() -> mcp_agent::Result<()> {
//! // Spawn and handshake a local MCP server
//! let client = McpClient::spawn("mcp-agent-server", &[], &HashMap::new()).await?;
//!
//! // List available tools
//! let tools = client.list_tools().await?;
//!
//! // Call a tool
//! let result = client.call_tool("add", serde_json::json!({"a": 5, "b": 3})).await?;
//! client.shutdown().await?;
//! # Ok(())
//! # }
//! ```

mod bridge;
mod client;
pub mod protocol;

pub use bridge::{to_tool_definition, tool_definitions};
pub use client::McpClient;
pub use protocol::{ContentItem, McpRequest, McpResponse, McpTool, McpToolInput, McpToolResult};
