//! Core tool trait and result types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::dataset::DatasetStore;
use crate::error::{Error, Result};
use crate::mcp::protocol::{McpTool, McpToolInput, McpToolResult};

/// State scoped to one client connection, handed to every tool call
#[derive(Debug, Default)]
pub struct SessionContext {
    /// Datasets loaded during this session, keyed by opaque handle
    pub datasets: DatasetStore,
}

/// A tool the server exposes over MCP
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool name
    fn name(&self) -> &str;

    /// Get the tool description
    fn description(&self) -> &str;

    /// Get the JSON Schema for tool parameters
    fn parameters_schema(&self) -> Value;

    /// Execute the tool with given arguments
    async fn execute(&self, args: Value, session: &SessionContext) -> Result<ToolResult>;

    /// Convert to an MCP tool definition
    fn to_definition(&self) -> McpTool {
        let schema = self.parameters_schema();
        McpTool {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: McpToolInput {
                schema_type: "object".to_string(),
                properties: schema.get("properties").cloned().unwrap_or_default(),
                required: schema
                    .get("required")
                    .and_then(|r| serde_json::from_value(r.clone()).ok())
                    .unwrap_or_default(),
            },
        }
    }
}

/// Result of a tool execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// Whether the execution was successful
    pub success: bool,
    /// Result content (for successful execution)
    pub content: Option<String>,
    /// Error message (for failed execution)
    pub error: Option<String>,
}

impl ToolResult {
    /// Create a successful result
    pub fn success(content: impl Into<String>) -> Self {
        ToolResult {
            success: true,
            content: Some(content.into()),
            error: None,
        }
    }

    /// Create a failed result
    pub fn failure(error: impl Into<String>) -> Self {
        ToolResult {
            success: false,
            content: None,
            error: Some(error.into()),
        }
    }
}

impl From<ToolResult> for McpToolResult {
    fn from(result: ToolResult) -> Self {
        if result.success {
            McpToolResult::text(result.content.unwrap_or_default())
        } else {
            McpToolResult::error(result.error.unwrap_or_default())
        }
    }
}

/// Parse tool arguments into a specific type
pub fn parse_arguments<T: for<'de> Deserialize<'de>>(tool: &str, args: Value) -> Result<T> {
    serde_json::from_value(args)
        .map_err(|e| Error::InvalidInput(format!("Invalid arguments for {}: {}", tool, e)))
}
