//! Tool registry - manages the tools a server session exposes

use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, warn};

use super::traits::{SessionContext, Tool};
use crate::mcp::protocol::{McpTool, McpToolResult};

/// Registry of available tools
pub struct ToolRegistry {
    tools: BTreeMap<String, Box<dyn Tool>>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        ToolRegistry {
            tools: BTreeMap::new(),
        }
    }

    /// Registry holding the built-in catalog
    pub fn with_builtin_tools() -> Self {
        let mut registry = Self::new();
        registry.register(super::AddTool);
        registry.register(super::LoadCsvTool);
        registry.register(super::CsvStatsTool);
        registry
    }

    /// Register a tool
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        self.tools.insert(tool.name().to_string(), Box::new(tool));
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    /// Get all tool definitions, sorted by name
    pub fn definitions(&self) -> Vec<McpTool> {
        self.tools.values().map(|t| t.to_definition()).collect()
    }

    /// Execute a tool call; every outcome is an MCP result
    pub async fn execute(&self, name: &str, args: Value, session: &SessionContext) -> McpToolResult {
        let Some(tool) = self.get(name) else {
            return McpToolResult::error(format!("Unknown tool: {}", name));
        };

        match tool.execute(args, session).await {
            Ok(result) => result.into(),
            Err(e) => {
                if e.is_client_error() {
                    debug!("Tool {} rejected call: {}", name, e);
                } else {
                    warn!("Tool {} failed: {}", name, e);
                }
                McpToolResult::error(format!("Error executing tool {}: {}", name, e))
            }
        }
    }

    /// Get tool count
    pub fn count(&self) -> usize {
        self.tools.len()
    }

    /// List tool names
    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(|s| s.as_str()).collect()
    }
}
