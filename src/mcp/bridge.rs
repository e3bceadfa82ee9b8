//! MCP-to-agent bridge
//!
//! Adapts MCP server tools into the model's function-calling definitions
//! and exposes `McpClient` as the agent's tool-execution session.

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::client::McpClient;
use super::protocol::{McpTool, McpToolResult};
use crate::agent::{FunctionDefinition, ToolDefinition, ToolSession};
use crate::error::Result;

/// Convert an MCP tool definition into a model tool definition
pub fn to_tool_definition(tool: &McpTool) -> ToolDefinition {
    ToolDefinition {
        tool_type: "function".to_string(),
        function: FunctionDefinition {
            name: tool.name.clone(),
            description: tool.description.clone(),
            parameters: serde_json::json!({
                "type": tool.input_schema.schema_type,
                "properties": tool.input_schema.properties,
                "required": tool.input_schema.required,
            }),
        },
    }
}

/// List the server's tools as model tool definitions
pub async fn tool_definitions(client: &McpClient) -> Result<Vec<ToolDefinition>> {
    let tools = client.list_tools().await?;
    Ok(tools.iter().map(to_tool_definition).collect())
}

#[async_trait]
impl ToolSession for McpClient {
    async fn call_tool(&self, name: &str, arguments: Map<String, Value>) -> Result<McpToolResult> {
        McpClient::call_tool(self, name, Value::Object(arguments)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::protocol::McpToolInput;

    #[test]
    fn test_to_tool_definition() {
        let tool = McpTool {
            name: "add".to_string(),
            description: "Add two numbers".to_string(),
            input_schema: McpToolInput {
                schema_type: "object".to_string(),
                properties: serde_json::json!({
                    "a": {"type": "integer"},
                    "b": {"type": "integer"}
                }),
                required: vec!["a".to_string(), "b".to_string()],
            },
        };

        let def = to_tool_definition(&tool);
        assert_eq!(def.tool_type, "function");
        assert_eq!(def.function.name, "add");
        assert_eq!(def.function.parameters["required"][1], "b");
        assert_eq!(def.function.parameters["properties"]["a"]["type"], "integer");
    }
}
